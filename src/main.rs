mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use star_catcher::arcade::ArcadeWorld;
use star_catcher::compute::{init_game, tick};
use star_catcher::config::GameConfig;
use star_catcher::entities::PlayerInput;

/// Frame budget, about 30 frames per second.
const FRAME: Duration = Duration::from_millis(33);

/// Longest step fed to the simulation after a stall.
const MAX_DELTA_MS: f32 = 100.0;

const CONFIG_ENV: &str = "STAR_CATCHER_CONFIG";
const LOG_ENV: &str = "STAR_CATCHER_LOG";

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const JUMP_KEYS: [KeyCode; 4] =
    [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];

// ── Held keys ─────────────────────────────────────────────────────────────────

/// Frames a key stays held after its last press or repeat.  Terminals
/// without release events repeat at 15 Hz or more, which refreshes a
/// 4-frame (≈133 ms) window in time.
const HOLD_WINDOW: u64 = 4;

/// Last frame each key was pressed or repeated.
#[derive(Default)]
struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    fn touch(&mut self, key: KeyCode, frame: u64) {
        self.last_seen.insert(key, frame);
    }

    fn release(&mut self, key: KeyCode) {
        self.last_seen.remove(&key);
    }

    fn any(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|key| {
            self.last_seen
                .get(key)
                .is_some_and(|&seen| frame.saturating_sub(seen) <= HOLD_WINDOW)
        })
    }

    fn input(&self, frame: u64) -> PlayerInput {
        PlayerInput {
            left: self.any(&LEFT_KEYS, frame),
            right: self.any(&RIGHT_KEYS, frame),
            jump: self.any(&JUMP_KEYS, frame),
        }
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// Raw-mode alternate screen, restored on drop.
struct Terminal {
    out: BufWriter<Stdout>,
    keyboard_enhanced: bool,
}

impl Terminal {
    fn enter() -> io::Result<Self> {
        let mut out = BufWriter::new(stdout());
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        // Release events end a held key at once; terminals without the
        // kitty protocol refuse and fall back to HOLD_WINDOW.
        let keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .is_ok();
        Ok(Terminal { out, keyboard_enhanced })
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocking reads happen on their own thread so the frame loop never waits.
fn spawn_input_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

// ── Title screen ──────────────────────────────────────────────────────────────

fn print_at<W: Write>(out: &mut W, col: u16, row: u16, color: Color, text: &str) -> io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

/// Draw the title and wait.  Returns false if the player chose to quit.
fn title_screen<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> io::Result<bool> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let (mid_col, mid_row) = (width / 2, height / 2);
    let left = mid_col.saturating_sub(16);

    let title = "*  S T A R   C A T C H E R  *";
    let title_col = mid_col.saturating_sub(title.chars().count() as u16 / 2);
    print_at(out, title_col, mid_row.saturating_sub(6), Color::Cyan, title)?;
    let tagline = "Catch the stars, dodge the bombs.";
    print_at(out, left, mid_row.saturating_sub(4), Color::White, tagline)?;

    let legend = [
        ("★", Color::Yellow, "star        10 points"),
        ("★", Color::Red, "red star    100 points, rare"),
        ("♥", Color::Magenta, "heart       one more life"),
        ("●", Color::Grey, "bomb        costs a life"),
    ];
    for (row, (glyph, color, label)) in (mid_row.saturating_sub(2)..).zip(legend) {
        print_at(out, left, row, color, glyph)?;
        print_at(out, left + 2, row, Color::DarkGrey, label)?;
    }
    print_at(out, left, mid_row + 4, Color::DarkGrey, "ENTER : Start   Q : Quit")?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    for ev in rx.iter() {
        if let Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. }) = ev {
            if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                return Ok(true);
            }
            if is_quit(code, modifiers) {
                return Ok(false);
            }
        }
    }
    // input thread gone
    Ok(false)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum Outcome {
    Quit,
    Restart,
}

/// Play one game on a fresh world until the player quits, or asks for
/// another round after game over.
fn play<W: Write>(
    out: &mut W,
    config: &GameConfig,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<Outcome> {
    let mut rng = thread_rng();
    let mut world = ArcadeWorld::new(config.window_width, config.window_height);
    let mut game = init_game(config.clone(), &mut world)?;

    let mut held = HeldKeys::default();
    let mut frame: u64 = 0;
    let mut last_step = Instant::now();

    loop {
        let started = Instant::now();
        frame += 1;

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press if is_quit(code, modifiers) => return Ok(Outcome::Quit),
                KeyEventKind::Press
                    if game.session.is_game_over() && matches!(code, KeyCode::Char('r' | 'R')) =>
                {
                    return Ok(Outcome::Restart);
                }
                KeyEventKind::Press | KeyEventKind::Repeat => held.touch(code, frame),
                KeyEventKind::Release => held.release(code),
            }
        }

        let delta = (last_step.elapsed().as_secs_f32() * 1000.0).min(MAX_DELTA_MS);
        last_step = Instant::now();

        world.step(delta);
        tick(&mut game, &mut world, &mut rng, held.input(frame), delta);
        display::render(out, &world, &game)?;

        if let Some(rest) = FRAME.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// The game owns the terminal, so logs only go to the file named by
/// `STAR_CATCHER_LOG`.
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = std::env::var(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("failed to create log file {path}"))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("star_catcher=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config() -> anyhow::Result<GameConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => GameConfig::load(path),
        Err(_) => Ok(GameConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let config = load_config()?;
    config.validate()?;
    info!(?config, "starting");

    let mut term = Terminal::enter()?;
    let rx = spawn_input_reader();

    if title_screen(&mut term.out, &rx)? {
        let mut round = 1;
        while let Outcome::Restart = play(&mut term.out, &config, &rx)? {
            round += 1;
            debug!(round, "restarting");
        }
    }
    info!("bye");
    Ok(())
}
