/// Rendering layer: all terminal I/O lives here.
///
/// Draws a read-only snapshot of the arcade world and the session, scaling
/// world pixels onto the terminal grid.  Nothing in here changes game state.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use star_catcher::arcade::{ArcadeWorld, Body, Particle};
use star_catcher::engine::{ParticleTexture, SpriteKey, TINT_RED};
use star_catcher::entities::Game;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_PLATFORM: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_PLAYER_FADED: Color = Color::DarkGrey;
const C_STAR: Color = Color::Yellow;
const C_RARE: Color = Color::Red;
const C_BOMB: Color = Color::Grey;
const C_HEART: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::DarkYellow;
const C_PARTICLE: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;

/// Maps world pixels onto the play area inside the border.
struct Viewport {
    world: Vec2,
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn new(world: &ArcadeWorld, width: u16, height: u16) -> Self {
        Viewport {
            world: Vec2::new(world.width(), world.height()),
            cols: width.saturating_sub(2).max(1),
            rows: height.saturating_sub(4).max(1),
        }
    }

    /// Terminal cell of a world point, or `None` if it falls outside.
    fn cell(&self, p: Vec2) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.world.x || p.y >= self.world.y {
            return None;
        }
        let col = (p.x / self.world.x * self.cols as f32) as u16;
        let row = (p.y / self.world.y * self.rows as f32) as u16;
        Some((1 + col.min(self.cols - 1), 2 + row.min(self.rows - 1)))
    }

    fn col(&self, x: f32) -> u16 {
        let x = x.clamp(0.0, self.world.x - 1.0);
        1 + (x / self.world.x * self.cols as f32) as u16
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, world: &ArcadeWorld, game: &Game) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(world, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;

    for particle in world.particles() {
        draw_particle(out, &view, particle)?;
    }
    for (_, body) in world.bodies() {
        if body.visible {
            draw_body(out, &view, body)?;
        }
    }

    draw_texts(out, &view, world)?;
    draw_controls_hint(out, height)?;

    if game.session.is_game_over() {
        draw_restart_hint(out, width, height)?;
    }

    // cursor out of the way before the flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

/// Frame around the play area, from row 1 to row `height - 2`.
fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let (top, bottom) = (1, height.saturating_sub(2));
    let right = width.saturating_sub(1);
    let bar = "─".repeat(right.saturating_sub(1) as usize);

    out.queue(style::SetForegroundColor(C_BORDER))?;
    for (row, (l, r)) in [(top, ("┌", "┐")), (bottom, ("└", "┘"))] {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print(l))?;
        out.queue(Print(&bar))?;
        out.queue(Print(r))?;
    }
    for row in top + 1..bottom {
        for col in [0, right] {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("│"))?;
        }
    }
    Ok(())
}

// ── Bodies ────────────────────────────────────────────────────────────────────

fn draw_body<W: Write>(out: &mut W, view: &Viewport, body: &Body) -> std::io::Result<()> {
    match body.key {
        SpriteKey::Platform => draw_platform(out, view, body),
        SpriteKey::Player => draw_player(out, view, body),
        SpriteKey::Star => {
            let color = if body.tint == TINT_RED { C_RARE } else { C_STAR };
            draw_glyph(out, view, body.pos, "★", color)
        }
        SpriteKey::Bomb => draw_glyph(out, view, body.pos, "●", C_BOMB),
        SpriteKey::Heart => draw_glyph(out, view, body.pos, "♥", C_HEART),
        SpriteKey::Explosion => draw_glyph(out, view, body.pos, "✹", C_EXPLOSION),
    }
}

fn draw_platform<W: Write>(out: &mut W, view: &Viewport, body: &Body) -> std::io::Result<()> {
    let (min, max) = (body.min(), body.max());
    let Some((_, row)) = view.cell(Vec2::new(body.pos.x.clamp(0.0, view.world.x - 1.0), min.y))
    else {
        return Ok(());
    };
    let (c0, c1) = (view.col(min.x), view.col(max.x));
    out.queue(cursor::MoveTo(c0, row))?;
    out.queue(style::SetForegroundColor(C_PLATFORM))?;
    out.queue(Print("▀".repeat((c1 - c0 + 1) as usize)))?;
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, body: &Body) -> std::io::Result<()> {
    // head on the row above, body centred on the cell
    let Some((col, row)) = view.cell(body.pos) else {
        return Ok(());
    };
    let color = if body.tint == TINT_RED {
        C_RARE
    } else if body.alpha < 1.0 {
        C_PLAYER_FADED
    } else {
        C_PLAYER
    };
    out.queue(style::SetForegroundColor(color))?;

    if row > 2 {
        out.queue(cursor::MoveTo(col, row - 1))?;
        out.queue(Print("o"))?;
    }
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("/▓\\"))?;
    Ok(())
}

fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    pos: Vec2,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(pos) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_particle<W: Write>(out: &mut W, view: &Viewport, p: &Particle) -> std::io::Result<()> {
    if p.alpha() < 0.2 {
        return Ok(());
    }
    let color = match (p.tint, p.texture) {
        (Some(TINT_RED), _) => C_RARE,
        (_, ParticleTexture::Star) => C_STAR,
        (_, ParticleTexture::Heart) => C_HEART,
        (_, ParticleTexture::Spark) => C_PARTICLE,
    };
    draw_glyph(out, view, p.pos, "·", color)
}

// ── Texts ─────────────────────────────────────────────────────────────────────

/// HUD texts go on row 0; centred texts are overlaid on the play area.
fn draw_texts<W: Write>(out: &mut W, view: &Viewport, world: &ArcadeWorld) -> std::io::Result<()> {
    for (_, text) in world.texts() {
        let len = text.text.chars().count() as u16;
        if text.style.centered {
            let Some((col, row)) = view.cell(text.pos) else {
                continue;
            };
            out.queue(cursor::MoveTo(col.saturating_sub(len / 2), row))?;
            out.queue(style::SetForegroundColor(Color::Red))?;
        } else {
            out.queue(cursor::MoveTo(view.col(text.pos.x), 0))?;
            out.queue(style::SetForegroundColor(C_HUD))?;
        }
        out.queue(Print(&text.text))?;
    }
    Ok(())
}

// ── Hints (last row) ──────────────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Run   ↑ / W / SPACE : Jump   Q : Quit"))?;
    Ok(())
}

fn draw_restart_hint<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    const RESTART: &str = "R : Play again   Q : Quit";
    let col = (width / 2).saturating_sub(RESTART.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, (height / 2).saturating_add(4)))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(RESTART))?;
    Ok(())
}
