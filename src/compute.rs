/// Scene setup and the per-frame update.
///
/// The host calls [`init_game`] once per game and [`tick`] once per frame,
/// after its own physics step.  All side effects go through the injected
/// engine and RNG, so a seeded RNG and [`crate::arcade::ArcadeWorld`] give
/// fully repeatable runs.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::collision::drain_collisions;
use crate::config::GameConfig;
use crate::engine::{
    Animation, AnimationOptions, Contact, Engine, SpriteKey, TextStyle, TINT_RED,
};
use crate::entities::{
    Game, GameStatus, Hud, Invincibility, PlayerInput, Pools, Session, SpawnTimers,
};
use crate::lifecycle::decay_lifespans;
use crate::spawn::{spawn_bombs, spawn_stars};

// ── Level layout & player tuning ──────────────────────────────────────────────

const PLAYER_START: Vec2 = Vec2::new(100.0, 450.0);
const PLAYER_GRAVITY: f32 = 300.0;
const PLAYER_RUN_SPEED: f32 = 160.0;
const PLAYER_JUMP_SPEED: f32 = 500.0;
const PLAYER_DIMMED_ALPHA: f32 = 0.25;

/// (x, y, scale) of each static platform.
const PLATFORMS: [(f32, f32, f32); 4] = [
    (400.0, 568.0, 2.0),
    (600.0, 400.0, 1.0),
    (50.0, 250.0, 1.0),
    (750.0, 220.0, 1.0),
];

const HUD_MARGIN: f32 = 16.0;
const LIVES_TEXT_WIDTH: f32 = 160.0;
const GAME_OVER_STYLE: TextStyle = TextStyle { font_size: 96, stroke: true, centered: true };
const FINAL_SCORE_STYLE: TextStyle = TextStyle { font_size: 72, stroke: true, centered: true };

pub fn score_label(score: u32) -> String {
    format!("SCORE: {}", score)
}

pub fn lives_label(lives: u32) -> String {
    format!("LIVES: {}", lives)
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// Build the level, the player and the HUD, and return a fresh game.
/// Fails only on an invalid configuration.
pub fn init_game(config: GameConfig, engine: &mut dyn Engine) -> anyhow::Result<Game> {
    config.validate()?;

    for (x, y, scale) in PLATFORMS {
        let platform = engine.create(SpriteKey::Platform, Vec2::new(x, y));
        if scale != 1.0 {
            engine.set_scale(platform, scale);
        }
    }

    let player = engine.create(SpriteKey::Player, PLAYER_START);
    engine.set_collide_world_bounds(player, true);
    engine.set_gravity(player, Vec2::new(0.0, PLAYER_GRAVITY));

    for key in [SpriteKey::Player, SpriteKey::Star, SpriteKey::Bomb, SpriteKey::Heart] {
        engine.watch(key, SpriteKey::Platform, Contact::Collide);
    }
    engine.watch(SpriteKey::Player, SpriteKey::Star, Contact::Overlap);
    engine.watch(SpriteKey::Player, SpriteKey::Heart, Contact::Overlap);
    engine.watch(SpriteKey::Player, SpriteKey::Bomb, Contact::Collide);

    let session = Session::new(config.max_lives);
    let hud = Hud {
        score: Some(engine.add_text(
            Vec2::new(HUD_MARGIN, HUD_MARGIN),
            &score_label(session.score),
            TextStyle::HUD,
        )),
        lives: Some(engine.add_text(
            Vec2::new(config.window_width - LIVES_TEXT_WIDTH, HUD_MARGIN),
            &lives_label(session.lives),
            TextStyle::HUD,
        )),
        game_over: Vec::new(),
    };

    // The first batch of stars falls on the first frame.
    let timers = SpawnTimers { star: config.star_spawn_min_interval, bomb: 0.0 };

    info!(lives = session.lives, "session started");
    Ok(Game {
        config,
        session,
        pools: Pools::default(),
        timers,
        player,
        hud,
    })
}

// ── Per-frame update ──────────────────────────────────────────────────────────

/// Advance the game by `delta` milliseconds.  Does nothing once the game
/// is over.
pub fn tick(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
    input: PlayerInput,
    delta: f32,
) {
    if game.session.is_game_over() {
        return;
    }

    drain_collisions(game, engine);
    if game.session.is_game_over() {
        return;
    }

    control_player(game, engine, input);
    decay_lifespans(&mut game.pools, engine, delta);
    spawn_stars(game, engine, rng, delta);
    spawn_bombs(game, engine, rng, delta);
    decay_invincibility(game, engine, delta);
}

/// Run left/right, stand still, or jump when on the ground.
pub fn control_player(game: &mut Game, engine: &mut dyn Engine, input: PlayerInput) {
    let player = game.player;
    let running = AnimationOptions { ignore_if_playing: true };
    let vx = if input.left {
        engine.play_animation(player, Animation::Left, running);
        -PLAYER_RUN_SPEED
    } else if input.right {
        engine.play_animation(player, Animation::Right, running);
        PLAYER_RUN_SPEED
    } else {
        engine.play_animation(player, Animation::Turn, AnimationOptions::default());
        0.0
    };

    let mut vy = engine.velocity(player).map_or(0.0, |v| v.y);
    if input.jump && engine.is_touching_down(player) {
        vy = -PLAYER_JUMP_SPEED;
    }
    engine.set_velocity(player, Vec2::new(vx, vy));
}

/// Count the invincibility window down and blink the player while it lasts.
pub fn decay_invincibility(game: &mut Game, engine: &mut dyn Engine, delta: f32) {
    let inv = &mut game.session.invincibility;
    if inv.remaining > 0.0 {
        inv.remaining = (inv.remaining - delta).max(0.0);
    }

    if inv.remaining > 0.0 {
        inv.blink_timer += delta;
        if inv.blink_timer > game.config.blink_interval {
            inv.dimmed = !inv.dimmed;
            let alpha = if inv.dimmed { PLAYER_DIMMED_ALPHA } else { 1.0 };
            engine.set_alpha(game.player, alpha);
            inv.blink_timer = 0.0;
        }
    } else {
        if *inv != Invincibility::default() {
            debug!("invincibility over");
        }
        *inv = Invincibility::default();
        engine.set_alpha(game.player, 1.0);
    }
}

// ── Session transitions ───────────────────────────────────────────────────────

pub fn change_lives(game: &mut Game, engine: &mut dyn Engine, amount: i32) {
    game.session.lives = game.session.lives.saturating_add_signed(amount);
    if let Some(text) = game.hud.lives {
        engine.set_text(text, &lives_label(game.session.lives));
    }
    debug!(amount, lives = game.session.lives, "lives changed");
}

/// Open a fresh invincibility window after a survivable hit.
pub fn start_invincibility(game: &mut Game) {
    game.session.invincibility = Invincibility {
        remaining: game.config.invincibility_duration,
        blink_timer: 0.0,
        dimmed: false,
    };
    debug!(duration = game.config.invincibility_duration, "invincible");
}

/// Playing → GameOver.  Freezes the world, marks the player and swaps the
/// HUD for the final score.  Fires at most once per game.
pub fn game_over(game: &mut Game, engine: &mut dyn Engine) {
    if game.session.status == GameStatus::GameOver {
        return;
    }
    game.session.status = GameStatus::GameOver;

    engine.pause_physics();
    engine.set_tint(game.player, TINT_RED);
    engine.play_animation(game.player, Animation::Turn, AnimationOptions::default());

    for text in [game.hud.score.take(), game.hud.lives.take()].into_iter().flatten() {
        engine.remove_text(text);
    }

    let center = Vec2::new(game.config.window_width / 2.0, game.config.window_height / 2.0);
    let banner = engine.add_text(center, "GAME OVER", GAME_OVER_STYLE);
    let below = center + Vec2::new(0.0, GAME_OVER_STYLE.font_size as f32);
    let final_score = engine.add_text(
        below,
        &format!("FINAL SCORE:{}", game.session.score),
        FINAL_SCORE_STYLE,
    );
    game.hud.game_over = vec![banner, final_score];

    info!(score = game.session.score, "game over");
}
