/// Spawn policy: when, where and how many stars, bombs and hearts appear.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::HEART_MARGIN;
use crate::engine::{ActorHandle, EmitterConfig, Engine, Tint, TINT_NONE, TINT_RED};
use crate::entities::{Actor, ActorKind, Game};
use crate::policy::{star_trail, KindPolicy};

/// Y of freshly dropped bombs, just under the top edge.
const BOMB_DROP_Y: f32 = 16.0;
/// Stars appear somewhere in the top band `0..=STAR_DROP_MAX_Y`.
const STAR_DROP_MAX_Y: i32 = 30;

// ── Layout helpers ────────────────────────────────────────────────────────────

/// X positions of a star batch for a continuous `count` draw.
///
/// The batch holds every index `i` with `i < count`, placed at
/// `step * (i + 1)` where `step = floor(width / (count + 1))`.
pub fn star_batch_positions(count: f32, width: f32) -> Vec<f32> {
    let step = (width / (count + 1.0)).floor();
    let len = count.ceil().max(1.0) as usize;
    (0..len).map(|i| step + step * i as f32).collect()
}

/// Number of bombs in one batch at the given score.
pub fn bomb_batch_len(score: u32, score_step: u32) -> u32 {
    score / score_step + 1
}

/// Bombs drop on the half of the window away from the player.
pub fn bomb_drop_range(player_x: f32, width: f32) -> (i32, i32) {
    let half = (width / 2.0) as i32;
    if player_x < width / 2.0 {
        (half, width as i32)
    } else {
        (0, half)
    }
}

// ── Per-tick spawning ─────────────────────────────────────────────────────────

/// Advance the star clock and drop a batch once it reaches the interval.
/// Returns the number of stars created.
pub fn spawn_stars(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
    delta: f32,
) -> usize {
    game.timers.star += delta;
    trace!(timer = game.timers.star, "star clock");
    if game.timers.star < game.config.star_spawn_min_interval {
        return 0;
    }

    let count = rng.gen_range(1.0..=game.config.max_star_count as f32);
    let xs = star_batch_positions(count, game.config.window_width);
    for &x in &xs {
        let y = rng.gen_range(0..=STAR_DROP_MAX_Y) as f32;
        spawn_star(game, engine, rng, Vec2::new(x, y));
    }
    game.timers.star = 0.0;
    debug!(count = xs.len(), "star batch");
    xs.len()
}

/// Create one star.  Past the rare-star score threshold each star has a
/// small chance of being a red one worth ten times as much.
pub fn spawn_star(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
    pos: Vec2,
) -> ActorHandle {
    let roll: f32 = rng.gen_range(0.0..=1.0);
    let rare = roll > 1.0 - game.config.rare_star_chance
        && game.session.score > game.config.rare_star_min_score;

    let base = game.config.star_collect_score;
    let placement = if rare {
        debug!(x = pos.x, "rare star");
        Placement {
            pos,
            tint: TINT_RED,
            points: base * game.config.rare_star_multiplier,
            trail: star_trail(true),
        }
    } else {
        Placement { pos, tint: TINT_NONE, points: base, trail: star_trail(false) }
    };
    let policy = KindPolicy::for_kind(ActorKind::Star, &game.config);
    spawn_actor(game, engine, rng, &policy, placement)
}

/// Advance the bomb clock.  Once it reaches the interval and the score gate
/// is open, drop a batch of bombs and maybe a heart.  Returns the number of
/// bombs created.
pub fn spawn_bombs(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
    delta: f32,
) -> usize {
    game.timers.bomb += delta;
    trace!(timer = game.timers.bomb, "bomb clock");
    if game.timers.bomb < game.config.bomb_spawn_min_interval
        || game.session.score <= game.config.bomb_min_score
    {
        return 0;
    }

    let n = bomb_batch_len(game.session.score, game.config.bomb_score_step);
    let player_x = engine.position(game.player).map_or(0.0, |p| p.x);
    let (lo, hi) = bomb_drop_range(player_x, game.config.window_width);
    let policy = KindPolicy::for_kind(ActorKind::Bomb, &game.config);
    for _ in 0..n {
        let x = rng.gen_range(lo..=hi) as f32;
        let placement = Placement::plain(Vec2::new(x, BOMB_DROP_Y), &policy);
        spawn_actor(game, engine, rng, &policy, placement);
    }
    game.timers.bomb = 0.0;
    debug!(count = n, score = game.session.score, "bomb batch");

    maybe_spawn_heart(game, engine, rng);
    n as usize
}

/// Runs on the bomb cadence.  Drops a single heart with a small probability,
/// only for high scores and only while the player is missing a life.
pub fn maybe_spawn_heart(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
) -> Option<ActorHandle> {
    let roll: f32 = rng.gen_range(0.0..=1.0);
    let fires = roll < game.config.heart_chance
        && game.session.score > game.config.heart_min_score
        && game.session.lives < game.session.max_lives;
    if !fires {
        return None;
    }

    let margin = HEART_MARGIN as i32;
    let x = rng.gen_range(margin..=game.config.window_width as i32 - margin) as f32;
    let policy = KindPolicy::for_kind(ActorKind::Heart, &game.config);
    let placement = Placement::plain(Vec2::new(x, 0.0), &policy);
    let handle = spawn_actor(game, engine, rng, &policy, placement);
    debug!(x, "heart");
    Some(handle)
}

// ── Shared spawn path ─────────────────────────────────────────────────────────

/// What varies between two actors of the same kind.
struct Placement {
    pos: Vec2,
    tint: Tint,
    points: u32,
    trail: EmitterConfig,
}

impl Placement {
    /// Untinted, worth nothing, with the kind's usual trail.
    fn plain(pos: Vec2, policy: &KindPolicy) -> Self {
        Placement { pos, tint: TINT_NONE, points: 0, trail: policy.trail }
    }
}

fn spawn_actor(
    game: &mut Game,
    engine: &mut dyn Engine,
    rng: &mut impl Rng,
    policy: &KindPolicy,
    placement: Placement,
) -> ActorHandle {
    let Placement { pos, tint, points, trail } = placement;
    let kind = policy.kind;
    let handle = engine.create(kind.sprite(), pos);
    if tint != TINT_NONE {
        engine.set_tint(handle, tint);
    }

    let velocity = Vec2::new(
        rng.gen_range(policy.velocity_x.0..=policy.velocity_x.1) as f32,
        rng.gen_range(policy.velocity_y.0..=policy.velocity_y.1) as f32,
    );
    engine.set_velocity(handle, velocity);
    engine.set_collide_world_bounds(handle, true);
    engine.set_bounce(handle, policy.bounce);

    let remaining_lifespan = policy.roll_lifespan(&game.config, rng);

    let emitter = engine.create_emitter(trail);
    engine.attach_follow(emitter, handle);

    game.pools.get_mut(kind).insert(Actor {
        handle,
        kind,
        origin: pos,
        velocity,
        remaining_lifespan,
        tint,
        points,
        emitter: Some(emitter),
    });
    handle
}
