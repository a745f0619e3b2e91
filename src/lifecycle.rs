/// Lifespan decay and actor retirement.
///
/// Retiring an actor always takes it out of its pool first, then releases
/// its trail emitter, then unregisters it from the engine.  A handle that is
/// no longer in its pool is never touched again.

use glam::Vec2;
use tracing::debug;

use crate::engine::{ActorHandle, Animation, AnimationOptions, Engine, OnComplete, SpriteKey};
use crate::entities::{Actor, ActorKind, Pools};
use crate::policy::{heart_burst, star_burst, Burst};

/// Age every live actor by `delta` and retire the ones that ran out.
/// Returns how many actors expired.
pub fn decay_lifespans(pools: &mut Pools, engine: &mut dyn Engine, delta: f32) -> usize {
    let mut expired = 0;
    for kind in ActorKind::ALL {
        let pool = pools.get_mut(kind);
        for actor in pool.actors.iter_mut() {
            actor.remaining_lifespan -= delta;
        }
        let due: Vec<_> = pool
            .actors
            .iter()
            .filter(|a| a.remaining_lifespan <= 0.0)
            .map(|a| a.handle)
            .collect();

        for handle in due {
            let retired = match kind {
                ActorKind::Star => destroy_star(pools, engine, handle),
                ActorKind::Bomb => bomb_explode(pools, engine, handle),
                ActorKind::Heart => expire_heart(pools, engine, handle),
            };
            if retired.is_some() {
                expired += 1;
                debug!(?kind, handle = handle.0, "expired");
            }
        }
    }
    expired
}

/// Remove a star with a burst of sparks in its own colour.
pub fn destroy_star(
    pools: &mut Pools,
    engine: &mut dyn Engine,
    handle: ActorHandle,
) -> Option<Actor> {
    let star = take(pools, engine, ActorKind::Star, handle)?;
    let at = engine.position(handle).unwrap_or(star.origin);
    fire_burst(engine, star_burst(star.tint), at);
    engine.destroy(handle);
    Some(star)
}

/// Remove a bomb and leave a short explosion animation in its place.
pub fn bomb_explode(
    pools: &mut Pools,
    engine: &mut dyn Engine,
    handle: ActorHandle,
) -> Option<Actor> {
    let bomb = take(pools, engine, ActorKind::Bomb, handle)?;
    let at = engine.position(handle).unwrap_or(bomb.origin);
    engine.set_velocity(handle, Vec2::ZERO);
    engine.set_gravity(handle, Vec2::ZERO);
    engine.destroy(handle);

    let explosion = engine.create(SpriteKey::Explosion, at);
    engine.play_animation(explosion, Animation::BombExplosion, AnimationOptions::default());
    engine.on_animation_complete(explosion, OnComplete::Destroy);
    Some(bomb)
}

/// Remove a heart that timed out.  No effect.
pub fn expire_heart(
    pools: &mut Pools,
    engine: &mut dyn Engine,
    handle: ActorHandle,
) -> Option<Actor> {
    let heart = take(pools, engine, ActorKind::Heart, handle)?;
    engine.destroy(handle);
    Some(heart)
}

/// Remove a picked-up heart with a quick burst where it was caught.
pub fn consume_heart(
    pools: &mut Pools,
    engine: &mut dyn Engine,
    handle: ActorHandle,
) -> Option<Actor> {
    let heart = take(pools, engine, ActorKind::Heart, handle)?;
    let at = engine.position(handle).unwrap_or(heart.origin);
    fire_burst(engine, heart_burst(), at);
    engine.destroy(handle);
    Some(heart)
}

/// Pull an actor out of its pool and release its trail emitter.
fn take(
    pools: &mut Pools,
    engine: &mut dyn Engine,
    kind: ActorKind,
    handle: ActorHandle,
) -> Option<Actor> {
    let mut actor = pools.get_mut(kind).remove(handle)?;
    if let Some(emitter) = actor.emitter.take() {
        engine.detach(emitter);
    }
    Some(actor)
}

fn fire_burst(engine: &mut dyn Engine, burst: Burst, at: Vec2) {
    let emitter = engine.create_emitter(burst.config);
    engine.burst(emitter, burst.count, at);
}
