/// Pickup and damage handlers.
///
/// The engine reports contacts as [`CollisionEvent`]s; [`drain_collisions`]
/// pulls them once per tick and routes each one through a small dispatch
/// table keyed by the kind of actor the player touched.

use tracing::{debug, trace, warn};

use crate::compute::{change_lives, game_over, score_label, start_invincibility};
use crate::engine::{ActorHandle, Engine, SpriteKey};
use crate::entities::{ActorKind, CollisionEvent, Game};
use crate::lifecycle::{bomb_explode, consume_heart, destroy_star};

pub type Handler = fn(&mut Game, &mut dyn Engine, ActorHandle);

pub fn handler_for(kind: ActorKind) -> Handler {
    match kind {
        ActorKind::Star => collect_star,
        ActorKind::Bomb => hit_bomb,
        ActorKind::Heart => collect_heart,
    }
}

/// Handle every contact the engine detected since the last tick, in order.
/// Stops early if one of them ends the game.  Returns how many events were
/// routed to a handler.
pub fn drain_collisions(game: &mut Game, engine: &mut dyn Engine) -> usize {
    let mut routed = 0;
    for event in engine.poll_collisions() {
        if game.session.is_game_over() {
            break;
        }
        if dispatch(game, engine, event) {
            routed += 1;
        }
    }
    routed
}

/// Route one contact.  Returns false for contacts that do not involve the
/// player or that name an actor which has already been retired.
pub fn dispatch(game: &mut Game, engine: &mut dyn Engine, event: CollisionEvent) -> bool {
    let (key, handle) = if event.kind_a == SpriteKey::Player && event.handle_a == game.player {
        (event.kind_b, event.handle_b)
    } else if event.kind_b == SpriteKey::Player && event.handle_b == game.player {
        (event.kind_a, event.handle_a)
    } else {
        trace!(?event, "contact without player");
        return false;
    };

    let Some(kind) = ActorKind::from_sprite(key) else {
        return false;
    };
    if !game.pools.get(kind).contains(handle) {
        warn!(?kind, handle = handle.0, "contact with retired actor");
        return false;
    }
    handler_for(kind)(game, engine, handle);
    true
}

pub fn collect_star(game: &mut Game, engine: &mut dyn Engine, star: ActorHandle) {
    if game.session.is_game_over() {
        return;
    }
    let Some(star) = destroy_star(&mut game.pools, engine, star) else {
        return;
    };
    game.session.score += star.points;
    if let Some(text) = game.hud.score {
        engine.set_text(text, &score_label(game.session.score));
    }
    debug!(points = star.points, score = game.session.score, "star collected");
}

/// Lives are not clamped here; spawn gating keeps them at or below the
/// maximum in practice.
pub fn collect_heart(game: &mut Game, engine: &mut dyn Engine, heart: ActorHandle) {
    if game.session.is_game_over() {
        return;
    }
    if consume_heart(&mut game.pools, engine, heart).is_none() {
        return;
    }
    change_lives(game, engine, 1);
    if game.session.lives > game.session.max_lives {
        debug!(lives = game.session.lives, max = game.session.max_lives, "lives above maximum");
    }
}

pub fn hit_bomb(game: &mut Game, engine: &mut dyn Engine, bomb: ActorHandle) {
    if game.session.is_game_over() {
        return;
    }
    if game.session.is_invincible() {
        trace!(handle = bomb.0, "bomb ignored, player invincible");
        return;
    }
    if bomb_explode(&mut game.pools, engine, bomb).is_none() {
        return;
    }

    if game.session.lives > 1 {
        change_lives(game, engine, -1);
        start_invincibility(game);
    } else {
        game_over(game, engine);
    }
}
