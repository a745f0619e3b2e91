/// Game state types.  Pure data, no logic.

use glam::Vec2;

use crate::config::GameConfig;
use crate::engine::{ActorHandle, EmitterHandle, SpriteKey, TextHandle, Tint};

// ── Actors ────────────────────────────────────────────────────────────────────

/// The short-lived, pooled things that fall through the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Star,
    Bomb,
    Heart,
}

impl ActorKind {
    pub const ALL: [ActorKind; 3] = [ActorKind::Star, ActorKind::Bomb, ActorKind::Heart];

    pub fn sprite(self) -> SpriteKey {
        match self {
            ActorKind::Star => SpriteKey::Star,
            ActorKind::Bomb => SpriteKey::Bomb,
            ActorKind::Heart => SpriteKey::Heart,
        }
    }

    pub fn from_sprite(key: SpriteKey) -> Option<ActorKind> {
        match key {
            SpriteKey::Star => Some(ActorKind::Star),
            SpriteKey::Bomb => Some(ActorKind::Bomb),
            SpriteKey::Heart => Some(ActorKind::Heart),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub handle: ActorHandle,
    pub kind: ActorKind,
    /// Where the spawner placed it.  The live position belongs to the engine.
    pub origin: Vec2,
    /// Launch velocity set at spawn.
    pub velocity: Vec2,
    /// Milliseconds left before the actor expires.
    pub remaining_lifespan: f32,
    pub tint: Tint,
    /// Score awarded on pickup (stars only).
    pub points: u32,
    /// Continuous trail emitter, released on retirement.
    pub emitter: Option<EmitterHandle>,
}

/// Live membership of one actor kind.  Order carries no meaning.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    pub kind: ActorKind,
    pub actors: Vec<Actor>,
}

impl Pool {
    pub fn new(kind: ActorKind) -> Self {
        Pool { kind, actors: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.actors.iter().any(|a| a.handle == handle)
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&Actor> {
        self.actors.iter().find(|a| a.handle == handle)
    }

    pub fn insert(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    pub fn remove(&mut self, handle: ActorHandle) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.handle == handle)?;
        Some(self.actors.swap_remove(idx))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pools {
    pub stars: Pool,
    pub bombs: Pool,
    pub hearts: Pool,
}

impl Default for Pools {
    fn default() -> Self {
        Pools {
            stars: Pool::new(ActorKind::Star),
            bombs: Pool::new(ActorKind::Bomb),
            hearts: Pool::new(ActorKind::Heart),
        }
    }
}

impl Pools {
    pub fn get(&self, kind: ActorKind) -> &Pool {
        match kind {
            ActorKind::Star => &self.stars,
            ActorKind::Bomb => &self.bombs,
            ActorKind::Heart => &self.hearts,
        }
    }

    pub fn get_mut(&mut self, kind: ActorKind) -> &mut Pool {
        match kind {
            ActorKind::Star => &mut self.stars,
            ActorKind::Bomb => &mut self.bombs,
            ActorKind::Heart => &mut self.hearts,
        }
    }

    pub fn total(&self) -> usize {
        self.stars.len() + self.bombs.len() + self.hearts.len()
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Grace period after a bomb hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Invincibility {
    /// Milliseconds of protection left; 0 when not invincible.
    pub remaining: f32,
    /// Time since the last visibility toggle.
    pub blink_timer: f32,
    /// Whether the player is currently drawn faded.
    pub dimmed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    pub max_lives: u32,
    pub status: GameStatus,
    pub invincibility: Invincibility,
}

impl Session {
    pub fn new(max_lives: u32) -> Self {
        Session {
            score: 0,
            lives: max_lives,
            max_lives,
            status: GameStatus::Playing,
            invincibility: Invincibility::default(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility.remaining > 0.0
    }
}

/// Count-up clocks, reset to zero only when their spawn fires.
/// Hearts ride on the bomb clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnTimers {
    pub star: f32,
    pub bomb: f32,
}

// ── Events & input ────────────────────────────────────────────────────────────

/// A contact reported by the engine, drained by the core once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    pub kind_a: SpriteKey,
    pub handle_a: ActorHandle,
    pub kind_b: SpriteKey,
    pub handle_b: ActorHandle,
}

/// Controls held during this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    pub score: Option<TextHandle>,
    pub lives: Option<TextHandle>,
    pub game_over: Vec<TextHandle>,
}

/// Everything the spawner and session controller own for one game.
#[derive(Clone, Debug)]
pub struct Game {
    pub config: GameConfig,
    pub session: Session,
    pub pools: Pools,
    pub timers: SpawnTimers,
    pub player: ActorHandle,
    pub hud: Hud,
}
