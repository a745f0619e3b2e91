/// Capability surface of the host 2D engine.
///
/// The game core never simulates motion, detects contacts or draws anything
/// itself.  It only calls through this trait, so any engine that can honour
/// these operations can host the game (`crate::arcade::ArcadeWorld` is the
/// small one shipped with the crate).

use glam::Vec2;

use crate::entities::CollisionEvent;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Opaque id of a sprite/body registered with the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorHandle(pub u32);

/// Opaque id of a particle emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterHandle(pub u32);

/// Opaque id of an on-screen text object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextHandle(pub u32);

// ── Sprites, tints, animations ────────────────────────────────────────────────

/// Every kind of body the game asks the engine to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Platform,
    Star,
    Bomb,
    Heart,
    Explosion,
}

/// 0xRRGGBB colour multiplied into a sprite.
pub type Tint = u32;

pub const TINT_NONE: Tint = 0xffffff;
pub const TINT_RED: Tint = 0xff0000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Animation {
    Left,
    Turn,
    Right,
    BombExplosion,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Keep the current playback if this animation is already running.
    pub ignore_if_playing: bool,
}

/// What the engine does with a sprite once its animation finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnComplete {
    Destroy,
}

// ── Particles ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleTexture {
    Star,
    Spark,
    Heart,
}

/// A start → end value over a particle's life.  With `random` set the
/// engine draws one value between the bounds instead of interpolating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub start: f32,
    pub end: f32,
    pub random: bool,
}

impl Tween {
    pub const fn fade(start: f32, end: f32) -> Self {
        Tween { start, end, random: false }
    }

    pub const fn random(start: f32, end: f32) -> Self {
        Tween { start, end, random: true }
    }

    pub const fn constant(value: f32) -> Self {
        Tween { start: value, end: value, random: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmitterConfig {
    pub texture: ParticleTexture,
    /// Milliseconds between emissions.  `None` makes a one-shot emitter
    /// that only fires on [`Engine::burst`].
    pub frequency: Option<f32>,
    /// Particle lifespan in milliseconds.
    pub lifespan: f32,
    pub speed: f32,
    pub alpha: Tween,
    pub scale: Tween,
    /// Emission angle in degrees.
    pub angle: Tween,
    pub tint: Option<Tint>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        EmitterConfig {
            texture: ParticleTexture::Spark,
            frequency: None,
            lifespan: 1000.0,
            speed: 0.0,
            alpha: Tween::constant(1.0),
            scale: Tween::constant(1.0),
            angle: Tween::random(0.0, 360.0),
            tint: None,
        }
    }
}

// ── Collisions & text ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Report only, bodies pass through each other.
    Overlap,
    /// Separate the bodies and report.
    Collide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub font_size: u16,
    pub stroke: bool,
    /// Anchor the text on its centre instead of its top-left corner.
    pub centered: bool,
}

impl TextStyle {
    pub const HUD: TextStyle = TextStyle { font_size: 32, stroke: false, centered: false };
}

// ── The engine ────────────────────────────────────────────────────────────────

/// Operations the game core invokes on its host.  All positions are in
/// world pixels, all durations in milliseconds.
///
/// Calls naming a handle the engine no longer knows are ignored.
pub trait Engine {
    fn create(&mut self, key: SpriteKey, pos: Vec2) -> ActorHandle;
    fn destroy(&mut self, handle: ActorHandle);
    fn position(&self, handle: ActorHandle) -> Option<Vec2>;
    fn velocity(&self, handle: ActorHandle) -> Option<Vec2>;
    /// True while the body rests on a platform or the floor.
    fn is_touching_down(&self, handle: ActorHandle) -> bool;

    fn set_scale(&mut self, handle: ActorHandle, scale: f32);
    fn set_velocity(&mut self, handle: ActorHandle, velocity: Vec2);
    fn set_bounce(&mut self, handle: ActorHandle, coeff: f32);
    fn set_collide_world_bounds(&mut self, handle: ActorHandle, on: bool);
    fn set_gravity(&mut self, handle: ActorHandle, gravity: Vec2);

    fn set_tint(&mut self, handle: ActorHandle, tint: Tint);
    fn tint(&self, handle: ActorHandle) -> Tint;
    fn set_alpha(&mut self, handle: ActorHandle, alpha: f32);
    fn play_animation(&mut self, handle: ActorHandle, animation: Animation, opts: AnimationOptions);
    fn on_animation_complete(&mut self, handle: ActorHandle, action: OnComplete);

    fn create_emitter(&mut self, config: EmitterConfig) -> EmitterHandle;
    fn attach_follow(&mut self, emitter: EmitterHandle, handle: ActorHandle);
    /// Stop a continuous emitter and release it.
    fn detach(&mut self, emitter: EmitterHandle);
    /// Fire `count` particles at `at`.  One-shot emitters are released by
    /// the engine right after the burst.
    fn burst(&mut self, emitter: EmitterHandle, count: u32, at: Vec2);

    /// Ask the engine to report contacts between bodies of `a` and `b`.
    fn watch(&mut self, a: SpriteKey, b: SpriteKey, contact: Contact);
    /// Contacts detected since the previous poll, in detection order.
    fn poll_collisions(&mut self) -> Vec<CollisionEvent>;

    fn add_text(&mut self, pos: Vec2, text: &str, style: TextStyle) -> TextHandle;
    fn set_text(&mut self, handle: TextHandle, text: &str);
    fn remove_text(&mut self, handle: TextHandle);

    /// Freeze all bodies.  Used once, on game over.
    fn pause_physics(&mut self);
}
