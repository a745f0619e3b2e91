/// Per-kind spawn and effect parameters.
///
/// Stars, bombs and hearts share one spawn path and one retirement path;
/// everything that differs between them is looked up here.

use rand::Rng;

use crate::config::GameConfig;
use crate::engine::{EmitterConfig, ParticleTexture, Tint, Tween, TINT_RED};
use crate::entities::ActorKind;

/// A one-shot particle effect and how many particles it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    pub config: EmitterConfig,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindPolicy {
    pub kind: ActorKind,
    /// Base lifespan in milliseconds.
    pub lifespan: f32,
    /// Scale the base lifespan by a uniform draw from the configured range.
    pub jitter_lifespan: bool,
    /// Truncate the rolled lifespan to whole milliseconds.
    pub whole_ms_lifespan: bool,
    /// Inclusive integer range for the launch x velocity.
    pub velocity_x: (i32, i32),
    /// Inclusive integer range for the launch y velocity.
    pub velocity_y: (i32, i32),
    pub bounce: f32,
    pub trail: EmitterConfig,
}

impl KindPolicy {
    pub fn for_kind(kind: ActorKind, config: &GameConfig) -> Self {
        match kind {
            ActorKind::Star => KindPolicy {
                kind,
                lifespan: config.star_lifespan,
                jitter_lifespan: true,
                whole_ms_lifespan: true,
                velocity_x: (-200, 200),
                velocity_y: (20, 40),
                bounce: 1.0,
                trail: star_trail(false),
            },
            ActorKind::Bomb => KindPolicy {
                kind,
                lifespan: config.bomb_lifespan,
                jitter_lifespan: true,
                whole_ms_lifespan: false,
                velocity_x: (-200, 200),
                velocity_y: (20, 20),
                bounce: 1.0,
                trail: bomb_trail(),
            },
            ActorKind::Heart => KindPolicy {
                kind,
                lifespan: config.star_lifespan * 2.0,
                jitter_lifespan: false,
                whole_ms_lifespan: false,
                velocity_x: (-200, 200),
                velocity_y: (20, 20),
                bounce: 1.0,
                trail: heart_trail(),
            },
        }
    }

    pub fn roll_lifespan(&self, config: &GameConfig, rng: &mut impl Rng) -> f32 {
        let mut lifespan = self.lifespan;
        if self.jitter_lifespan {
            let (lo, hi) = config.lifespan_jitter;
            lifespan *= rng.gen_range(lo..=hi);
        }
        if self.whole_ms_lifespan {
            lifespan = lifespan.floor();
        }
        lifespan
    }
}

// ── Emitter profiles ──────────────────────────────────────────────────────────

/// Faint trail behind a falling star.  Rare stars glow red a little longer.
pub fn star_trail(rare: bool) -> EmitterConfig {
    EmitterConfig {
        texture: ParticleTexture::Star,
        frequency: Some(50.0),
        lifespan: if rare { 200.0 } else { 150.0 },
        speed: 0.0,
        alpha: Tween::fade(0.5, 0.0),
        tint: rare.then_some(TINT_RED),
        ..EmitterConfig::default()
    }
}

pub fn bomb_trail() -> EmitterConfig {
    EmitterConfig {
        texture: ParticleTexture::Spark,
        frequency: Some(60.0),
        lifespan: 500.0,
        speed: 10.0,
        scale: Tween::random(0.8, 1.2),
        angle: Tween::random(0.0, 270.0),
        alpha: Tween::fade(0.8, 0.0),
        tint: None,
    }
}

pub fn heart_trail() -> EmitterConfig {
    EmitterConfig {
        texture: ParticleTexture::Heart,
        frequency: Some(60.0),
        lifespan: 300.0,
        speed: 10.0,
        scale: Tween::random(0.75, 1.0),
        angle: Tween::random(0.0, 270.0),
        alpha: Tween::fade(0.7, 0.0),
        tint: None,
    }
}

/// Shower of sparks when a star is picked up or fades out.
pub fn star_burst(tint: Tint) -> Burst {
    Burst {
        config: EmitterConfig {
            texture: ParticleTexture::Star,
            frequency: None,
            lifespan: 500.0,
            speed: 100.0,
            alpha: Tween::fade(1.0, 0.0),
            scale: Tween::random(0.3, 0.05),
            tint: Some(tint),
            ..EmitterConfig::default()
        },
        count: 16,
    }
}

pub fn heart_burst() -> Burst {
    Burst {
        config: EmitterConfig {
            texture: ParticleTexture::Heart,
            frequency: None,
            lifespan: 300.0,
            speed: 150.0,
            alpha: Tween::fade(1.0, 0.0),
            scale: Tween::random(0.5, 0.1),
            ..EmitterConfig::default()
        },
        count: 8,
    }
}
