/// Game tunables.
///
/// Defaults reproduce the classic scene.  A JSON5 file may override any
/// subset of them; every field is camelCase in the file.

use std::path::Path;

use anyhow::{ensure, Context};
use serde::Deserialize;

/// Hearts keep this far from the side walls.
pub const HEART_MARGIN: f32 = 20.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub window_width: f32,
    pub window_height: f32,

    // ── Stars ─────────────────────────────────────────────────────────────────
    pub max_star_count: u32,
    pub star_lifespan: f32,
    pub star_spawn_min_interval: f32,
    pub star_collect_score: u32,
    pub rare_star_chance: f32,
    /// Rare stars only appear once the score is strictly above this.
    pub rare_star_min_score: u32,
    pub rare_star_multiplier: u32,

    // ── Bombs ─────────────────────────────────────────────────────────────────
    pub bomb_lifespan: f32,
    pub bomb_spawn_min_interval: f32,
    /// Bombs only spawn once the score is strictly above this.
    pub bomb_min_score: u32,
    /// One extra bomb per batch for every `bomb_score_step` points.
    pub bomb_score_step: u32,

    // ── Hearts ────────────────────────────────────────────────────────────────
    pub heart_chance: f32,
    pub heart_min_score: u32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub max_lives: u32,
    pub invincibility_duration: f32,
    pub blink_interval: f32,

    /// Spawned lifespans are scaled by a uniform draw from this range.
    pub lifespan_jitter: (f32, f32),
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            window_width: 800.0,
            window_height: 600.0,
            max_star_count: 5,
            star_lifespan: 6000.0,
            star_spawn_min_interval: 6000.0,
            star_collect_score: 10,
            rare_star_chance: 0.05,
            rare_star_min_score: 100,
            rare_star_multiplier: 10,
            bomb_lifespan: 5000.0,
            bomb_spawn_min_interval: 4000.0,
            bomb_min_score: 50,
            bomb_score_step: 200,
            heart_chance: 0.1,
            heart_min_score: 200,
            max_lives: 5,
            invincibility_duration: 1000.0,
            blink_interval: 100.0,
            lifespan_jitter: (0.8, 1.2),
        }
    }
}

impl GameConfig {
    /// Parse a JSON5 document.  Missing fields keep their defaults.
    pub fn from_json5(text: &str) -> anyhow::Result<Self> {
        let config: GameConfig = json5::from_str(text).context("invalid game config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json5(&text).with_context(|| format!("in config {}", path.display()))
    }

    /// Reject configurations the spawner cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.window_width > 0.0 && self.window_height > 0.0,
            "window must have a positive size, got {}x{}",
            self.window_width,
            self.window_height
        );
        ensure!(self.max_star_count >= 1, "maxStarCount must be at least 1");
        ensure!(
            self.window_width >= 2.0 * HEART_MARGIN,
            "windowWidth must leave room for hearts between the {HEART_MARGIN}px margins, got {}",
            self.window_width
        );
        // star spacing is floor(width / (count + 1)) and must stay at least 1px
        ensure!(
            self.window_width >= (self.max_star_count + 1) as f32,
            "windowWidth {} is too narrow to space {} stars apart",
            self.window_width,
            self.max_star_count
        );
        ensure!(self.max_lives >= 1, "maxLives must be at least 1");
        ensure!(
            self.star_spawn_min_interval > 0.0 && self.bomb_spawn_min_interval > 0.0,
            "spawn intervals must be positive"
        );
        ensure!(
            self.star_lifespan > 0.0 && self.bomb_lifespan > 0.0,
            "lifespans must be positive"
        );
        ensure!(self.bomb_score_step > 0, "bombScoreStep must be positive");
        for (name, p) in [
            ("rareStarChance", self.rare_star_chance),
            ("heartChance", self.heart_chance),
        ] {
            ensure!((0.0..=1.0).contains(&p), "{name} must lie in [0, 1], got {p}");
        }
        let (lo, hi) = self.lifespan_jitter;
        ensure!(
            lo > 0.0 && lo <= hi,
            "lifespanJitter must be a positive, non-empty range, got [{lo}, {hi}]"
        );
        ensure!(self.blink_interval > 0.0, "blinkInterval must be positive");
        Ok(())
    }
}
