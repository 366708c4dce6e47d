//! Data-driven game balance.
//!
//! [`Tuning`] mirrors the balance constants in [`crate::consts`]. Every field
//! falls back to its compile-time default, so a JSON document only needs the
//! keys it wants to override:
//!
//! ```json
//! { "single": { "starting_lives": 5 }, "level_score_step": 1500 }
//! ```

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::GameMode;

/// Per-mode spawn cadence and life pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeTuning {
    pub starting_lives: u32,
    /// Spawn delay at level 0, before reductions
    pub base_spawn_delay_ms: f32,
    /// Spawn delay never drops below this
    pub min_spawn_delay_ms: f32,
    /// Reduction of the spawn delay per level
    pub spawn_delay_step_ms: f32,
}

impl ModeTuning {
    pub const SINGLE: Self = Self {
        starting_lives: 3,
        base_spawn_delay_ms: 2000.0,
        min_spawn_delay_ms: 500.0,
        spawn_delay_step_ms: 80.0,
    };

    pub const COOP: Self = Self {
        starting_lives: 5,
        base_spawn_delay_ms: 1800.0,
        min_spawn_delay_ms: 400.0,
        spawn_delay_step_ms: 100.0,
    };

    /// max(floor, base - level * step)
    pub fn spawn_delay_ms(&self, level: u32) -> f32 {
        (self.base_spawn_delay_ms - level as f32 * self.spawn_delay_step_ms)
            .max(self.min_spawn_delay_ms)
    }
}

impl Default for ModeTuning {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Runtime-tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Spawning
    pub single: ModeTuning,
    pub coop: ModeTuning,
    /// Chance of a second enemy per coop spawn event
    pub coop_extra_spawn_chance: f64,

    // Invulnerability windows
    pub hit_invulnerable_ms: f32,
    pub shield_break_invulnerable_ms: f32,
    pub respawn_invulnerable_ms: f32,

    // Bombs
    pub bomb_cooldown_ms: f32,
    pub bomb_flash_ms: f32,
    pub bomb_drop_chance: f64,

    // Progression
    pub level_score_step: u64,
    pub power_up_points: u64,
    /// Delay of the extra health drop scheduled by a boss kill
    pub boss_health_drop_delay_ms: f64,

    // Effects
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            single: ModeTuning::SINGLE,
            coop: ModeTuning::COOP,
            coop_extra_spawn_chance: 0.25,
            hit_invulnerable_ms: HIT_INVULNERABLE_MS,
            shield_break_invulnerable_ms: SHIELD_BREAK_INVULNERABLE_MS,
            respawn_invulnerable_ms: RESPAWN_INVULNERABLE_MS,
            bomb_cooldown_ms: BOMB_COOLDOWN_MS,
            bomb_flash_ms: BOMB_FLASH_MS,
            bomb_drop_chance: BOMB_DROP_CHANCE,
            level_score_step: LEVEL_SCORE_STEP,
            power_up_points: POWER_UP_POINTS,
            boss_health_drop_delay_ms: 500.0,
            max_particles: 512,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn mode(&self, mode: GameMode) -> &ModeTuning {
        match mode {
            GameMode::Single => &self.single,
            GameMode::Coop => &self.coop,
        }
    }
}
