//! Star Barrage - A vertical bullet-hell arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation core (entities, ballistics, spawning, collisions, session state)
//! - `game`: Host-facing controller wiring the simulation to its collaborators
//! - `input`: Normalized input snapshot and per-player control mapping
//! - `renderer`: Draw list built from simulation state
//! - `platform`: Collaborator interfaces (audio, haptics, presentation)
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod haptics;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (canvas pixels, y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Hit-test radius for entities that don't declare one
    pub const DEFAULT_RADIUS: f32 = 15.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 300.0; // px/s
    pub const PLAYER_MAX_HEALTH: i32 = 3;
    pub const PLAYER_SPAWN_OFFSET_Y: f32 = 80.0; // distance from bottom edge
    pub const PLAYER_FIRE_INTERVAL_MS: f32 = 300.0;
    pub const RAPID_FIRE_FACTOR: f32 = 0.3;
    pub const PLAYER_BULLET_SPEED: f32 = 400.0;
    /// Pointer steering strength when no direct movement input is held
    pub const POINTER_INFLUENCE: f32 = 0.05;
    /// Multi-shot fan angles (radians from vertical)
    pub const MULTI_SHOT_ANGLES: [f32; 3] = [-0.3, 0.0, 0.3];

    /// Bombs
    pub const STARTING_BOMBS: u32 = 3;
    pub const MAX_BOMBS: u32 = 5;
    pub const BOMB_COOLDOWN_MS: f32 = 500.0;
    pub const BOMB_FLASH_MS: f32 = 300.0;
    pub const BOMB_DROP_CHANCE: f64 = 0.15;
    /// Boss takes ceil(max_health / BOSS_BOMB_DIVISOR) from a bomb
    pub const BOSS_BOMB_DIVISOR: i32 = 5;

    /// Invulnerability windows
    pub const HIT_INVULNERABLE_MS: f32 = 2000.0;
    pub const SHIELD_BREAK_INVULNERABLE_MS: f32 = 1000.0;
    pub const RESPAWN_INVULNERABLE_MS: f32 = 3000.0;

    /// Collision damage
    pub const ENEMY_BULLET_DAMAGE: i32 = 1;
    pub const ENEMY_RAM_DAMAGE: i32 = 2;

    /// Scoring
    pub const POWER_UP_POINTS: u64 = 50;
    pub const LEVEL_SCORE_STEP: u64 = 1000;

    /// Enemy lifecycle
    pub const ENEMY_SPAWN_Y: f32 = -30.0;
    pub const ENEMY_SPAWN_MARGIN: f32 = 30.0;
    pub const ENEMY_EXIT_MARGIN: f32 = 50.0;

    /// Bullets are culled this far outside the playfield
    pub const BULLET_CULL_MARGIN: f32 = 10.0;

    /// Power-ups
    pub const POWER_UP_RADIUS: f32 = 15.0;
    pub const POWER_UP_FALL_SPEED: f32 = 100.0;
    pub const POWER_UP_EXIT_MARGIN: f32 = 20.0;

    /// Background
    pub const STAR_COUNT: usize = 100;
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Clamp a point so a circle of `radius` stays inside the playfield
#[inline]
pub fn clamp_to_playfield(pos: Vec2, radius: f32) -> Vec2 {
    use consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    Vec2::new(
        pos.x.clamp(radius, PLAYFIELD_WIDTH - radius),
        pos.y.clamp(radius, PLAYFIELD_HEIGHT - radius),
    )
}

/// Whether a point lies outside the playfield expanded by `margin`
#[inline]
pub fn outside_playfield(pos: Vec2, margin: f32) -> bool {
    use consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    pos.x < -margin
        || pos.x > PLAYFIELD_WIDTH + margin
        || pos.y < -margin
        || pos.y > PLAYFIELD_HEIGHT + margin
}
