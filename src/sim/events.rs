//! Events emitted by the simulation for audio, haptic and UI feedback.
//!
//! The simulation never calls its collaborators directly; it queues events
//! during a tick and the host drains them afterwards.

use serde::{Deserialize, Serialize};

use super::pickup::PowerUpKind;
use super::player::PlayerSlot;
use super::state::GamePhase;

/// Named sound effects understood by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    Shoot,
    EnemyHit,
    Explosion,
    PowerUp,
    PlayerHit,
    Bomb,
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Shoot => "shoot",
            Sound::EnemyHit => "enemyHit",
            Sound::Explosion => "explosion",
            Sound::PowerUp => "powerUp",
            Sound::PlayerHit => "playerHit",
            Sound::Bomb => "bomb",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shoot" => Some(Sound::Shoot),
            "enemyHit" => Some(Sound::EnemyHit),
            "explosion" => Some(Sound::Explosion),
            "powerUp" => Some(Sound::PowerUp),
            "playerHit" => Some(Sound::PlayerHit),
            "bomb" => Some(Sound::Bomb),
            _ => None,
        }
    }
}

/// Named vibration patterns understood by the haptic collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Haptic {
    Shoot,
    Hit,
    Explosion,
    Damage,
    PowerUp,
    LevelUp,
    Bomb,
}

impl Haptic {
    pub fn name(&self) -> &'static str {
        match self {
            Haptic::Shoot => "shoot",
            Haptic::Hit => "hit",
            Haptic::Explosion => "explosion",
            Haptic::Damage => "damage",
            Haptic::PowerUp => "powerup",
            Haptic::LevelUp => "levelup",
            Haptic::Bomb => "bomb",
        }
    }
}

/// Something the host should react to after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(Sound),
    Haptic(Haptic),
    /// Session moved to a new phase
    PhaseChanged(GamePhase),
    /// Score crossed a level threshold
    LevelUp { level: u32 },
    /// A player picked up a power-up (drives the indicator banner)
    PowerUpCollected { slot: PlayerSlot, kind: PowerUpKind },
    /// Shared lives exhausted
    GameOver { score: u64, level: u32 },
}
