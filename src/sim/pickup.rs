//! Power-up items dropped by destroyed enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ballistics::BulletKind;
use super::state::EntityId;
use crate::consts::{PLAYFIELD_HEIGHT, POWER_UP_EXIT_MARGIN, POWER_UP_FALL_SPEED, POWER_UP_RADIUS};

/// Indicator text for identifiers outside the known set
pub const FALLBACK_DISPLAY_NAME: &str = "Power Up";

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    RapidFire,
    MultiShot,
    Shield,
    Health,
    Bomb,
    /// Unlock or level up a specific bullet type and select it
    Bullet(BulletKind),
    /// Level up whichever bullet type is selected
    BulletUpgrade,
}

impl PowerUpKind {
    /// Wire identifier (`rapidFire`, `bullet_laser`, `bullet_upgrade`, ...)
    pub fn name(&self) -> String {
        match self {
            PowerUpKind::RapidFire => "rapidFire".to_string(),
            PowerUpKind::MultiShot => "multiShot".to_string(),
            PowerUpKind::Shield => "shield".to_string(),
            PowerUpKind::Health => "health".to_string(),
            PowerUpKind::Bomb => "bomb".to_string(),
            PowerUpKind::Bullet(kind) => format!("bullet_{}", kind.as_str()),
            PowerUpKind::BulletUpgrade => "bullet_upgrade".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rapidFire" => Some(PowerUpKind::RapidFire),
            "multiShot" => Some(PowerUpKind::MultiShot),
            "shield" => Some(PowerUpKind::Shield),
            "health" => Some(PowerUpKind::Health),
            "bomb" => Some(PowerUpKind::Bomb),
            "bullet_upgrade" => Some(PowerUpKind::BulletUpgrade),
            _ => name
                .strip_prefix("bullet_")
                .and_then(BulletKind::from_str)
                .map(PowerUpKind::Bullet),
        }
    }

    /// Indicator banner text
    pub fn display_name(&self) -> &'static str {
        match self {
            PowerUpKind::RapidFire => "Rapid Fire",
            PowerUpKind::MultiShot => "Multi Shot",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::Health => "Health",
            PowerUpKind::Bomb => "Bomb",
            PowerUpKind::Bullet(BulletKind::Basic) => "Basic Bullets",
            PowerUpKind::Bullet(BulletKind::Piercing) => "Piercing Bullets",
            PowerUpKind::Bullet(BulletKind::Explosive) => "Explosive Bullets",
            PowerUpKind::Bullet(BulletKind::Laser) => "Laser Bullets",
            PowerUpKind::Bullet(BulletKind::Plasma) => "Plasma Bullets",
            PowerUpKind::Bullet(BulletKind::Homing) => "Homing Bullets",
            PowerUpKind::Bullet(BulletKind::Scatter) => "Scatter Bullets",
            PowerUpKind::BulletUpgrade => "Bullet Upgrade",
        }
    }

    /// Short glyph drawn on the pickup
    pub fn glyph(&self) -> &'static str {
        match self {
            PowerUpKind::RapidFire => "R",
            PowerUpKind::MultiShot => "M",
            PowerUpKind::Shield => "S",
            PowerUpKind::Health => "+",
            PowerUpKind::Bomb => "B",
            PowerUpKind::Bullet(_) => "*",
            PowerUpKind::BulletUpgrade => "^",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::RapidFire => 0xffff00,
            PowerUpKind::MultiShot => 0x00ffff,
            PowerUpKind::Shield => 0x0066ff,
            PowerUpKind::Health => 0x00ff00,
            PowerUpKind::Bomb => 0xff6600,
            PowerUpKind::Bullet(kind) => kind.color(),
            PowerUpKind::BulletUpgrade => 0xffffff,
        }
    }
}

/// Indicator text for a raw identifier, falling back for unknown names
pub fn display_name_for(name: &str) -> &'static str {
    PowerUpKind::from_name(name)
        .map(|kind| kind.display_name())
        .unwrap_or(FALLBACK_DISPLAY_NAME)
}

/// A falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Drives the pulse animation
    pub age_ms: f32,
}

impl PowerUp {
    pub fn new(id: EntityId, kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            radius: POWER_UP_RADIUS,
            age_ms: 0.0,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
        self.pos.y += POWER_UP_FALL_SPEED * dt_ms / 1000.0;
    }

    pub fn exited(&self) -> bool {
        self.pos.y > PLAYFIELD_HEIGHT + POWER_UP_EXIT_MARGIN
    }
}
