//! Player ship: movement, firing, damage and power-up effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ballistics::{BulletKind, MAX_BULLET_LEVEL, SCATTER_FAN_ANGLE, Side};
use super::bullet::Bullet;
use super::pickup::PowerUpKind;
use super::state::{EntityId, EntityIds};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{clamp_to_playfield, rotate};

/// Player identity (control scheme and color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn number(&self) -> u8 {
        match self {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PlayerSlot::One => 0x00ff66,
            PlayerSlot::Two => 0x3399ff,
        }
    }
}

/// Per-player control intent for one tick, produced by the input mapper
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Direct movement, each axis in [-1, 1]
    pub move_dir: Vec2,
    /// Pointer position to steer toward when `move_dir` is zero
    pub steer_toward: Option<Vec2>,
    pub fire: bool,
    pub bomb: bool,
    /// -1 previous bullet type, +1 next, 0 none
    pub cycle: i32,
}

/// Boolean effects; persist until the player takes unshielded damage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub rapid_fire: bool,
    pub multi_shot: bool,
    pub shield: bool,
}

/// Bullet-type unlock levels and the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arsenal {
    /// Level per bullet type (0 = locked), indexed by `BulletKind::index`
    pub levels: [u8; BulletKind::COUNT],
    pub selected: BulletKind,
}

impl Default for Arsenal {
    fn default() -> Self {
        let mut levels = [0; BulletKind::COUNT];
        levels[BulletKind::Basic.index()] = 1;
        Self {
            levels,
            selected: BulletKind::Basic,
        }
    }
}

impl Arsenal {
    pub fn level(&self, kind: BulletKind) -> u8 {
        self.levels[kind.index()]
    }

    pub fn selected_level(&self) -> u8 {
        self.level(self.selected)
    }

    /// Select an unlocked type. Locked types are refused.
    pub fn select(&mut self, kind: BulletKind) -> bool {
        if self.level(kind) == 0 {
            return false;
        }
        self.selected = kind;
        true
    }

    /// Unlock (0 -> 1) or level up a type, then select it
    pub fn unlock_or_upgrade(&mut self, kind: BulletKind) {
        let level = &mut self.levels[kind.index()];
        *level = (*level + 1).min(MAX_BULLET_LEVEL);
        self.selected = kind;
    }

    pub fn upgrade_selected(&mut self) {
        let level = &mut self.levels[self.selected.index()];
        *level = (*level + 1).min(MAX_BULLET_LEVEL);
    }

    /// Step to the next unlocked type in `direction` (wrapping)
    pub fn cycle(&mut self, direction: i32) {
        if direction == 0 {
            return;
        }
        let count = BulletKind::COUNT as i32;
        let step = direction.signum();
        let mut index = self.selected.index() as i32;
        for _ in 0..count {
            index = (index + step).rem_euclid(count);
            let kind = BulletKind::ALL[index as usize];
            if self.select(kind) {
                return;
            }
        }
    }
}

/// Result of an enemy hit on a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Shield broke; health untouched, no life lost
    Absorbed,
    /// Health reduced; consumes a shared life
    Damaged,
}

/// A player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub slot: PlayerSlot,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub invulnerable: bool,
    pub invulnerable_ms: f32,
    pub bombs: u32,
    pub max_bombs: u32,
    pub effects: ActiveEffects,
    pub arsenal: Arsenal,
    pub fire_cooldown_ms: f32,
    pub bomb_cooldown_ms: f32,
}

impl Player {
    pub fn new(id: EntityId, slot: PlayerSlot, pos: Vec2) -> Self {
        Self {
            id,
            slot,
            pos,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            invulnerable: false,
            invulnerable_ms: 0.0,
            bombs: STARTING_BOMBS,
            max_bombs: MAX_BOMBS,
            effects: ActiveEffects::default(),
            arsenal: Arsenal::default(),
            fire_cooldown_ms: 0.0,
            bomb_cooldown_ms: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Live and outside any invulnerability window
    pub fn is_hittable(&self) -> bool {
        self.is_alive() && !self.invulnerable
    }

    pub fn make_invulnerable(&mut self, duration_ms: f32) {
        self.invulnerable = true;
        self.invulnerable_ms = duration_ms;
    }

    /// Respawn in place with full health
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.health = self.max_health;
        self.make_invulnerable(tuning.respawn_invulnerable_ms);
    }

    /// Timers, respawn, movement and type cycling. Firing and bombs are
    /// resolved by the session since they touch shared lists.
    pub fn update(&mut self, dt_ms: f32, intent: &PlayerIntent, tuning: &Tuning) {
        if self.invulnerable {
            self.invulnerable_ms -= dt_ms;
            if self.invulnerable_ms <= 0.0 {
                self.invulnerable = false;
                self.invulnerable_ms = 0.0;
            }
        }
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt_ms).max(0.0);
        self.bomb_cooldown_ms = (self.bomb_cooldown_ms - dt_ms).max(0.0);

        if self.health <= 0 {
            self.respawn(tuning);
        }

        let mut dir = intent.move_dir.clamp(Vec2::NEG_ONE, Vec2::ONE);
        if dir == Vec2::ZERO
            && let Some(target) = intent.steer_toward
        {
            dir = (target - self.pos) * POINTER_INFLUENCE;
        }
        // Full speed in any direction, pointer steering included
        self.pos += dir.normalize_or_zero() * PLAYER_SPEED * (dt_ms / 1000.0);
        self.pos = clamp_to_playfield(self.pos, self.radius);

        self.arsenal.cycle(intent.cycle);
    }

    pub fn fire_interval_ms(&self) -> f32 {
        if self.effects.rapid_fire {
            PLAYER_FIRE_INTERVAL_MS * RAPID_FIRE_FACTOR
        } else {
            PLAYER_FIRE_INTERVAL_MS
        }
    }

    pub fn can_fire(&self) -> bool {
        self.is_alive() && self.fire_cooldown_ms <= 0.0
    }

    /// Fire a volley with the selected bullet type and reset the cooldown.
    /// `target` seeds homing bullets.
    pub fn fire(&mut self, ids: &mut EntityIds, target: Option<EntityId>) -> Vec<Bullet> {
        self.fire_cooldown_ms = self.fire_interval_ms();

        let kind = self.arsenal.selected;
        let level = self.arsenal.selected_level().max(1);
        let speed = PLAYER_BULLET_SPEED * kind.speed_scale();
        let angles: &[f32] = if self.effects.multi_shot {
            &MULTI_SHOT_ANGLES
        } else {
            &[0.0]
        };

        let mut bullets = Vec::new();
        for &angle in angles {
            let origin = Vec2::new(self.pos.x + angle.sin() * 20.0, self.pos.y - self.radius);
            let heading = rotate(Vec2::NEG_Y, angle);
            let spread: &[f32] = if kind == BulletKind::Scatter {
                &[-SCATTER_FAN_ANGLE, 0.0, SCATTER_FAN_ANGLE]
            } else {
                &[0.0]
            };
            for &offset in spread {
                let vel = rotate(heading, offset) * speed;
                let bullet = Bullet::new(ids.next(), Side::Player, kind, level, origin, vel);
                bullets.push(match kind {
                    BulletKind::Homing => bullet.with_target(target),
                    _ => bullet,
                });
            }
        }
        bullets
    }

    /// Apply an enemy hit
    pub fn take_damage(&mut self, amount: i32, tuning: &Tuning) -> DamageOutcome {
        if self.effects.shield {
            self.effects.shield = false;
            self.make_invulnerable(tuning.shield_break_invulnerable_ms);
            return DamageOutcome::Absorbed;
        }
        self.health -= amount;
        self.effects.rapid_fire = false;
        self.effects.multi_shot = false;
        DamageOutcome::Damaged
    }

    /// Spend a bomb charge if one is available and off cooldown
    pub fn try_bomb(&mut self, tuning: &Tuning) -> bool {
        if !self.is_alive() || self.bombs == 0 || self.bomb_cooldown_ms > 0.0 {
            return false;
        }
        self.bombs -= 1;
        self.bomb_cooldown_ms = tuning.bomb_cooldown_ms;
        true
    }

    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::RapidFire => self.effects.rapid_fire = true,
            PowerUpKind::MultiShot => self.effects.multi_shot = true,
            PowerUpKind::Shield => self.effects.shield = true,
            PowerUpKind::Health => self.health = (self.health + 1).min(self.max_health),
            PowerUpKind::Bomb => self.bombs = (self.bombs + 1).min(self.max_bombs),
            PowerUpKind::Bullet(bullet) => self.arsenal.unlock_or_upgrade(bullet),
            PowerUpKind::BulletUpgrade => self.arsenal.upgrade_selected(),
        }
    }
}
