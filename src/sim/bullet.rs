//! Bullet entity
//!
//! Attributes come from the ballistics table at construction time; the
//! per-tick update only applies the flight hook matching the bullet's kind.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ballistics::{
    Ballistics, BulletKind, Side, accelerate_laser, perturb_scatter, plasma_wobble, steer_homing,
};
use super::state::EntityId;
use crate::consts::BULLET_CULL_MARGIN;
use crate::outside_playfield;

/// A bullet fired by a player or an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub side: Side,
    pub kind: BulletKind,
    pub level: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: u32,
    pub radius: f32,
    /// Enemies this bullet can still pass through
    pub penetration_left: u32,
    pub explosion_radius: f32,
    pub age_ms: f32,
    pub lifetime_ms: f32,
    /// Lookup-only homing target; a missing entity means no steering
    pub target: Option<EntityId>,
    /// Enemies already damaged (a piercing bullet never hits one twice)
    #[serde(default)]
    pub hit_ids: Vec<EntityId>,
    /// Recent positions, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
    #[serde(skip)]
    trail_length: usize,
}

impl Bullet {
    pub fn new(id: EntityId, side: Side, kind: BulletKind, level: u8, pos: Vec2, vel: Vec2) -> Self {
        let b = Ballistics::resolve(kind, level, side);
        Self {
            id,
            side,
            kind,
            level: b.level,
            pos,
            vel,
            damage: b.damage,
            radius: b.radius,
            penetration_left: b.penetration,
            explosion_radius: b.explosion_radius,
            age_ms: 0.0,
            lifetime_ms: b.lifetime_ms,
            target: None,
            hit_ids: Vec::new(),
            trail: VecDeque::with_capacity(b.trail_length),
            trail_length: b.trail_length,
        }
    }

    pub fn with_target(mut self, target: Option<EntityId>) -> Self {
        self.target = target;
        self
    }

    /// Advance one tick. `target_pos` is the resolved homing target, if it
    /// still exists.
    pub fn update(&mut self, dt_ms: f32, target_pos: Option<Vec2>, rng: &mut impl Rng) {
        self.record_trail();

        let age_before = self.age_ms;
        self.age_ms += dt_ms;

        match self.kind {
            BulletKind::Homing => {
                if let Some(target) = target_pos {
                    self.vel = steer_homing(self.pos, self.vel, target, self.level, dt_ms);
                }
            }
            BulletKind::Laser => {
                self.vel = accelerate_laser(self.vel, dt_ms);
            }
            BulletKind::Plasma => {
                self.pos += plasma_wobble(self.vel, age_before, self.age_ms, self.level);
            }
            BulletKind::Scatter => {
                self.vel = perturb_scatter(self.vel, rng);
            }
            BulletKind::Basic | BulletKind::Piercing | BulletKind::Explosive => {}
        }

        self.pos += self.vel * (dt_ms / 1000.0);
    }

    fn record_trail(&mut self) {
        if self.trail_length == 0 {
            return;
        }
        self.trail.push_back(self.pos);
        while self.trail.len() > self.trail_length {
            self.trail.pop_front();
        }
    }

    /// Lifetime budget used up
    pub fn expired(&self) -> bool {
        self.age_ms > self.lifetime_ms
    }

    /// Should be removed this tick (expired or off-screen)
    pub fn is_spent(&self) -> bool {
        self.expired() || outside_playfield(self.pos, BULLET_CULL_MARGIN)
    }

    /// Whether this bullet detonates with splash damage
    pub fn explodes(&self) -> bool {
        self.explosion_radius > 0.0
    }

    /// Color used for the bullet and its trail
    pub fn color(&self) -> u32 {
        match self.side {
            Side::Player => self.kind.color(),
            Side::Enemy => 0xff3366,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player_bullet(kind: BulletKind, level: u8) -> Bullet {
        Bullet::new(
            EntityId(1),
            Side::Player,
            kind,
            level,
            Vec2::new(400.0, 300.0),
            Vec2::new(0.0, -400.0),
        )
    }

    #[test]
    fn test_bullet_moves_with_velocity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Basic, 1);
        b.update(100.0, None, &mut rng);
        assert!((b.pos.y - 260.0).abs() < 1e-3);
        assert!((b.pos.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Basic, 1);
        for _ in 0..20 {
            b.update(1.0, None, &mut rng);
        }
        assert_eq!(b.trail.len(), BulletKind::Basic.trail_length());
    }

    #[test]
    fn test_expires_after_lifetime_regardless_of_position() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Laser, 1);
        b.vel = Vec2::ZERO;
        b.update(1499.0, None, &mut rng);
        assert!(!b.expired());
        b.update(2.0, None, &mut rng);
        assert!(b.expired());
        assert!(b.is_spent());
    }

    #[test]
    fn test_leaves_playfield() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Basic, 1);
        b.pos = Vec2::new(400.0, -5.0);
        b.update(50.0, None, &mut rng);
        assert!(b.is_spent());
    }

    #[test]
    fn test_homing_without_target_flies_straight() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Homing, 3).with_target(Some(EntityId(99)));
        let vel = b.vel;
        b.update(16.0, None, &mut rng);
        assert_eq!(b.vel, vel);
    }

    #[test]
    fn test_homing_with_target_turns() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut b = player_bullet(BulletKind::Homing, 3).with_target(Some(EntityId(99)));
        b.update(16.0, Some(Vec2::new(600.0, 300.0)), &mut rng);
        assert!(b.vel.x > 0.0);
    }

    #[test]
    fn test_only_blast_kinds_explode() {
        assert!(player_bullet(BulletKind::Explosive, 1).explodes());
        assert!(player_bullet(BulletKind::Plasma, 1).explodes());
        assert!(player_bullet(BulletKind::Homing, 1).explodes());
        assert!(!player_bullet(BulletKind::Basic, 5).explodes());
        assert!(!player_bullet(BulletKind::Laser, 5).explodes());
    }

    #[test]
    fn test_damage_derived_from_table() {
        let b = player_bullet(BulletKind::Plasma, 4);
        assert_eq!(b.damage, 12);
        assert_eq!(b.penetration_left, 1);
    }
}
