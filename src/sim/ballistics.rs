//! Per-bullet-type attribute table and flight behaviors
//!
//! Every bullet property that depends on its type is resolved here, once,
//! from `{kind, level, side}`. The per-tick hooks (homing, laser, plasma,
//! scatter) are pure functions over velocity so they can be tested without a
//! session.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rotate;

/// Highest level a bullet type can reach
pub const MAX_BULLET_LEVEL: u8 = 5;

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Bullet types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum BulletKind {
    #[default]
    Basic,
    Piercing,
    Explosive,
    Laser,
    Plasma,
    Homing,
    Scatter,
}

impl BulletKind {
    pub const COUNT: usize = 7;

    pub const ALL: [BulletKind; Self::COUNT] = [
        BulletKind::Basic,
        BulletKind::Piercing,
        BulletKind::Explosive,
        BulletKind::Laser,
        BulletKind::Plasma,
        BulletKind::Homing,
        BulletKind::Scatter,
    ];

    /// Stable index into per-type arrays
    pub fn index(&self) -> usize {
        match self {
            BulletKind::Basic => 0,
            BulletKind::Piercing => 1,
            BulletKind::Explosive => 2,
            BulletKind::Laser => 3,
            BulletKind::Plasma => 4,
            BulletKind::Homing => 5,
            BulletKind::Scatter => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulletKind::Basic => "basic",
            BulletKind::Piercing => "piercing",
            BulletKind::Explosive => "explosive",
            BulletKind::Laser => "laser",
            BulletKind::Plasma => "plasma",
            BulletKind::Homing => "homing",
            BulletKind::Scatter => "scatter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Base damage at level 1
    pub fn base_damage(&self) -> u32 {
        match self {
            BulletKind::Basic => 1,
            BulletKind::Piercing => 1,
            BulletKind::Explosive => 2,
            BulletKind::Laser => 1,
            BulletKind::Plasma => 3,
            BulletKind::Homing => 2,
            BulletKind::Scatter => 1,
        }
    }

    /// Base hit radius at level 1
    pub fn base_radius(&self) -> f32 {
        match self {
            BulletKind::Basic => 3.0,
            BulletKind::Piercing => 3.0,
            BulletKind::Explosive => 5.0,
            BulletKind::Laser => 2.0,
            BulletKind::Plasma => 6.0,
            BulletKind::Homing => 4.0,
            BulletKind::Scatter => 3.0,
        }
    }

    /// Number of past positions kept for the trail
    pub fn trail_length(&self) -> usize {
        match self {
            BulletKind::Basic => 5,
            BulletKind::Piercing => 8,
            BulletKind::Explosive => 4,
            BulletKind::Laser => 12,
            BulletKind::Plasma => 6,
            BulletKind::Homing => 10,
            BulletKind::Scatter => 3,
        }
    }

    /// Time budget before the bullet expires
    pub fn lifetime_ms(&self) -> f32 {
        match self {
            BulletKind::Basic => 3000.0,
            BulletKind::Piercing => 3000.0,
            BulletKind::Explosive => 2500.0,
            BulletKind::Laser => 1500.0,
            BulletKind::Plasma => 2000.0,
            BulletKind::Homing => 5000.0,
            BulletKind::Scatter => 1800.0,
        }
    }

    /// Muzzle speed relative to the shooter's base bullet speed
    pub fn speed_scale(&self) -> f32 {
        match self {
            BulletKind::Basic => 1.0,
            BulletKind::Piercing => 1.2,
            BulletKind::Explosive => 0.8,
            BulletKind::Laser => 1.5,
            BulletKind::Plasma => 0.9,
            BulletKind::Homing => 0.7,
            BulletKind::Scatter => 1.0,
        }
    }

    /// Enemies a bullet can pass through before it is spent
    pub fn penetration(&self, level: u8) -> u32 {
        match self {
            BulletKind::Piercing => level as u32,
            BulletKind::Laser => (level / 2) as u32,
            BulletKind::Plasma => 1,
            _ => 0,
        }
    }

    /// Splash radius on impact (0 = no splash)
    pub fn explosion_radius(&self, level: u8) -> f32 {
        let level = level as f32;
        match self {
            BulletKind::Explosive => 30.0 + 10.0 * level,
            BulletKind::Plasma => 20.0 + 5.0 * level,
            BulletKind::Homing => 15.0 + 5.0 * level,
            _ => 0.0,
        }
    }

    /// Player bullet color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            BulletKind::Basic => 0x00ffff,
            BulletKind::Piercing => 0xffff00,
            BulletKind::Explosive => 0xff6600,
            BulletKind::Laser => 0xff00ff,
            BulletKind::Plasma => 0x66ccff,
            BulletKind::Homing => 0x00ff66,
            BulletKind::Scatter => 0xffaa00,
        }
    }
}

/// Clamp a requested level into the valid `1..=5` range
pub fn clamp_level(level: u8) -> u8 {
    level.clamp(1, MAX_BULLET_LEVEL)
}

/// Fully resolved attributes for one bullet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ballistics {
    pub kind: BulletKind,
    pub level: u8,
    pub damage: u32,
    pub radius: f32,
    pub trail_length: usize,
    pub penetration: u32,
    pub explosion_radius: f32,
    pub lifetime_ms: f32,
    pub speed_scale: f32,
}

impl Ballistics {
    /// Resolve attributes for a bullet. Enemy bullets ignore level.
    pub fn resolve(kind: BulletKind, level: u8, side: Side) -> Self {
        let level = match side {
            Side::Player => clamp_level(level),
            Side::Enemy => 1,
        };
        Self {
            kind,
            level,
            damage: kind.base_damage() * level as u32,
            radius: kind.base_radius() + (level / 2) as f32,
            trail_length: kind.trail_length(),
            penetration: kind.penetration(level),
            explosion_radius: kind.explosion_radius(level),
            lifetime_ms: kind.lifetime_ms(),
            speed_scale: kind.speed_scale(),
        }
    }
}

// === Flight behaviors ===

/// Homing turn rate per level (radians per second)
pub const HOMING_TURN_RATE: f32 = 1.5;
/// Laser speed growth (fraction of current speed per second)
pub const LASER_ACCELERATION: f32 = 1.5;
/// Laser speed cap
pub const LASER_MAX_SPEED: f32 = 1500.0;
/// Plasma wobble amplitude per level (pixels)
pub const PLASMA_WOBBLE_AMPLITUDE: f32 = 8.0;
/// Plasma wobble angular frequency (radians per ms)
pub const PLASMA_WOBBLE_FREQUENCY: f32 = 0.012;
/// Per-tick chance a scatter pellet changes direction
pub const SCATTER_PERTURB_CHANCE: f64 = 0.05;
/// Max scatter direction change (radians)
pub const SCATTER_PERTURB_ANGLE: f32 = 0.25;
/// Fan half-angle used when firing scatter pellets
pub const SCATTER_FAN_ANGLE: f32 = 0.15;

/// Turn `vel` toward `target` by at most `HOMING_TURN_RATE * level * dt`,
/// keeping its speed.
pub fn steer_homing(pos: Vec2, vel: Vec2, target: Vec2, level: u8, dt_ms: f32) -> Vec2 {
    let speed = vel.length();
    let desired = target - pos;
    if speed <= f32::EPSILON || desired.length_squared() <= f32::EPSILON {
        return vel;
    }
    let max_turn = HOMING_TURN_RATE * level as f32 * dt_ms / 1000.0;
    let angle = vel.angle_to(desired);
    let turn = angle.clamp(-max_turn, max_turn);
    rotate(vel, turn)
}

/// Grow laser speed over time up to `LASER_MAX_SPEED`
pub fn accelerate_laser(vel: Vec2, dt_ms: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON {
        return vel;
    }
    let new_speed = (speed * (1.0 + LASER_ACCELERATION * dt_ms / 1000.0)).min(LASER_MAX_SPEED);
    vel / speed * new_speed
}

/// Lateral plasma offset at a given bullet age
pub fn plasma_offset(age_ms: f32, level: u8) -> f32 {
    (age_ms * PLASMA_WOBBLE_FREQUENCY).sin() * PLASMA_WOBBLE_AMPLITUDE * level as f32
}

/// Sideways displacement to apply this tick so the bullet follows
/// `plasma_offset` around its straight path.
pub fn plasma_wobble(vel: Vec2, age_before_ms: f32, age_after_ms: f32, level: u8) -> Vec2 {
    let perp = vel.perp().normalize_or_zero();
    perp * (plasma_offset(age_after_ms, level) - plasma_offset(age_before_ms, level))
}

/// Occasionally jitter a scatter pellet's heading
pub fn perturb_scatter(vel: Vec2, rng: &mut impl Rng) -> Vec2 {
    if rng.random_bool(SCATTER_PERTURB_CHANCE) {
        let angle = rng.random_range(-SCATTER_PERTURB_ANGLE..=SCATTER_PERTURB_ANGLE);
        rotate(vel, angle)
    } else {
        vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_penetration_by_type() {
        assert_eq!(Ballistics::resolve(BulletKind::Piercing, 4, Side::Player).penetration, 4);
        assert_eq!(Ballistics::resolve(BulletKind::Laser, 5, Side::Player).penetration, 2);
        assert_eq!(Ballistics::resolve(BulletKind::Laser, 1, Side::Player).penetration, 0);
        assert_eq!(Ballistics::resolve(BulletKind::Plasma, 3, Side::Player).penetration, 1);
        assert_eq!(Ballistics::resolve(BulletKind::Basic, 5, Side::Player).penetration, 0);
    }

    #[test]
    fn test_explosion_radius_only_for_splash_types() {
        for kind in BulletKind::ALL {
            let b = Ballistics::resolve(kind, 3, Side::Player);
            let splashes = matches!(
                kind,
                BulletKind::Explosive | BulletKind::Plasma | BulletKind::Homing
            );
            assert_eq!(b.explosion_radius > 0.0, splashes, "{:?}", kind);
        }
    }

    #[test]
    fn test_lifetimes_in_range() {
        for kind in BulletKind::ALL {
            let life = kind.lifetime_ms();
            assert!((1500.0..=5000.0).contains(&life), "{:?}", kind);
        }
    }

    #[test]
    fn test_enemy_bullets_ignore_level() {
        let b = Ballistics::resolve(BulletKind::Homing, 5, Side::Enemy);
        assert_eq!(b.level, 1);
        assert_eq!(b.damage, 2);
    }

    #[test]
    fn test_radius_grows_every_two_levels() {
        assert_eq!(Ballistics::resolve(BulletKind::Basic, 1, Side::Player).radius, 3.0);
        assert_eq!(Ballistics::resolve(BulletKind::Basic, 2, Side::Player).radius, 4.0);
        assert_eq!(Ballistics::resolve(BulletKind::Basic, 5, Side::Player).radius, 5.0);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in BulletKind::ALL {
            assert_eq!(BulletKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(BulletKind::from_str("railgun"), None);
    }

    #[test]
    fn test_homing_turn_is_bounded() {
        let pos = Vec2::ZERO;
        let vel = Vec2::new(0.0, -100.0);
        // Target directly to the right: a 90 degree turn is needed
        let target = Vec2::new(100.0, 0.0);
        let steered = steer_homing(pos, vel, target, 1, 100.0);
        let turned = vel.angle_to(steered).abs();
        assert!((turned - HOMING_TURN_RATE * 0.1).abs() < 1e-4);
        assert!((steered.length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_homing_higher_level_turns_faster() {
        let vel = Vec2::new(0.0, -100.0);
        let target = Vec2::new(100.0, 0.0);
        let slow = vel.angle_to(steer_homing(Vec2::ZERO, vel, target, 1, 50.0)).abs();
        let fast = vel.angle_to(steer_homing(Vec2::ZERO, vel, target, 4, 50.0)).abs();
        assert!(fast > slow);
    }

    #[test]
    fn test_laser_accelerates_and_caps() {
        let vel = Vec2::new(0.0, -600.0);
        let faster = accelerate_laser(vel, 16.0);
        assert!(faster.length() > 600.0);
        assert!(faster.x.abs() < 1e-4);

        let mut v = vel;
        for _ in 0..1000 {
            v = accelerate_laser(v, 16.0);
        }
        assert!((v.length() - LASER_MAX_SPEED).abs() < 1e-2);
    }

    #[test]
    fn test_plasma_wobble_is_lateral() {
        let vel = Vec2::new(0.0, -300.0);
        let d = plasma_wobble(vel, 0.0, 100.0, 3);
        assert!(d.y.abs() < 1e-4);
        assert!(d.x.abs() > 0.0);
    }

    #[test]
    fn test_scatter_keeps_speed() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut vel = Vec2::new(0.0, -400.0);
        for _ in 0..500 {
            vel = perturb_scatter(vel, &mut rng);
        }
        assert!((vel.length() - 400.0).abs() < 0.5);
    }

    proptest! {
        #[test]
        fn prop_damage_is_base_times_level(idx in 0usize..BulletKind::COUNT, level in 1u8..=5) {
            let kind = BulletKind::ALL[idx];
            let b = Ballistics::resolve(kind, level, Side::Player);
            prop_assert_eq!(b.damage, kind.base_damage() * level as u32);
        }
    }
}
