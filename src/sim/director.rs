//! Spawn/difficulty director and drop tables

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::ballistics::BulletKind;
use super::enemy::EnemyKind;
use super::pickup::PowerUpKind;
use super::state::GameMode;
use crate::consts::{ENEMY_SPAWN_MARGIN, ENEMY_SPAWN_Y, PLAYFIELD_WIDTH};
use crate::tuning::{ModeTuning, Tuning};

/// Positional jitter applied to each boss drop
pub const BOSS_DROP_JITTER: f32 = 30.0;
/// Chance a boss drops two bullet upgrades instead of one
pub const BOSS_DOUBLE_UPGRADE_CHANCE: f64 = 0.5;

const TIER_1: &[EnemyKind] = &[
    EnemyKind::Basic,
    EnemyKind::Fast,
    EnemyKind::Heavy,
    EnemyKind::Shooter,
];
const TIER_3: &[EnemyKind] = &[
    EnemyKind::Basic,
    EnemyKind::Fast,
    EnemyKind::Heavy,
    EnemyKind::Shooter,
    EnemyKind::Sniper,
    EnemyKind::Bomber,
];
const TIER_5: &[EnemyKind] = &EnemyKind::ALL;

/// Enemy types eligible to spawn at a level
pub fn enemy_pool(level: u32) -> &'static [EnemyKind] {
    match level {
        0..=2 => TIER_1,
        3..=4 => TIER_3,
        _ => TIER_5,
    }
}

/// One enemy the director wants placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: EnemyKind,
    pub pos: Vec2,
}

/// Enemy spawn cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnDirector {
    pub timer_ms: f32,
    pub delay_ms: f32,
}

impl SpawnDirector {
    pub fn new(mode: &ModeTuning) -> Self {
        Self {
            timer_ms: 0.0,
            delay_ms: mode.base_spawn_delay_ms,
        }
    }

    /// Advance the spawn timer; returns the enemies to spawn this tick
    pub fn update(
        &mut self,
        dt_ms: f32,
        level: u32,
        mode: GameMode,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> Vec<SpawnRequest> {
        self.timer_ms += dt_ms;
        if self.timer_ms <= self.delay_ms {
            return Vec::new();
        }

        let mut spawns = vec![random_spawn(level, rng)];
        if mode == GameMode::Coop && rng.random_bool(tuning.coop_extra_spawn_chance.clamp(0.0, 1.0)) {
            spawns.push(random_spawn(level, rng));
        }

        self.timer_ms = 0.0;
        self.delay_ms = tuning.mode(mode).spawn_delay_ms(level);
        spawns
    }
}

fn random_spawn(level: u32, rng: &mut impl Rng) -> SpawnRequest {
    let pool = enemy_pool(level);
    let kind = pool.choose(rng).copied().unwrap_or(EnemyKind::Basic);
    let x = rng.random_range(ENEMY_SPAWN_MARGIN..=PLAYFIELD_WIDTH - ENEMY_SPAWN_MARGIN);
    SpawnRequest {
        kind,
        pos: Vec2::new(x, ENEMY_SPAWN_Y),
    }
}

/// Per-enemy-type drop odds and candidate pool
#[derive(Debug, Clone, Copy)]
pub struct DropProfile {
    pub drop_chance: f64,
    pub bullet_drop_chance: f64,
    pub pool: &'static [PowerUpKind],
}

const fn profile(
    drop_chance: f64,
    bullet_drop_chance: f64,
    pool: &'static [PowerUpKind],
) -> DropProfile {
    DropProfile {
        drop_chance,
        bullet_drop_chance,
        pool,
    }
}

pub fn drop_profile(kind: EnemyKind) -> DropProfile {
    use PowerUpKind::*;
    match kind {
        EnemyKind::Basic => profile(0.10, 0.05, &[RapidFire, MultiShot, Shield, Health]),
        EnemyKind::Fast => profile(0.15, 0.10, &[RapidFire, MultiShot]),
        EnemyKind::Heavy => profile(0.30, 0.20, &[Shield, Health, Bomb]),
        EnemyKind::Shooter => profile(0.25, 0.15, &[RapidFire, MultiShot, Shield]),
        EnemyKind::Sniper => profile(0.35, 0.25, &[RapidFire, Shield, Bomb]),
        EnemyKind::Bomber => profile(0.50, 0.40, &[Bomb, Health, Shield]),
        EnemyKind::Boss => profile(1.0, 0.80, &[RapidFire, MultiShot, Shield, Health, Bomb]),
    }
}

/// Bullet-upgrade items eligible at a level
pub fn bullet_upgrade_pool(level: u32) -> &'static [PowerUpKind] {
    use BulletKind::*;
    use PowerUpKind::{Bullet, BulletUpgrade};
    match level {
        0..=1 => &[Bullet(Piercing), BulletUpgrade],
        2 => &[Bullet(Piercing), BulletUpgrade, Bullet(Explosive), Bullet(Scatter)],
        3..=4 => &[
            Bullet(Piercing),
            BulletUpgrade,
            Bullet(Explosive),
            Bullet(Scatter),
            Bullet(Laser),
            Bullet(Homing),
        ],
        _ => &[
            Bullet(Piercing),
            BulletUpgrade,
            Bullet(Explosive),
            Bullet(Scatter),
            Bullet(Laser),
            Bullet(Homing),
            Bullet(Plasma),
        ],
    }
}

/// Result of a drop roll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drops {
    pub immediate: Vec<(PowerUpKind, Vec2)>,
    /// Released later by the session clock
    pub delayed: Option<(PowerUpKind, Vec2)>,
}

/// Two independent trials: the type's item pool, then a bullet upgrade
pub fn roll_drops(kind: EnemyKind, pos: Vec2, level: u32, rng: &mut impl Rng) -> Drops {
    let profile = drop_profile(kind);
    let boss = kind == EnemyKind::Boss;
    let mut drops = Drops::default();

    if rng.random_bool(profile.drop_chance) {
        let count = if boss { rng.random_range(2..=3) } else { 1 };
        for _ in 0..count {
            if let Some(&item) = profile.pool.choose(rng) {
                let at = if boss { pos + jitter(rng) } else { pos };
                drops.immediate.push((item, at));
            }
        }
    }

    if rng.random_bool(profile.bullet_drop_chance) {
        let count = if boss && rng.random_bool(BOSS_DOUBLE_UPGRADE_CHANCE) {
            2
        } else {
            1
        };
        for _ in 0..count {
            if let Some(&item) = bullet_upgrade_pool(level).choose(rng) {
                let at = if boss { pos + jitter(rng) } else { pos };
                drops.immediate.push((item, at));
            }
        }
    }

    if boss {
        drops.delayed = Some((PowerUpKind::Health, pos));
    }
    drops
}

fn jitter(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(-BOSS_DROP_JITTER..=BOSS_DROP_JITTER),
        rng.random_range(-BOSS_DROP_JITTER..=BOSS_DROP_JITTER),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_enemy_pool_gating() {
        assert_eq!(enemy_pool(1).len(), 4);
        assert!(!enemy_pool(2).contains(&EnemyKind::Sniper));
        assert!(enemy_pool(3).contains(&EnemyKind::Bomber));
        assert!(!enemy_pool(4).contains(&EnemyKind::Boss));
        assert!(enemy_pool(5).contains(&EnemyKind::Boss));
    }

    #[test]
    fn test_spawn_cadence_single() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut director = SpawnDirector::new(tuning.mode(GameMode::Single));

        assert!(director.update(2000.0, 1, GameMode::Single, &tuning, &mut rng).is_empty());
        let spawns = director.update(1.0, 1, GameMode::Single, &tuning, &mut rng);
        assert_eq!(spawns.len(), 1);
        assert_eq!(director.timer_ms, 0.0);
        assert_eq!(director.delay_ms, 1920.0);

        let spawn = spawns[0];
        assert_eq!(spawn.pos.y, ENEMY_SPAWN_Y);
        assert!(spawn.pos.x >= ENEMY_SPAWN_MARGIN);
        assert!(spawn.pos.x <= PLAYFIELD_WIDTH - ENEMY_SPAWN_MARGIN);
        assert!(enemy_pool(1).contains(&spawn.kind));
    }

    #[test]
    fn test_coop_sometimes_spawns_two() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut director = SpawnDirector::new(tuning.mode(GameMode::Coop));
        let mut counts = [0usize; 3];
        for _ in 0..400 {
            let n = director.update(5000.0, 1, GameMode::Coop, &tuning, &mut rng).len();
            counts[n] += 1;
        }
        assert_eq!(counts[0], 0);
        assert!(counts[1] > 0);
        assert!(counts[2] > 0);
        assert_eq!(director.delay_ms, 1700.0);
    }

    #[test]
    fn test_boss_always_drops() {
        let mut rng = Pcg32::seed_from_u64(11);
        let pos = Vec2::new(400.0, 200.0);
        for _ in 0..50 {
            let drops = roll_drops(EnemyKind::Boss, pos, 5, &mut rng);
            let pool_items = drops
                .immediate
                .iter()
                .filter(|(k, _)| drop_profile(EnemyKind::Boss).pool.contains(k))
                .count();
            assert!((2..=3).contains(&pool_items));
            assert!(drops.immediate.len() <= 5);
            assert_eq!(drops.delayed, Some((PowerUpKind::Health, pos)));
            for (_, at) in &drops.immediate {
                assert!((at.x - pos.x).abs() <= BOSS_DROP_JITTER);
                assert!((at.y - pos.y).abs() <= BOSS_DROP_JITTER);
            }
        }
    }

    #[test]
    fn test_regular_drops_stay_in_pool() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..500 {
            let drops = roll_drops(EnemyKind::Fast, Vec2::ZERO, 1, &mut rng);
            assert!(drops.delayed.is_none());
            assert!(drops.immediate.len() <= 2);
            for (kind, pos) in drops.immediate {
                assert_eq!(pos, Vec2::ZERO);
                assert!(
                    drop_profile(EnemyKind::Fast).pool.contains(&kind)
                        || bullet_upgrade_pool(1).contains(&kind)
                );
            }
        }
    }

    #[test]
    fn test_upgrade_pool_gating() {
        assert!(!bullet_upgrade_pool(1).contains(&PowerUpKind::Bullet(BulletKind::Explosive)));
        assert!(bullet_upgrade_pool(2).contains(&PowerUpKind::Bullet(BulletKind::Scatter)));
        assert!(bullet_upgrade_pool(3).contains(&PowerUpKind::Bullet(BulletKind::Homing)));
        assert!(!bullet_upgrade_pool(4).contains(&PowerUpKind::Bullet(BulletKind::Plasma)));
        assert!(bullet_upgrade_pool(5).contains(&PowerUpKind::Bullet(BulletKind::Plasma)));
    }
}
