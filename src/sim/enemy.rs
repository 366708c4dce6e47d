//! Enemy entity: stat table, movement patterns and fire patterns

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ballistics::{BulletKind, Side};
use super::bullet::Bullet;
use super::state::{EntityId, EntityIds};
use crate::consts::{ENEMY_EXIT_MARGIN, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Heavy,
    Shooter,
    Sniper,
    Bomber,
    Boss,
}

/// Positional trajectory rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePattern {
    Straight,
    Zigzag,
    Sine,
}

/// Scripted bullet emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirePattern {
    None,
    Single,
    Spread,
    Aimed,
    Circle,
    Boss,
}

/// Boss sub-pattern, cycled on a fixed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Spread,
    Rotating,
    Spiral,
    Homing,
}

/// Length of one boss sub-pattern phase
pub const BOSS_PHASE_MS: f64 = 3000.0;
/// Chance of an extra random burst on each boss update
pub const BOSS_BURST_CHANCE: f64 = 0.3;
/// Spiral arm advance per volley (radians)
const SPIRAL_STEP: f32 = 0.35;

impl BossPhase {
    /// Sub-pattern active at a given session time
    pub fn at(clock_ms: f64) -> Self {
        match ((clock_ms / BOSS_PHASE_MS) as u64) % 4 {
            0 => BossPhase::Spread,
            1 => BossPhase::Rotating,
            2 => BossPhase::Spiral,
            _ => BossPhase::Homing,
        }
    }
}

/// Base stats for an enemy type at level 1
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub health: i32,
    pub speed: f32,
    pub points: u64,
    pub radius: f32,
    pub move_pattern: MovePattern,
    pub fire_pattern: FirePattern,
    pub fire_interval_ms: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Heavy,
        EnemyKind::Shooter,
        EnemyKind::Sniper,
        EnemyKind::Bomber,
        EnemyKind::Boss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Heavy => "heavy",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Boss => "boss",
        }
    }

    pub fn stats(&self) -> EnemyStats {
        use FirePattern as F;
        use MovePattern as M;
        let (health, speed, points, radius, move_pattern, fire_pattern, fire_interval_ms) =
            match self {
                EnemyKind::Basic => (1, 80.0, 100, 20.0, M::Straight, F::None, 0.0),
                EnemyKind::Fast => (1, 150.0, 150, 20.0, M::Zigzag, F::None, 0.0),
                EnemyKind::Heavy => (3, 50.0, 300, 25.0, M::Straight, F::Single, 2000.0),
                EnemyKind::Shooter => (2, 60.0, 200, 20.0, M::Straight, F::Spread, 1500.0),
                EnemyKind::Sniper => (1, 40.0, 250, 20.0, M::Sine, F::Aimed, 2500.0),
                EnemyKind::Bomber => (4, 30.0, 400, 30.0, M::Straight, F::Circle, 3000.0),
                EnemyKind::Boss => (10, 20.0, 1000, 40.0, M::Sine, F::Boss, 800.0),
            };
        EnemyStats {
            health,
            speed,
            points,
            radius,
            move_pattern,
            fire_pattern,
            fire_interval_ms,
        }
    }

    /// Body color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            EnemyKind::Basic => 0xff6600,
            EnemyKind::Fast => 0xff0066,
            EnemyKind::Heavy => 0x666666,
            EnemyKind::Shooter => 0x9900ff,
            EnemyKind::Sniper => 0xff9900,
            EnemyKind::Bomber => 0x009900,
            EnemyKind::Boss => 0xff0000,
        }
    }
}

/// Level multiplier applied to enemy stats: 1 + (level - 1) * 0.3
pub fn level_multiplier(level: u32) -> f32 {
    1.0 + (level.max(1) - 1) as f32 * 0.3
}

/// Base health scaled by level, rounded down. Integer math keeps the
/// boundary cases exact (10 at level 5 is 22, not 21).
pub fn scaled_health(base: i32, level: u32) -> i32 {
    let tenths = 10 + 3 * (level.max(1) as i64 - 1);
    (base as i64 * tenths / 10) as i32
}

/// Players an enemy can aim at this tick
#[derive(Debug, Clone, Copy)]
pub struct FireContext<'a> {
    /// Session time (drives boss phases and ring rotation)
    pub clock_ms: f64,
    /// Live players as (id, position)
    pub targets: &'a [(EntityId, Vec2)],
}

impl FireContext<'_> {
    fn nearest_target(&self, from: Vec2) -> Option<(EntityId, Vec2)> {
        self.targets.iter().copied().min_by(|a, b| {
            a.1.distance_squared(from)
                .partial_cmp(&b.1.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// Signed horizontal speed for zigzag; magnitude elsewhere
    pub speed: f32,
    pub points: u64,
    pub move_pattern: MovePattern,
    pub fire_pattern: FirePattern,
    pub fire_interval_ms: f32,
    /// Time until the next volley
    pub fire_cooldown_ms: f32,
    move_timer_ms: f32,
    initial_x: f32,
    spiral_angle: f32,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, level: u32) -> Self {
        let stats = kind.stats();
        let health = scaled_health(stats.health, level);
        Self {
            id,
            kind,
            pos,
            radius: stats.radius,
            health,
            max_health: health,
            speed: stats.speed * level_multiplier(level),
            points: stats.points,
            move_pattern: stats.move_pattern,
            fire_pattern: stats.fire_pattern,
            fire_interval_ms: stats.fire_interval_ms,
            fire_cooldown_ms: 0.0,
            move_timer_ms: 0.0,
            initial_x: pos.x,
            spiral_angle: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    /// Fell past the bottom of the playfield
    pub fn exited(&self) -> bool {
        self.pos.y > PLAYFIELD_HEIGHT + ENEMY_EXIT_MARGIN
    }

    /// Health fraction for the health bar (only drawn when damaged)
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Move and fire. New bullets are pushed onto `out`.
    pub fn update(
        &mut self,
        dt_ms: f32,
        ctx: &FireContext<'_>,
        ids: &mut EntityIds,
        rng: &mut impl Rng,
        out: &mut Vec<Bullet>,
    ) {
        self.update_movement(dt_ms);

        if self.move_pattern == MovePattern::Zigzag
            && (self.pos.x < self.radius || self.pos.x > PLAYFIELD_WIDTH - self.radius)
        {
            self.speed = -self.speed;
            self.pos.x = self.pos.x.clamp(self.radius, PLAYFIELD_WIDTH - self.radius);
        }

        if self.fire_pattern == FirePattern::None {
            return;
        }
        if self.fire_pattern == FirePattern::Boss && rng.random_bool(BOSS_BURST_CHANCE) {
            self.fire_burst(ids, rng, out);
        }
        self.fire_cooldown_ms -= dt_ms;
        if self.fire_cooldown_ms > 0.0 {
            return;
        }
        self.fire_cooldown_ms = self.fire_interval_ms;
        self.fire(ctx, ids, out);
    }

    fn update_movement(&mut self, dt_ms: f32) {
        let dt = dt_ms / 1000.0;
        self.move_timer_ms += dt_ms;

        match self.move_pattern {
            MovePattern::Straight => {
                self.pos.y += self.speed * dt;
            }
            MovePattern::Zigzag => {
                self.pos.y += self.speed.abs() * 0.7 * dt;
                self.pos.x += self.speed * dt;
            }
            MovePattern::Sine => {
                self.pos.y += self.speed.abs() * dt;
                self.pos.x = self.initial_x + (self.move_timer_ms * 0.003).sin() * 100.0;
            }
        }
    }

    fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + self.radius)
    }

    fn shot(&self, ids: &mut EntityIds, vel: Vec2) -> Bullet {
        Bullet::new(ids.next(), Side::Enemy, BulletKind::Basic, 1, self.muzzle(), vel)
    }

    /// Three shots at random downward angles
    fn fire_burst(&self, ids: &mut EntityIds, rng: &mut impl Rng, out: &mut Vec<Bullet>) {
        for _ in 0..3 {
            let angle = rng.random_range(FRAC_PI_4..=3.0 * FRAC_PI_4);
            out.push(self.shot(ids, Vec2::from_angle(angle) * 160.0));
        }
    }

    fn fire(&mut self, ctx: &FireContext<'_>, ids: &mut EntityIds, out: &mut Vec<Bullet>) {
        match self.fire_pattern {
            FirePattern::None => {}
            FirePattern::Single => {
                out.push(self.shot(ids, Vec2::new(0.0, 200.0)));
            }
            FirePattern::Spread => {
                for angle in [-0.5f32, -0.25, 0.0, 0.25, 0.5] {
                    let vel = Vec2::new(angle.sin() * 150.0, angle.cos() * 150.0 + 100.0);
                    out.push(self.shot(ids, vel));
                }
            }
            FirePattern::Aimed => {
                if let Some((_, target)) = ctx.nearest_target(self.pos) {
                    let dir = (target - self.pos).normalize_or(Vec2::Y);
                    out.push(self.shot(ids, dir * 200.0));
                }
            }
            FirePattern::Circle => {
                self.fire_ring(ids, out, 8, 120.0, 0.0);
            }
            FirePattern::Boss => self.fire_boss(ctx, ids, out),
        }
    }

    fn fire_ring(&self, ids: &mut EntityIds, out: &mut Vec<Bullet>, count: u32, speed: f32, offset: f32) {
        for i in 0..count {
            let angle = i as f32 * TAU / count as f32 + offset;
            out.push(self.shot(ids, Vec2::from_angle(angle) * speed));
        }
    }

    fn fire_boss(&mut self, ctx: &FireContext<'_>, ids: &mut EntityIds, out: &mut Vec<Bullet>) {
        match BossPhase::at(ctx.clock_ms) {
            BossPhase::Spread => {
                for angle in [-0.8f32, -0.4, 0.0, 0.4, 0.8] {
                    let vel = Vec2::new(angle.sin() * 180.0, angle.cos() * 180.0 + 80.0);
                    out.push(self.shot(ids, vel));
                }
            }
            BossPhase::Rotating => {
                let offset = (ctx.clock_ms * 0.001) as f32;
                self.fire_ring(ids, out, 12, 150.0, offset);
            }
            BossPhase::Spiral => {
                let base = self.spiral_angle;
                self.fire_ring(ids, out, 4, 160.0, base);
                self.spiral_angle = (base + SPIRAL_STEP) % TAU;
            }
            BossPhase::Homing => {
                let Some((target_id, target)) = ctx.nearest_target(self.pos) else {
                    return;
                };
                let dir = (target - self.muzzle()).normalize_or(Vec2::Y);
                for spread in [-0.3f32, 0.3] {
                    let vel = crate::rotate(dir, spread) * 140.0;
                    let bullet =
                        Bullet::new(ids.next(), Side::Enemy, BulletKind::Homing, 1, self.muzzle(), vel)
                            .with_target(Some(target_id));
                    out.push(bullet);
                }
            }
        }
    }
}
