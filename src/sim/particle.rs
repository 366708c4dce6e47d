//! Cosmetic particles and the scrolling starfield

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Velocity retained per tick
pub const PARTICLE_FRICTION: f32 = 0.98;
/// Downward acceleration (px/s^2)
pub const PARTICLE_GRAVITY: f32 = 100.0;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life_ms: f32,
    pub max_life_ms: f32,
    pub size: f32,
}

impl Particle {
    pub fn update(&mut self, dt_ms: f32) {
        let dt = dt_ms / 1000.0;
        self.pos += self.vel * dt;
        self.vel *= PARTICLE_FRICTION;
        self.vel.y += PARTICLE_GRAVITY * dt;
        self.life_ms -= dt_ms;
    }

    pub fn is_dead(&self) -> bool {
        self.life_ms <= 0.0
    }

    /// Opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.max_life_ms <= 0.0 {
            return 0.0;
        }
        (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
    }
}

/// Shape of a particle burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub count: usize,
    /// Each velocity component is uniform in [-spread, spread]
    pub spread: f32,
    pub life_ms: f32,
    /// Extra random life on top of `life_ms`
    pub life_jitter_ms: f32,
}

impl Burst {
    pub const ENEMY_EXPLOSION: Self = Self {
        count: 15,
        spread: 200.0,
        life_ms: 1000.0,
        life_jitter_ms: 500.0,
    };
    pub const EXPLOSION: Self = Self {
        count: 8,
        ..Self::ENEMY_EXPLOSION
    };
    pub const HIT: Self = Self {
        count: 5,
        spread: 100.0,
        life_ms: 300.0,
        life_jitter_ms: 0.0,
    };
    pub const POWER_UP: Self = Self {
        count: 10,
        spread: 150.0,
        life_ms: 800.0,
        life_jitter_ms: 0.0,
    };
    pub const LEVEL_UP: Self = Self {
        count: 20,
        spread: 250.0,
        life_ms: 1500.0,
        life_jitter_ms: 0.0,
    };
}

/// Push a burst onto `particles`, dropping the oldest beyond `cap`
pub fn emit_burst(
    particles: &mut Vec<Particle>,
    cap: usize,
    burst: Burst,
    pos: Vec2,
    color: u32,
    rng: &mut impl Rng,
) {
    for _ in 0..burst.count {
        let vel = Vec2::new(
            rng.random_range(-burst.spread..=burst.spread),
            rng.random_range(-burst.spread..=burst.spread),
        );
        let life = burst.life_ms + rng.random::<f32>() * burst.life_jitter_ms;
        particles.push(Particle {
            pos,
            vel,
            color,
            life_ms: life,
            max_life_ms: life,
            size: rng.random_range(1.0..=3.0),
        });
    }
    if particles.len() > cap {
        let excess = particles.len() - cap;
        particles.drain(..excess);
    }
}

/// A background star
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// Scroll rate in px per 10 ms
    pub speed: f32,
    pub size: f32,
    pub brightness: f32,
}

impl Star {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(0.0..PLAYFIELD_WIDTH),
                rng.random_range(0.0..PLAYFIELD_HEIGHT),
            ),
            speed: rng.random_range(0.5..2.5),
            size: rng.random_range(1.0..3.0),
            brightness: rng.random_range(0.2..1.0),
        }
    }

    /// Scroll down, wrapping to the top at a new x
    pub fn update(&mut self, dt_ms: f32, rng: &mut impl Rng) {
        self.pos.y += self.speed * dt_ms * 0.1;
        if self.pos.y > PLAYFIELD_HEIGHT {
            self.pos.y = -self.size;
            self.pos.x = rng.random_range(0.0..PLAYFIELD_WIDTH);
        }
    }
}
