//! Collision detection and resolution
//!
//! Hit-testing is plain circle overlap. Resolution runs four ordered passes
//! once per tick; within a pass each bullet, enemy, player and power-up takes
//! part in at most one resolving collision (first match wins).

use std::collections::HashSet;

use glam::Vec2;

use super::bullet::Bullet;
use super::enemy::Enemy;
use super::events::{GameEvent, Haptic, Sound};
use super::particle::Burst;
use super::pickup::PowerUp;
use super::player::{DamageOutcome, Player};
use super::state::{EntityId, GameState};
use crate::consts::{DEFAULT_RADIUS, ENEMY_BULLET_DAMAGE, ENEMY_RAM_DAMAGE};

/// Anything with a circular hit area
pub trait Collider {
    fn center(&self) -> Vec2;

    /// Declared radius; zero or negative means unset
    fn radius(&self) -> f32 {
        0.0
    }

    fn hit_radius(&self) -> f32 {
        let r = self.radius();
        if r > 0.0 { r } else { DEFAULT_RADIUS }
    }
}

macro_rules! impl_collider {
    ($($ty:ty),*) => {
        $(impl Collider for $ty {
            fn center(&self) -> Vec2 {
                self.pos
            }

            fn radius(&self) -> f32 {
                self.radius
            }
        })*
    };
}

impl_collider!(Bullet, Enemy, Player, PowerUp);

/// Strict overlap: touching circles do not collide
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

pub fn colliding(a: &impl Collider, b: &impl Collider) -> bool {
    circles_overlap(a.center(), a.hit_radius(), b.center(), b.hit_radius())
}

/// Run all four passes in order
pub fn resolve_collisions(state: &mut GameState) {
    player_bullets_vs_enemies(state);
    enemy_bullets_vs_players(state);
    enemies_vs_players(state);
    power_ups_vs_players(state);
}

/// Pass 1: bullet damage, splash, piercing and kills
fn player_bullets_vs_enemies(state: &mut GameState) {
    let mut struck: HashSet<EntityId> = HashSet::new();
    let mut i = 0;
    while i < state.player_bullets.len() {
        let bullet = &state.player_bullets[i];
        let target = state.enemies.iter().position(|e| {
            e.is_alive()
                && !struck.contains(&e.id)
                && !bullet.hit_ids.contains(&e.id)
                && colliding(bullet, e)
        });
        let Some(index) = target else {
            i += 1;
            continue;
        };

        let damage = bullet.damage as i32;
        let impact = bullet.pos;
        let color = bullet.color();
        let splash_radius = bullet.explodes().then_some(bullet.explosion_radius);

        let enemy = &mut state.enemies[index];
        let enemy_id = enemy.id;
        enemy.take_damage(damage);
        struck.insert(enemy_id);

        if let Some(splash_radius) = splash_radius {
            apply_splash(&mut state.enemies, enemy_id, impact, splash_radius, damage);
            state.spawn_particles(Burst::EXPLOSION, impact, color);
        }
        state.spawn_particles(Burst::HIT, impact, color);
        state.feedback(Sound::EnemyHit, Haptic::Hit);

        let bullet = &mut state.player_bullets[i];
        if bullet.penetration_left > 0 {
            bullet.penetration_left -= 1;
            bullet.hit_ids.push(enemy_id);
            i += 1;
        } else {
            state.player_bullets.remove(i);
        }
    }
    state.reap_dead_enemies();
}

/// max(1, damage / 2) to every other live enemy whose center is in range
fn apply_splash(enemies: &mut [Enemy], primary: EntityId, impact: Vec2, radius: f32, damage: i32) {
    let splash = (damage / 2).max(1);
    for enemy in enemies
        .iter_mut()
        .filter(|e| e.id != primary && e.is_alive())
    {
        if enemy.pos.distance(impact) <= radius {
            enemy.take_damage(splash);
        }
    }
}

/// Shared damage path for passes 2 and 3
fn damage_player(state: &mut GameState, index: usize, amount: i32) {
    let player = &mut state.players[index];
    match player.take_damage(amount, &state.tuning) {
        DamageOutcome::Absorbed => {
            let pos = player.pos;
            state.spawn_particles(Burst::HIT, pos, 0x0066ff);
            state.feedback(Sound::PlayerHit, Haptic::Hit);
        }
        DamageOutcome::Damaged => {
            state.lives = state.lives.saturating_sub(1);
            let player = &mut state.players[index];
            if state.lives > 0 {
                player.make_invulnerable(state.tuning.hit_invulnerable_ms);
            }
            let (pos, color) = (player.pos, player.slot.color());
            state.spawn_particles(Burst::EXPLOSION, pos, color);
            state.feedback(Sound::PlayerHit, Haptic::Damage);
        }
    }
}

/// Pass 2
fn enemy_bullets_vs_players(state: &mut GameState) {
    let mut struck: HashSet<EntityId> = HashSet::new();
    let mut i = 0;
    while i < state.enemy_bullets.len() {
        let bullet = &state.enemy_bullets[i];
        let target = state
            .players
            .iter()
            .position(|p| p.is_hittable() && !struck.contains(&p.id) && colliding(bullet, p));
        match target {
            Some(index) => {
                struck.insert(state.players[index].id);
                state.enemy_bullets.remove(i);
                damage_player(state, index, ENEMY_BULLET_DAMAGE);
            }
            None => i += 1,
        }
    }
}

/// Pass 3: rams destroy the enemy without scoring
fn enemies_vs_players(state: &mut GameState) {
    let mut struck: HashSet<EntityId> = HashSet::new();
    let mut i = 0;
    while i < state.enemies.len() {
        let enemy = &state.enemies[i];
        let target = state
            .players
            .iter()
            .position(|p| p.is_hittable() && !struck.contains(&p.id) && colliding(enemy, p));
        match target {
            Some(index) => {
                struck.insert(state.players[index].id);
                let enemy = state.enemies.remove(i);
                state.spawn_particles(Burst::ENEMY_EXPLOSION, enemy.pos, enemy.kind.color());
                state.events.push(GameEvent::Sound(Sound::Explosion));
                damage_player(state, index, ENEMY_RAM_DAMAGE);
            }
            None => i += 1,
        }
    }
}

/// Pass 4: first live player touching a power-up collects it
fn power_ups_vs_players(state: &mut GameState) {
    let mut i = 0;
    while i < state.power_ups.len() {
        let power_up = &state.power_ups[i];
        let collector = state
            .players
            .iter()
            .position(|p| p.is_alive() && colliding(power_up, p));
        let Some(index) = collector else {
            i += 1;
            continue;
        };

        let power_up = state.power_ups.remove(i);
        let player = &mut state.players[index];
        player.apply_power_up(power_up.kind);
        let slot = player.slot;

        state.add_score(state.tuning.power_up_points);
        state.spawn_particles(Burst::POWER_UP, power_up.pos, power_up.kind.color());
        state.feedback(Sound::PowerUp, Haptic::PowerUp);
        state.emit(GameEvent::PowerUpCollected {
            slot,
            kind: power_up.kind,
        });
    }
}
