//! Per-frame simulation step
//!
//! The host owns the loop and calls [`tick`] once per frame with the elapsed
//! time. Order within a tick is fixed: background, players, spawning, enemies,
//! delayed drops, bullets, power-ups, particles, collisions, level and loss
//! checks.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::enemy::FireContext;
use super::events::{Haptic, Sound};
use super::player::{PlayerIntent, PlayerSlot};
use super::state::{EntityId, GamePhase, GameState};
use super::bullet::Bullet;
use super::pickup::PowerUpKind;
use crate::consts::BOSS_BOMB_DIVISOR;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Intents indexed by `PlayerSlot::index`
    pub players: [PlayerIntent; 2],
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn intent(&self, slot: PlayerSlot) -> &PlayerIntent {
        &self.players[slot.index()]
    }
}

/// Advance the session by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Paused, menu and game over never update entities
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt_ms = dt_ms.max(0.0);
    state.clock_ms += dt_ms as f64;

    if state.screen_flash > 0.0 {
        let fade = dt_ms / state.tuning.bomb_flash_ms.max(1.0);
        state.screen_flash = (state.screen_flash - fade).max(0.0);
    }

    for star in &mut state.stars {
        star.update(dt_ms, &mut state.rng);
    }

    update_players(state, input, dt_ms);

    let spawns = state
        .director
        .update(dt_ms, state.level, state.mode, &state.tuning, &mut state.rng);
    for spawn in spawns {
        state.spawn_enemy(spawn.kind, spawn.pos);
    }

    update_enemies(state, dt_ms);
    state.release_scheduled();
    update_bullets(state, dt_ms);

    for power_up in &mut state.power_ups {
        power_up.update(dt_ms);
    }
    state.power_ups.retain(|p| !p.exited());

    for particle in &mut state.particles {
        particle.update(dt_ms);
    }
    state.particles.retain(|p| !p.is_dead());

    resolve_collisions(state);
    state.check_level_progress();

    if state.lives == 0 {
        state.end_session();
    }
}

fn update_players(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    for index in 0..state.players.len() {
        let slot = state.players[index].slot;
        let intent = *input.intent(slot);
        state.players[index].update(dt_ms, &intent, &state.tuning);

        if intent.fire && state.players[index].can_fire() {
            let target = state.nearest_enemy(state.players[index].pos);
            let shots = state.players[index].fire(&mut state.ids, target);
            state.player_bullets.extend(shots);
            state.feedback(Sound::Shoot, Haptic::Shoot);
        }

        if intent.bomb {
            activate_bomb(state, slot);
        }
    }
}

fn update_enemies(state: &mut GameState, dt_ms: f32) {
    let targets: Vec<(EntityId, Vec2)> = state
        .players
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| (p.id, p.pos))
        .collect();
    let ctx = FireContext {
        clock_ms: state.clock_ms,
        targets: &targets,
    };

    let mut shots = Vec::new();
    for enemy in &mut state.enemies {
        enemy.update(dt_ms, &ctx, &mut state.ids, &mut state.rng, &mut shots);
    }
    state.enemy_bullets.extend(shots);

    // Leaving the bottom edge scores nothing
    state.enemies.retain(|e| !e.exited());
}

fn homing_targets(state: &GameState, bullets: &[Bullet]) -> Vec<Option<Vec2>> {
    bullets
        .iter()
        .map(|b| b.target.and_then(|id| state.position_of(id)))
        .collect()
}

fn update_bullets(state: &mut GameState, dt_ms: f32) {
    let targets = homing_targets(state, &state.player_bullets);
    for (bullet, target) in state.player_bullets.iter_mut().zip(targets) {
        bullet.update(dt_ms, target, &mut state.rng);
    }
    state.player_bullets.retain(|b| !b.is_spent());

    let targets = homing_targets(state, &state.enemy_bullets);
    for (bullet, target) in state.enemy_bullets.iter_mut().zip(targets) {
        bullet.update(dt_ms, target, &mut state.rng);
    }
    state.enemy_bullets.retain(|b| !b.is_spent());
}

/// Detonate a bomb for `slot`. Returns false when the player has no charge
/// or is still on cooldown.
pub fn activate_bomb(state: &mut GameState, slot: PlayerSlot) -> bool {
    let Some(index) = state.players.iter().position(|p| p.slot == slot) else {
        return false;
    };
    if !state.players[index].try_bomb(&state.tuning) {
        return false;
    }

    let (bosses, destroyed): (Vec<_>, Vec<_>) =
        std::mem::take(&mut state.enemies).into_iter().partition(|e| e.is_boss());
    state.enemies = bosses;
    for boss in &mut state.enemies {
        let damage = (boss.max_health + BOSS_BOMB_DIVISOR - 1) / BOSS_BOMB_DIVISOR;
        boss.take_damage(damage.max(1));
    }

    let drop_chance = state.tuning.bomb_drop_chance;
    for enemy in &destroyed {
        state.score_kill(enemy);
        if state.roll(drop_chance) {
            state.spawn_power_up(PowerUpKind::Bomb, enemy.pos);
        }
    }
    // Bosses the blast finished off
    state.reap_dead_enemies();

    state.enemy_bullets.clear();
    state.screen_flash = 1.0;
    state.feedback(Sound::Bomb, Haptic::Bomb);
    log::info!(
        "Player {} bomb: {} destroyed, {} left",
        slot.number(),
        destroyed.len(),
        state.players[index].bombs
    );
    true
}
