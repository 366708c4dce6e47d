//! Game state and core session types
//!
//! The session owns every gameplay entity in flat lists. Entities refer to
//! each other only through [`EntityId`], resolved at use time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::{self, SpawnDirector};
use super::enemy::{Enemy, EnemyKind};
use super::events::{GameEvent, Haptic, Sound};
use super::particle::{Burst, Particle, Star, emit_burst};
use super::pickup::{PowerUp, PowerUpKind};
use super::player::{Player, PlayerSlot};
use super::bullet::Bullet;
use crate::consts::*;
use crate::tuning::Tuning;

/// Stable entity identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monotonic id allocator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    last: u32,
}

impl EntityIds {
    pub fn next(&mut self) -> EntityId {
        self.last += 1;
        EntityId(self.last)
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, waiting for a mode selection
    Start,
    /// Active gameplay
    Playing,
    /// Frozen; rendering continues with an overlay
    Paused,
    /// Lives exhausted
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Single,
    Coop,
}

/// A power-up drop released when the session clock reaches `due_ms`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledDrop {
    pub due_ms: f64,
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

fn detached_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "detached_rng")]
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub score: u64,
    pub level: u32,
    /// Shared across players in coop
    pub lives: u32,
    /// Session time, advanced only while playing
    pub clock_ms: f64,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub director: SpawnDirector,
    pub scheduled: Vec<ScheduledDrop>,
    /// Bomb flash intensity, 1.0 decaying to 0
    pub screen_flash: f32,
    /// Feedback queued during the current tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub ids: EntityIds,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..STAR_COUNT).map(|_| Star::random(&mut rng)).collect();
        let director = SpawnDirector::new(tuning.mode(GameMode::Single));
        Self {
            seed,
            rng,
            lives: tuning.single.starting_lives,
            tuning,
            phase: GamePhase::Start,
            mode: GameMode::Single,
            score: 0,
            level: 1,
            clock_ms: 0.0,
            players: Vec::new(),
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            stars,
            director,
            scheduled: Vec::new(),
            screen_flash: 0.0,
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    /// Discard all in-flight entities and begin a fresh session
    pub fn start_session(&mut self, mode: GameMode) {
        self.clear_entities();
        self.mode = mode;
        self.score = 0;
        self.level = 1;
        self.clock_ms = 0.0;
        self.lives = self.tuning.mode(mode).starting_lives;
        self.director = SpawnDirector::new(self.tuning.mode(mode));

        let y = PLAYFIELD_HEIGHT - PLAYER_SPAWN_OFFSET_Y;
        match mode {
            GameMode::Single => {
                let id = self.ids.next();
                let pos = Vec2::new(PLAYFIELD_WIDTH / 2.0, y);
                self.players.push(Player::new(id, PlayerSlot::One, pos));
            }
            GameMode::Coop => {
                for (slot, x) in [
                    (PlayerSlot::One, PLAYFIELD_WIDTH / 3.0),
                    (PlayerSlot::Two, PLAYFIELD_WIDTH * 2.0 / 3.0),
                ] {
                    let id = self.ids.next();
                    self.players.push(Player::new(id, slot, Vec2::new(x, y)));
                }
            }
        }

        log::info!("Session started ({mode:?}, {} lives)", self.lives);
        self.set_phase(GamePhase::Playing);
    }

    /// Back to the mode-selection menu
    pub fn return_to_menu(&mut self) {
        self.clear_entities();
        self.set_phase(GamePhase::Start);
    }

    /// Toggle between playing and paused. Other phases are unaffected.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => self.set_phase(GamePhase::Playing),
            GamePhase::Start | GamePhase::GameOver => return false,
        }
        true
    }

    /// Enter game over; the simulation halts until the next session
    pub fn end_session(&mut self) {
        log::info!("Game over: score {} at level {}", self.score, self.level);
        self.set_phase(GamePhase::GameOver);
        self.emit(GameEvent::GameOver {
            score: self.score,
            level: self.level,
        });
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(GameEvent::PhaseChanged(phase));
        }
    }

    fn clear_entities(&mut self) {
        self.players.clear();
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.scheduled.clear();
        self.screen_flash = 0.0;
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Queue a sound and a vibration together
    pub fn feedback(&mut self, sound: Sound, haptic: Haptic) {
        self.events.push(GameEvent::Sound(sound));
        self.events.push(GameEvent::Haptic(haptic));
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        self.players.iter().find(|p| p.slot == slot)
    }

    /// Resolve an entity id to a live player or enemy position
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.players
            .iter()
            .filter(|p| p.is_alive())
            .find(|p| p.id == id)
            .map(|p| p.pos)
            .or_else(|| {
                self.enemies
                    .iter()
                    .filter(|e| e.is_alive())
                    .find(|e| e.id == id)
                    .map(|e| e.pos)
            })
    }

    pub fn nearest_enemy(&self, from: Vec2) -> Option<EntityId> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(from)
                    .total_cmp(&b.pos.distance_squared(from))
            })
            .map(|e| e.id)
    }

    pub fn spawn_particles(&mut self, burst: Burst, pos: Vec2, color: u32) {
        let cap = self.tuning.max_particles;
        emit_burst(&mut self.particles, cap, burst, pos, color, &mut self.rng);
    }

    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2) {
        let id = self.ids.next();
        log::debug!("Power-up dropped: {}", kind.name());
        self.power_ups.push(PowerUp::new(id, kind, pos));
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) {
        let id = self.ids.next();
        log::debug!("Enemy spawned: {} at level {}", kind.as_str(), self.level);
        self.enemies.push(Enemy::new(id, kind, pos, self.level));
    }

    /// Score a destroyed enemy and play its explosion
    pub fn score_kill(&mut self, enemy: &Enemy) {
        self.add_score(enemy.points);
        self.spawn_particles(Burst::ENEMY_EXPLOSION, enemy.pos, enemy.kind.color());
        self.feedback(Sound::Explosion, Haptic::Explosion);
    }

    /// Roll the enemy's drop table, scheduling any delayed drop
    pub fn drop_loot(&mut self, enemy: &Enemy) {
        let drops = director::roll_drops(enemy.kind, enemy.pos, self.level, &mut self.rng);
        for (kind, pos) in drops.immediate {
            self.spawn_power_up(kind, pos);
        }
        if let Some((kind, pos)) = drops.delayed {
            self.scheduled.push(ScheduledDrop {
                due_ms: self.clock_ms + self.tuning.boss_health_drop_delay_ms,
                kind,
                pos,
            });
        }
    }

    /// Remove enemies at or below zero health, scoring each and rolling drops
    pub fn reap_dead_enemies(&mut self) {
        if self.enemies.iter().all(Enemy::is_alive) {
            return;
        }
        let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
            std::mem::take(&mut self.enemies).into_iter().partition(|e| !e.is_alive());
        self.enemies = alive;
        for enemy in &dead {
            self.score_kill(enemy);
            self.drop_loot(enemy);
        }
    }

    /// Release scheduled drops whose due time has passed
    pub fn release_scheduled(&mut self) {
        let now = self.clock_ms;
        if !self.scheduled.iter().any(|s| s.due_ms <= now) {
            return;
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.scheduled).into_iter().partition(|s| s.due_ms <= now);
        self.scheduled = pending;
        for drop in due {
            self.spawn_power_up(drop.kind, drop.pos);
        }
    }

    /// Level up once per threshold crossed
    pub fn check_level_progress(&mut self) {
        let step = self.tuning.level_score_step.max(1);
        while self.score >= self.level as u64 * step {
            self.level += 1;
            log::info!("Level up: {}", self.level);
            self.emit(GameEvent::LevelUp { level: self.level });
            self.events.push(GameEvent::Haptic(Haptic::LevelUp));
            let center = Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0);
            self.spawn_particles(Burst::LEVEL_UP, center, 0xffff00);
        }
    }

    /// Chance roll on the session RNG
    pub fn roll(&mut self, chance: f64) -> bool {
        self.rng.random_bool(chance.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_at_menu() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.stars.len(), STAR_COUNT);
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_start_single_and_coop() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].pos, Vec2::new(400.0, 520.0));

        state.start_session(GameMode::Coop);
        assert_eq!(state.lives, 5);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[1].slot, PlayerSlot::Two);
        assert_ne!(state.players[0].id, state.players[1].id);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut state = GameState::new(1);
        assert!(!state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Start);

        state.start_session(GameMode::Single);
        assert!(state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_phase_events() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.end_session();
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::GameOver)));
        assert!(events.contains(&GameEvent::GameOver { score: 0, level: 1 }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_level_up_once_per_threshold() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Coop);
        state.add_score(2500);
        state.check_level_progress();
        assert_eq!(state.level, 3);
        let level_ups = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
            .count();
        assert_eq!(level_ups, 2);
    }

    #[test]
    fn test_position_lookup_ignores_dead_entities() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 100.0));
        let id = state.enemies[0].id;
        assert_eq!(state.position_of(id), Some(Vec2::new(100.0, 100.0)));
        state.enemies[0].health = 0;
        assert_eq!(state.position_of(id), None);
        assert_eq!(state.position_of(EntityId(9999)), None);
    }

    #[test]
    fn test_reap_scores_dead_enemies() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.spawn_enemy(EnemyKind::Heavy, Vec2::new(100.0, 100.0));
        state.spawn_enemy(EnemyKind::Basic, Vec2::new(200.0, 100.0));
        state.enemies[1].health = 0;
        state.reap_dead_enemies();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].kind, EnemyKind::Heavy);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_scheduled_drop_release() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.scheduled.push(ScheduledDrop {
            due_ms: 500.0,
            kind: PowerUpKind::Health,
            pos: Vec2::new(10.0, 10.0),
        });
        state.clock_ms = 499.0;
        state.release_scheduled();
        assert!(state.power_ups.is_empty());
        state.clock_ms = 500.0;
        state.release_scheduled();
        assert_eq!(state.power_ups.len(), 1);
        assert!(state.scheduled.is_empty());
    }
}
