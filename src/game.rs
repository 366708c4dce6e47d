//! Game controller
//!
//! Owns the session and everything around it: settings, the leaderboard,
//! storage and the audio/haptic/presentation collaborators. The host calls
//! [`Game::update`] once per frame with the elapsed time and a raw input
//! snapshot, then [`Game::render`] for the draw list. Simulation events are
//! drained after every tick and routed to the collaborators here, so the
//! simulation itself never performs I/O.

use crate::haptics::HapticScheduler;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::input::{InputMapper, InputSnapshot, MenuCommand};
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::platform::{
    self, AudioSink, GameOverSummary, HapticSink, HudSnapshot, NullPlatform, Presenter, Screen,
};
use crate::renderer::{self, DebugInfo, Frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameMode, GamePhase, GameState, Haptic, tick};
use crate::tuning::Tuning;

/// Longest frame the simulation will step in one go
pub const MAX_FRAME_MS: f32 = 100.0;
/// How long the power-up banner stays up
pub const POWER_UP_BANNER_MS: f32 = 3000.0;
/// Dead zone nudge per settings key press
pub const DEAD_ZONE_STEP: f32 = 0.01;

const FPS_WINDOW: usize = 60;

/// Rolling frames-per-second over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0.0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest sample is the one about to be overwritten
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / elapsed) as f32;
            }
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// External services the controller talks to
pub struct Collaborators {
    pub store: Box<dyn KeyValueStore>,
    pub audio: Box<dyn AudioSink>,
    pub haptics: Box<dyn HapticSink>,
    pub presenter: Box<dyn Presenter>,
}

impl Collaborators {
    /// In-memory storage and silent sinks
    pub fn headless() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            audio: Box::new(NullPlatform),
            haptics: Box::new(NullPlatform),
            presenter: Box::new(NullPlatform),
        }
    }
}

/// Session controller
pub struct Game {
    pub state: GameState,
    pub settings: Settings,
    pub high_scores: HighScores,
    io: Collaborators,
    mapper: InputMapper,
    rumble: HapticScheduler,
    /// Mode used by confirm/restart
    mode: GameMode,
    /// Host time, advancing while paused (drives haptics and the banner)
    clock_ms: f64,
    banner_ms: f32,
    fps: FpsCounter,
    pad_connected: bool,
    last_hud: Option<HudSnapshot>,
    last_result: Option<GameOverSummary>,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning, io: Collaborators) -> Self {
        let settings = Settings::load(io.store.as_ref());
        let high_scores = HighScores::load(io.store.as_ref());
        let mut game = Self {
            state: GameState::with_tuning(seed, tuning),
            settings,
            high_scores,
            io,
            mapper: InputMapper::new(),
            rumble: HapticScheduler::new(),
            mode: GameMode::Single,
            clock_ms: 0.0,
            banner_ms: 0.0,
            fps: FpsCounter::default(),
            pad_connected: false,
            last_hud: None,
            last_result: None,
        };
        game.apply_settings();
        game.io.presenter.show_screen(Screen::Start);
        game
    }

    /// Default tuning, no storage, no output
    pub fn headless(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), Collaborators::headless())
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Result of the most recent finished session
    pub fn last_result(&self) -> Option<&GameOverSummary> {
        self.last_result.as_ref()
    }

    // === Session control ===

    pub fn start(&mut self, mode: GameMode) {
        self.io.audio.resume();
        self.mode = mode;
        self.last_result = None;
        self.rumble.clear();
        self.state.start_session(mode);
        self.dispatch_events();
    }

    /// Start again in the last chosen mode
    pub fn restart(&mut self) {
        self.start(self.mode);
    }

    pub fn main_menu(&mut self) {
        let at_menu = self.state.phase == GamePhase::Start;
        self.rumble.clear();
        self.state.return_to_menu();
        self.dispatch_events();
        // No phase change (leaving the leaderboard), so no event re-showed it
        if at_menu {
            self.io.presenter.show_screen(Screen::Start);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
        self.dispatch_events();
    }

    /// Tab hidden or window blurred
    pub fn on_focus_lost(&mut self) {
        self.mapper.reset();
        if self.state.phase == GamePhase::Playing {
            log::info!("Auto-pausing on focus loss");
            self.toggle_pause();
        }
    }

    pub fn show_leaderboard(&mut self) {
        self.io.presenter.show_leaderboard(&self.high_scores);
        self.io.presenter.show_screen(Screen::Leaderboard);
    }

    // === Settings ===

    /// Replace settings, apply them and persist
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.apply_settings();
        self.save_settings();
    }

    pub fn toggle_vibration(&mut self) -> bool {
        let enabled = self.settings.toggle_vibration();
        if !enabled {
            self.rumble.clear();
        }
        self.save_settings();
        enabled
    }

    pub fn adjust_dead_zone(&mut self, delta: f32) -> f32 {
        let dead_zone = self.settings.adjust_dead_zone(delta);
        self.save_settings();
        dead_zone
    }

    pub fn reset_controller(&mut self) {
        self.settings.reset_controller();
        self.save_settings();
    }

    /// Play the level-up sequence so the player can feel it
    pub fn test_vibration(&mut self) {
        self.trigger_haptic(Haptic::LevelUp);
    }

    fn apply_settings(&mut self) {
        self.io.audio.set_volume(self.settings.effective_volume());
        self.state.tuning.max_particles = self.settings.max_particles();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(self.io.store.as_ref()) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    // === Frame ===

    /// Advance one frame
    pub fn update(&mut self, dt_ms: f32, input: &InputSnapshot) {
        let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
        self.clock_ms += dt_ms as f64;
        self.fps.record(self.clock_ms);
        self.pad_connected = input.any_pad_connected();

        let frame = self
            .mapper
            .map(input, self.mode, self.state.phase, self.settings.dead_zone);
        for command in &frame.commands {
            self.handle_command(*command);
        }

        tick(&mut self.state, &frame.tick, dt_ms);
        self.dispatch_events();

        for pulse in self.rumble.poll(self.clock_ms) {
            self.io.haptics.rumble(pulse);
        }

        if self.banner_ms > 0.0 {
            self.banner_ms -= dt_ms;
            if self.banner_ms <= 0.0 {
                self.io.presenter.hide_power_up();
            }
        }

        if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            self.refresh_hud();
        }
    }

    pub fn render(&self) -> Frame {
        let debug = DebugInfo {
            fps: self.fps.fps(),
            pad_connected: self.pad_connected,
        };
        renderer::build_frame(&self.state, &self.settings, Some(&debug))
    }

    fn handle_command(&mut self, command: MenuCommand) {
        match command {
            MenuCommand::Confirm => self.restart(),
            MenuCommand::Back => self.main_menu(),
            MenuCommand::ToggleVibration => {
                self.toggle_vibration();
            }
            MenuCommand::DeadZoneDown => {
                self.adjust_dead_zone(-DEAD_ZONE_STEP);
            }
            MenuCommand::DeadZoneUp => {
                self.adjust_dead_zone(DEAD_ZONE_STEP);
            }
            MenuCommand::ResetController => self.reset_controller(),
            MenuCommand::TestVibration => self.test_vibration(),
        }
    }

    fn refresh_hud(&mut self) {
        let hud = HudSnapshot::from_state(&self.state);
        if self.last_hud.as_ref() != Some(&hud) {
            self.io.presenter.update_hud(&hud);
            self.last_hud = Some(hud);
        }
    }

    fn trigger_haptic(&mut self, haptic: Haptic) {
        if self.settings.vibration {
            self.rumble.trigger(haptic, self.clock_ms);
        }
    }

    /// Route queued simulation events to the collaborators
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(sound) => self.io.audio.play(sound),
                GameEvent::Haptic(haptic) => self.trigger_haptic(haptic),
                GameEvent::PhaseChanged(phase) => {
                    let screen = match phase {
                        GamePhase::Start => Screen::Start,
                        GamePhase::Playing => Screen::Playing,
                        GamePhase::Paused => Screen::Paused,
                        // Shown with the final results
                        GamePhase::GameOver => continue,
                    };
                    if phase == GamePhase::Playing {
                        self.last_hud = None;
                    }
                    self.io.presenter.show_screen(screen);
                }
                GameEvent::LevelUp { level } => log::debug!("Reached level {}", level),
                GameEvent::PowerUpCollected { slot, kind } => {
                    self.io.presenter.show_power_up(slot, kind.display_name());
                    self.banner_ms = POWER_UP_BANNER_MS;
                }
                GameEvent::GameOver { score, level } => self.finish_session(score, level),
            }
        }
    }

    fn finish_session(&mut self, score: u64, level: u32) {
        self.refresh_hud();

        let new_record = self.high_scores.is_new_record(score);
        let (date, time) = platform::timestamp();
        let rank = self.high_scores.record(HighScoreEntry {
            score,
            level,
            date,
            time,
        });
        if rank.is_some()
            && let Err(e) = self.high_scores.save(self.io.store.as_ref())
        {
            log::warn!("Failed to save high scores: {}", e);
        }

        let summary = GameOverSummary {
            score,
            level,
            new_record,
            rank,
        };
        self.io.presenter.show_game_over(&summary);
        self.io.presenter.show_screen(Screen::GameOver);
        self.last_result = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use crate::platform::Pulse;
    use crate::sim::{EnemyKind, PlayerSlot, PowerUpKind, Sound};

    /// Records everything sent to it
    #[derive(Default)]
    struct Log {
        sounds: Vec<Sound>,
        pulses: Vec<Pulse>,
        screens: Vec<Screen>,
        banners: Vec<String>,
        huds: usize,
        results: Vec<GameOverSummary>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Log>>);

    impl AudioSink for Recorder {
        fn play(&mut self, sound: Sound) {
            self.0.borrow_mut().sounds.push(sound);
        }
    }

    impl HapticSink for Recorder {
        fn rumble(&mut self, pulse: Pulse) {
            self.0.borrow_mut().pulses.push(pulse);
        }
    }

    impl Presenter for Recorder {
        fn show_screen(&mut self, screen: Screen) {
            self.0.borrow_mut().screens.push(screen);
        }
        fn update_hud(&mut self, _hud: &HudSnapshot) {
            self.0.borrow_mut().huds += 1;
        }
        fn show_game_over(&mut self, summary: &GameOverSummary) {
            self.0.borrow_mut().results.push(summary.clone());
        }
        fn show_leaderboard(&mut self, _scores: &HighScores) {}
        fn show_power_up(&mut self, _slot: PlayerSlot, name: &str) {
            self.0.borrow_mut().banners.push(name.to_string());
        }
    }

    fn recorded_game() -> (Game, Recorder) {
        let recorder = Recorder::default();
        let io = Collaborators {
            store: Box::new(MemoryStore::new()),
            audio: Box::new(recorder.clone()),
            haptics: Box::new(recorder.clone()),
            presenter: Box::new(recorder.clone()),
        };
        (Game::new(7, Tuning::default(), io), recorder)
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn lose_all_lives(game: &mut Game) {
        game.state.lives = 1;
        game.state.players[0].invulnerable = false;
        game.state.spawn_enemy(EnemyKind::Basic, game.state.players[0].pos);
        game.update(16.0, &idle());
    }

    #[test]
    fn test_starts_at_menu() {
        let (game, recorder) = recorded_game();
        assert_eq!(game.phase(), GamePhase::Start);
        assert_eq!(recorder.0.borrow().screens, vec![Screen::Start]);
    }

    #[test]
    fn test_confirm_starts_session() {
        let (mut game, recorder) = recorded_game();
        let mut input = idle();
        input.press_key("Enter");
        game.update(16.0, &input);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(recorder.0.borrow().screens.contains(&Screen::Playing));
        assert!(recorder.0.borrow().huds >= 1);
    }

    #[test]
    fn test_fire_plays_sound_and_rumbles() {
        let (mut game, recorder) = recorded_game();
        game.start(GameMode::Single);
        let mut input = idle();
        input.press_key("Space");
        game.update(16.0, &input);

        let log = recorder.0.borrow();
        assert!(log.sounds.contains(&Sound::Shoot));
        assert!(log.pulses.iter().any(|p| p.duration_ms == 50));
    }

    #[test]
    fn test_vibration_setting_silences_haptics() {
        let (mut game, recorder) = recorded_game();
        game.toggle_vibration();
        game.start(GameMode::Single);
        let mut input = idle();
        input.press_key("Space");
        game.update(16.0, &input);
        assert!(recorder.0.borrow().pulses.is_empty());
    }

    #[test]
    fn test_game_over_records_score() {
        let (mut game, recorder) = recorded_game();
        game.start(GameMode::Single);
        game.state.score = 4200;
        lose_all_lives(&mut game);

        assert_eq!(game.phase(), GamePhase::GameOver);
        let result = game.last_result().cloned().expect("result");
        assert_eq!(result.score, 4200);
        assert!(result.new_record);
        assert_eq!(result.rank, Some(1));
        assert_eq!(game.high_scores.top_score(), Some(4200));
        assert_eq!(recorder.0.borrow().screens.last(), Some(&Screen::GameOver));

        // Persisted and reloadable
        let reloaded = HighScores::load(game.io.store.as_ref());
        assert_eq!(reloaded.top_score(), Some(4200));
    }

    #[test]
    fn test_second_lower_score_is_not_a_record() {
        let mut game = Game::headless(3);
        game.start(GameMode::Single);
        game.state.score = 900;
        lose_all_lives(&mut game);

        game.restart();
        game.state.score = 100;
        lose_all_lives(&mut game);
        let result = game.last_result().expect("result");
        assert!(!result.new_record);
        assert_eq!(result.rank, Some(2));
    }

    #[test]
    fn test_back_from_game_over_returns_to_menu() {
        let mut game = Game::headless(3);
        game.start(GameMode::Coop);
        lose_all_lives(&mut game);
        assert_eq!(game.phase(), GamePhase::GameOver);

        let mut input = idle();
        input.press_key("Escape");
        game.update(16.0, &input);
        assert_eq!(game.phase(), GamePhase::Start);
        assert_eq!(game.mode(), GameMode::Coop);
    }

    #[test]
    fn test_focus_loss_pauses() {
        let mut game = Game::headless(3);
        game.start(GameMode::Single);
        game.on_focus_lost();
        assert_eq!(game.phase(), GamePhase::Paused);
        // Already paused: stays paused
        game.on_focus_lost();
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_power_up_banner_shows_and_expires() {
        let (mut game, recorder) = recorded_game();
        game.start(GameMode::Single);
        let pos = game.state.players[0].pos;
        game.state.spawn_power_up(PowerUpKind::Shield, pos);
        game.update(16.0, &idle());
        assert_eq!(recorder.0.borrow().banners, vec!["Shield".to_string()]);

        for _ in 0..200 {
            game.update(16.0, &idle());
        }
        assert!(game.banner_ms <= 0.0);
    }

    #[test]
    fn test_level_up_rumble_is_staggered() {
        let (mut game, recorder) = recorded_game();
        game.test_vibration();
        game.update(0.0, &idle());
        assert_eq!(recorder.0.borrow().pulses.len(), 1);
        game.update(150.0 - MAX_FRAME_MS, &idle());
        game.update(MAX_FRAME_MS, &idle());
        assert_eq!(recorder.0.borrow().pulses.len(), 2);
    }

    #[test]
    fn test_settings_keys_adjust_and_persist() {
        let mut game = Game::headless(3);
        let mut input = idle();
        input.press_key("Digit3");
        game.update(16.0, &input);
        assert!((game.settings.dead_zone - 0.11).abs() < 1e-6);

        let saved = Settings::load(game.io.store.as_ref());
        assert_eq!(saved.dead_zone, game.settings.dead_zone);
    }

    #[test]
    fn test_particles_setting_caps_simulation() {
        let mut game = Game::headless(3);
        let mut settings = game.settings.clone();
        settings.particles = false;
        game.set_settings(settings);
        assert_eq!(game.state.tuning.max_particles, 0);
    }

    #[test]
    fn test_render_includes_player() {
        let mut game = Game::headless(3);
        game.start(GameMode::Single);
        let frame = game.render();
        assert!(frame.len() > game.state.stars.len());
        assert!(game.state.players[0].pos.distance(Vec2::new(400.0, 520.0)) < 1.0);
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        for i in 1..=120 {
            fps.record(i as f64 * 16.0);
        }
        assert!((fps.fps() - 62.5).abs() < 0.1);
    }
}
