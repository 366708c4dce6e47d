//! Platform abstraction layer
//!
//! The game controller talks to the outside world only through these traits:
//! - `AudioSink`: fire-and-forget sound effects
//! - `HapticSink`: best-effort rumble pulses
//! - `Presenter`: HUD text, screen transitions, leaderboard, banners
//!
//! Every method is infallible from the caller's point of view. Implementations
//! swallow (and log) their own failures so a broken collaborator never stalls
//! a tick.

use crate::highscores::HighScores;
use crate::sim::{BulletKind, GameMode, GameState, PlayerSlot, Sound};

/// Sound output
pub trait AudioSink {
    fn play(&mut self, sound: Sound);

    /// Effective output volume (0.0 - 1.0)
    fn set_volume(&mut self, _volume: f32) {}

    /// Unlock the backend after a user gesture
    fn resume(&mut self) {}
}

/// One rumble pulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub duration_ms: u32,
    pub weak: f32,
    pub strong: f32,
}

/// Controller / device vibration
pub trait HapticSink {
    fn rumble(&mut self, pulse: Pulse);
}

/// Top-level screens the presenter can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    Paused,
    GameOver,
    Leaderboard,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Start => "start",
            Screen::Playing => "playing",
            Screen::Paused => "paused",
            Screen::GameOver => "gameOver",
            Screen::Leaderboard => "leaderboard",
        }
    }
}

/// Per-player HUD line
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHud {
    pub slot: PlayerSlot,
    pub health: i32,
    pub max_health: i32,
    pub bombs: u32,
    pub bullet: BulletKind,
    pub bullet_level: u8,
}

/// Everything the HUD displays
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub mode: GameMode,
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub players: Vec<PlayerHud>,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            mode: state.mode,
            score: state.score,
            level: state.level,
            lives: state.lives,
            players: state
                .players
                .iter()
                .map(|p| PlayerHud {
                    slot: p.slot,
                    health: p.health.max(0),
                    max_health: p.max_health,
                    bombs: p.bombs,
                    bullet: p.arsenal.selected,
                    bullet_level: p.arsenal.selected_level(),
                })
                .collect(),
        }
    }
}

/// Final results shown on the game over screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverSummary {
    pub score: u64,
    pub level: u32,
    pub new_record: bool,
    /// Leaderboard rank (1-indexed) if the run made the board
    pub rank: Option<usize>,
}

/// UI surface
pub trait Presenter {
    fn show_screen(&mut self, screen: Screen);
    fn update_hud(&mut self, hud: &HudSnapshot);
    fn show_game_over(&mut self, summary: &GameOverSummary);
    fn show_leaderboard(&mut self, scores: &HighScores);
    /// Transient banner naming a collected power-up
    fn show_power_up(&mut self, slot: PlayerSlot, name: &str);
    fn hide_power_up(&mut self) {}
}

/// Discards everything (headless runs and tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

impl AudioSink for NullPlatform {
    fn play(&mut self, _sound: Sound) {}
}

impl HapticSink for NullPlatform {
    fn rumble(&mut self, _pulse: Pulse) {}
}

impl Presenter for NullPlatform {
    fn show_screen(&mut self, _screen: Screen) {}
    fn update_hud(&mut self, _hud: &HudSnapshot) {}
    fn show_game_over(&mut self, _summary: &GameOverSummary) {}
    fn show_leaderboard(&mut self, _scores: &HighScores) {}
    fn show_power_up(&mut self, _slot: PlayerSlot, _name: &str) {}
}

/// Local date and time strings for a leaderboard entry
#[cfg(target_arch = "wasm32")]
pub fn timestamp() -> (String, String) {
    let now = js_sys::Date::new_0();
    let date = now.to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED);
    let time = now.to_locale_time_string("default");
    (String::from(date), String::from(time))
}

/// Local date and time strings for a leaderboard entry
#[cfg(not(target_arch = "wasm32"))]
pub fn timestamp() -> (String, String) {
    ("N/A".to_string(), "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_reflects_session() {
        let mut state = GameState::new(3);
        state.start_session(GameMode::Coop);
        state.score = 1234;
        state.players[1].health = -1;

        let hud = HudSnapshot::from_state(&state);
        assert_eq!(hud.score, 1234);
        assert_eq!(hud.lives, 5);
        assert_eq!(hud.players.len(), 2);
        assert_eq!(hud.players[0].bullet, BulletKind::Basic);
        assert_eq!(hud.players[0].bullet_level, 1);
        assert_eq!(hud.players[1].health, 0);
    }

    #[test]
    fn test_screen_names() {
        assert_eq!(Screen::GameOver.as_str(), "gameOver");
        assert_eq!(Screen::Leaderboard.as_str(), "leaderboard");
    }
}
