//! Input normalization
//!
//! The host fills an [`InputSnapshot`] each frame from keyboard, pointer and
//! gamepad state. [`InputMapper`] turns it into per-player intents for the
//! simulation plus menu commands, tracking the previous frame so one-shot
//! actions (bomb, weapon cycling, pause, confirm) fire on the press edge only.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::{GameMode, GamePhase, PlayerIntent, PlayerSlot, TickInput};

/// Standard gamepad layout button count
pub const BUTTON_COUNT: usize = 17;

/// Standard gamepad button indices
pub mod button {
    pub const CONFIRM: usize = 0;
    pub const BACK: usize = 1;
    pub const FIRE: usize = 2;
    pub const BOMB: usize = 3;
    pub const PREV_BULLET: usize = 4;
    pub const NEXT_BULLET: usize = 5;
    pub const FIRE_LEFT_TRIGGER: usize = 6;
    pub const FIRE_RIGHT_TRIGGER: usize = 7;
    pub const SELECT: usize = 8;
    pub const START: usize = 9;
    pub const DPAD_UP: usize = 12;
    pub const DPAD_DOWN: usize = 13;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
}

/// Analog threshold above which a trigger/button value counts as pressed
pub const BUTTON_THRESHOLD: f32 = 0.5;

/// Zero an axis whose magnitude doesn't exceed the dead zone
#[inline]
pub fn apply_dead_zone(value: f32, dead_zone: f32) -> f32 {
    if value.abs() > dead_zone { value } else { 0.0 }
}

/// One controller's state for a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadState {
    pub connected: bool,
    /// Left stick x/y, right stick x/y
    pub axes: [f32; 4],
    pub buttons: [bool; BUTTON_COUNT],
}

impl Default for PadState {
    fn default() -> Self {
        Self {
            connected: false,
            axes: [0.0; 4],
            buttons: [false; BUTTON_COUNT],
        }
    }
}

impl PadState {
    pub fn pressed(&self, index: usize) -> bool {
        self.connected && self.buttons.get(index).copied().unwrap_or(false)
    }

    fn any_pressed(&self, indices: &[usize]) -> bool {
        indices.iter().any(|&i| self.pressed(i))
    }

    fn stick(&self, first_axis: usize, dead_zone: f32) -> Vec2 {
        if !self.connected {
            return Vec2::ZERO;
        }
        Vec2::new(
            apply_dead_zone(self.axes[first_axis], dead_zone),
            apply_dead_zone(self.axes[first_axis + 1], dead_zone),
        )
    }

    pub fn left_stick(&self, dead_zone: f32) -> Vec2 {
        self.stick(0, dead_zone)
    }

    pub fn right_stick(&self, dead_zone: f32) -> Vec2 {
        self.stick(2, dead_zone)
    }

    pub fn dpad(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.pressed(button::DPAD_UP) {
            dir.y -= 1.0;
        }
        if self.pressed(button::DPAD_DOWN) {
            dir.y += 1.0;
        }
        if self.pressed(button::DPAD_LEFT) {
            dir.x -= 1.0;
        }
        if self.pressed(button::DPAD_RIGHT) {
            dir.x += 1.0;
        }
        dir
    }
}

const PAD_FIRE: [usize; 3] = [
    button::FIRE,
    button::FIRE_LEFT_TRIGGER,
    button::FIRE_RIGHT_TRIGGER,
];

/// Raw input state for one frame. Keys are `KeyboardEvent.code` values.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub keys: HashSet<String>,
    /// Last pointer position in playfield coordinates; `None` until it moves
    pub pointer: Option<Vec2>,
    pub pointer_pressed: bool,
    /// Up to two controllers
    pub pads: [PadState; 2],
}

impl InputSnapshot {
    pub fn key(&self, code: &str) -> bool {
        self.keys.contains(code)
    }

    pub fn press_key(&mut self, code: &str) {
        self.keys.insert(code.to_string());
    }

    pub fn release_key(&mut self, code: &str) {
        self.keys.remove(code);
    }

    pub fn any_pad_connected(&self) -> bool {
        self.pads.iter().any(|p| p.connected)
    }
}

/// Non-gameplay commands produced alongside the tick input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Start or restart a session
    Confirm,
    /// Leave the game over screen for the main menu
    Back,
    ToggleVibration,
    DeadZoneDown,
    DeadZoneUp,
    ResetController,
    TestVibration,
}

/// Mapped input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub tick: TickInput,
    pub commands: Vec<MenuCommand>,
}

/// Edge-detecting mapper from raw snapshots to intents
#[derive(Debug, Default)]
pub struct InputMapper {
    prev_keys: HashSet<String>,
    prev_buttons: [[bool; BUTTON_COUNT]; 2],
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget held state (focus loss leaves keys "stuck" otherwise)
    pub fn reset(&mut self) {
        self.prev_keys.clear();
        self.prev_buttons = [[false; BUTTON_COUNT]; 2];
    }

    pub fn map(
        &mut self,
        snapshot: &InputSnapshot,
        mode: GameMode,
        phase: GamePhase,
        dead_zone: f32,
    ) -> FrameInput {
        let mut frame = FrameInput::default();
        let in_session = matches!(phase, GamePhase::Playing | GamePhase::Paused);
        let in_menu = matches!(phase, GamePhase::Start | GamePhase::GameOver);

        frame.tick.players[PlayerSlot::One.index()] =
            self.player_one(snapshot, mode, dead_zone);
        if mode == GameMode::Coop {
            frame.tick.players[PlayerSlot::Two.index()] = self.player_two(snapshot, dead_zone);
        }

        // Pause / back
        let pause = self.key_edge(snapshot, "Escape")
            || self.key_edge(snapshot, "KeyP")
            || self.any_button_edge(snapshot, button::START);
        let back = self.any_button_edge(snapshot, button::BACK)
            || self.any_button_edge(snapshot, button::SELECT);
        if in_session && (pause || back) {
            frame.tick.pause = true;
        } else if phase == GamePhase::GameOver && (pause || back) {
            frame.commands.push(MenuCommand::Back);
        }

        if in_menu {
            // After a coop session Enter is still player two's trigger
            let enter_confirms = !(phase == GamePhase::GameOver && mode == GameMode::Coop);
            let enter = enter_confirms && self.key_edge(snapshot, "Enter");
            if enter || self.any_button_edge(snapshot, button::CONFIRM) {
                frame.commands.push(MenuCommand::Confirm);
            }
            for (code, command) in [
                ("Digit1", MenuCommand::ToggleVibration),
                ("Digit2", MenuCommand::DeadZoneDown),
                ("Digit3", MenuCommand::DeadZoneUp),
                ("Digit4", MenuCommand::ResetController),
                ("Digit5", MenuCommand::TestVibration),
            ] {
                if self.key_edge(snapshot, code) {
                    frame.commands.push(command);
                }
            }
        }

        self.prev_keys.clone_from(&snapshot.keys);
        for (prev, pad) in self.prev_buttons.iter_mut().zip(&snapshot.pads) {
            *prev = if pad.connected {
                pad.buttons
            } else {
                [false; BUTTON_COUNT]
            };
        }
        frame
    }

    fn player_one(&self, snapshot: &InputSnapshot, mode: GameMode, dead_zone: f32) -> PlayerIntent {
        let pad = &snapshot.pads[0];

        let mut dir = key_axes(snapshot, "KeyA", "KeyD", "KeyW", "KeyS");
        if mode == GameMode::Single {
            dir += key_axes(snapshot, "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown");
        }
        // The stick overrides the keyboard when deflected
        let stick = pad.left_stick(dead_zone);
        if stick != Vec2::ZERO {
            dir = stick;
        }
        dir += pad.dpad();

        PlayerIntent {
            move_dir: limit(dir),
            steer_toward: if dir == Vec2::ZERO { snapshot.pointer } else { None },
            fire: snapshot.key("Space") || snapshot.pointer_pressed || pad.any_pressed(&PAD_FIRE),
            bomb: self.key_edge(snapshot, "KeyB") || self.button_edge(snapshot, 0, button::BOMB),
            cycle: cycle_dir(
                self.key_edge(snapshot, "KeyQ") || self.button_edge(snapshot, 0, button::PREV_BULLET),
                self.key_edge(snapshot, "KeyE") || self.button_edge(snapshot, 0, button::NEXT_BULLET),
            ),
        }
    }

    fn player_two(&self, snapshot: &InputSnapshot, dead_zone: f32) -> PlayerIntent {
        let pad = &snapshot.pads[1];

        let mut dir = key_axes(snapshot, "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown");
        // Without a second controller, player two borrows the first pad's right stick
        let stick = if pad.connected {
            pad.left_stick(dead_zone)
        } else {
            snapshot.pads[0].right_stick(dead_zone)
        };
        if stick != Vec2::ZERO {
            dir = stick;
        }
        dir += pad.dpad();

        PlayerIntent {
            move_dir: limit(dir),
            steer_toward: None,
            fire: snapshot.key("Enter") || pad.any_pressed(&PAD_FIRE),
            bomb: self.key_edge(snapshot, "ShiftRight") || self.button_edge(snapshot, 1, button::BOMB),
            cycle: cycle_dir(
                self.key_edge(snapshot, "Comma") || self.button_edge(snapshot, 1, button::PREV_BULLET),
                self.key_edge(snapshot, "Period") || self.button_edge(snapshot, 1, button::NEXT_BULLET),
            ),
        }
    }

    fn key_edge(&self, snapshot: &InputSnapshot, code: &str) -> bool {
        snapshot.key(code) && !self.prev_keys.contains(code)
    }

    fn button_edge(&self, snapshot: &InputSnapshot, pad: usize, index: usize) -> bool {
        snapshot.pads[pad].pressed(index) && !self.prev_buttons[pad][index]
    }

    fn any_button_edge(&self, snapshot: &InputSnapshot, index: usize) -> bool {
        (0..snapshot.pads.len()).any(|pad| self.button_edge(snapshot, pad, index))
    }
}

fn key_axes(snapshot: &InputSnapshot, left: &str, right: &str, up: &str, down: &str) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if snapshot.key(left) {
        dir.x -= 1.0;
    }
    if snapshot.key(right) {
        dir.x += 1.0;
    }
    if snapshot.key(up) {
        dir.y -= 1.0;
    }
    if snapshot.key(down) {
        dir.y += 1.0;
    }
    dir
}

/// Diagonals move at full speed, not faster
fn limit(dir: Vec2) -> Vec2 {
    if dir.length_squared() > 1.0 {
        dir.normalize_or_zero()
    } else {
        dir
    }
}

fn cycle_dir(prev: bool, next: bool) -> i32 {
    match (prev, next) {
        (true, false) => -1,
        (false, true) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(codes: &[&str]) -> InputSnapshot {
        let mut snapshot = InputSnapshot::default();
        for code in codes {
            snapshot.press_key(code);
        }
        snapshot
    }

    fn map(mapper: &mut InputMapper, snapshot: &InputSnapshot, mode: GameMode) -> FrameInput {
        mapper.map(snapshot, mode, GamePhase::Playing, 0.1)
    }

    #[test]
    fn test_dead_zone() {
        assert_eq!(apply_dead_zone(0.05, 0.1), 0.0);
        assert_eq!(apply_dead_zone(0.1, 0.1), 0.0);
        assert_eq!(apply_dead_zone(-0.5, 0.1), -0.5);
    }

    #[test]
    fn test_arrows_move_player_one_only_in_single() {
        let mut mapper = InputMapper::new();
        let snapshot = keys(&["ArrowLeft"]);

        let single = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(single.tick.players[0].move_dir, Vec2::new(-1.0, 0.0));

        let coop = map(&mut mapper, &snapshot, GameMode::Coop);
        assert_eq!(coop.tick.players[0].move_dir, Vec2::ZERO);
        assert_eq!(coop.tick.players[1].move_dir, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut mapper = InputMapper::new();
        let frame = map(&mut mapper, &keys(&["KeyW", "KeyD"]), GameMode::Single);
        assert!((frame.tick.players[0].move_dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bomb_fires_on_press_edge_only() {
        let mut mapper = InputMapper::new();
        let held = keys(&["KeyB", "Space"]);
        let first = map(&mut mapper, &held, GameMode::Single);
        let second = map(&mut mapper, &held, GameMode::Single);
        assert!(first.tick.players[0].bomb);
        assert!(!second.tick.players[0].bomb);
        // Fire is continuous
        assert!(first.tick.players[0].fire && second.tick.players[0].fire);
    }

    #[test]
    fn test_pointer_steers_only_without_keys() {
        let mut mapper = InputMapper::new();
        let mut snapshot = InputSnapshot {
            pointer: Some(Vec2::new(100.0, 200.0)),
            pointer_pressed: true,
            ..Default::default()
        };
        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(frame.tick.players[0].steer_toward, Some(Vec2::new(100.0, 200.0)));
        assert!(frame.tick.players[0].fire);

        snapshot.press_key("KeyA");
        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(frame.tick.players[0].steer_toward, None);
    }

    #[test]
    fn test_pad_stick_overrides_keyboard() {
        let mut mapper = InputMapper::new();
        let mut snapshot = keys(&["KeyD"]);
        snapshot.pads[0].connected = true;
        snapshot.pads[0].axes = [-0.5, 0.05, 0.0, 0.0];
        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(frame.tick.players[0].move_dir, Vec2::new(-0.5, 0.0));
    }

    #[test]
    fn test_right_stick_drives_player_two_with_one_pad() {
        let mut mapper = InputMapper::new();
        let mut snapshot = InputSnapshot::default();
        snapshot.pads[0].connected = true;
        snapshot.pads[0].axes = [0.0, 0.0, 0.8, 0.0];
        let frame = map(&mut mapper, &snapshot, GameMode::Coop);
        assert_eq!(frame.tick.players[1].move_dir, Vec2::new(0.8, 0.0));
        assert_eq!(frame.tick.players[0].move_dir, Vec2::ZERO);
    }

    #[test]
    fn test_pad_cycle_and_fire() {
        let mut mapper = InputMapper::new();
        let mut snapshot = InputSnapshot::default();
        snapshot.pads[0].connected = true;
        snapshot.pads[0].buttons[button::NEXT_BULLET] = true;
        snapshot.pads[0].buttons[button::FIRE_RIGHT_TRIGGER] = true;
        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(frame.tick.players[0].cycle, 1);
        assert!(frame.tick.players[0].fire);

        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert_eq!(frame.tick.players[0].cycle, 0);
    }

    #[test]
    fn test_disconnected_pad_is_ignored() {
        let mut mapper = InputMapper::new();
        let mut snapshot = InputSnapshot::default();
        snapshot.pads[0].buttons[button::FIRE] = true;
        snapshot.pads[0].axes = [1.0, 0.0, 0.0, 0.0];
        let frame = map(&mut mapper, &snapshot, GameMode::Single);
        assert!(!frame.tick.players[0].fire);
        assert_eq!(frame.tick.players[0].move_dir, Vec2::ZERO);
    }

    #[test]
    fn test_back_pauses_in_play_and_leaves_game_over() {
        let mut mapper = InputMapper::new();
        let mut snapshot = InputSnapshot::default();
        snapshot.pads[0].connected = true;
        snapshot.pads[0].buttons[button::BACK] = true;

        let frame = mapper.map(&snapshot, GameMode::Single, GamePhase::Playing, 0.1);
        assert!(frame.tick.pause);

        mapper.reset();
        let frame = mapper.map(&snapshot, GameMode::Single, GamePhase::GameOver, 0.1);
        assert!(!frame.tick.pause);
        assert_eq!(frame.commands, vec![MenuCommand::Back]);
    }

    #[test]
    fn test_menu_keys() {
        let mut mapper = InputMapper::new();
        let snapshot = keys(&["Enter", "Digit1", "Digit3"]);
        let frame = mapper.map(&snapshot, GameMode::Single, GamePhase::Start, 0.1);
        assert_eq!(
            frame.commands,
            vec![
                MenuCommand::Confirm,
                MenuCommand::ToggleVibration,
                MenuCommand::DeadZoneUp
            ]
        );

        // Enter is player two's trigger during play, never a menu confirm
        mapper.reset();
        let frame = mapper.map(&snapshot, GameMode::Coop, GamePhase::Playing, 0.1);
        assert!(frame.commands.is_empty());
        assert!(frame.tick.players[1].fire);
    }

    #[test]
    fn test_enter_does_not_restart_coop_game_over() {
        let mut mapper = InputMapper::new();
        let enter = keys(&["Enter"]);
        let frame = mapper.map(&enter, GameMode::Coop, GamePhase::GameOver, 0.1);
        assert!(frame.commands.is_empty());

        mapper.reset();
        let frame = mapper.map(&enter, GameMode::Single, GamePhase::GameOver, 0.1);
        assert_eq!(frame.commands, vec![MenuCommand::Confirm]);

        // The pad confirm button still restarts a coop session
        mapper.reset();
        let mut snapshot = InputSnapshot::default();
        snapshot.pads[0].connected = true;
        snapshot.pads[0].buttons[button::CONFIRM] = true;
        let frame = mapper.map(&snapshot, GameMode::Coop, GamePhase::GameOver, 0.1);
        assert_eq!(frame.commands, vec![MenuCommand::Confirm]);
    }
}
