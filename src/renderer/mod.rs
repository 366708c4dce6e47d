//! Frame building
//!
//! Converts simulation state into a flat list of 2D shapes in playfield
//! coordinates. The host replays the list on whatever surface it has (a
//! Canvas2D context in the browser); nothing here touches a graphics API.

pub mod shapes;

use glam::Vec2;

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::settings::Settings;
use crate::sim::{Enemy, EnemyKind, GamePhase, GameState, Player};
use shapes::{Color, Shape, TextAlign, WHITE};

pub use shapes::{css, rgb, rgba};

/// Translucent fill drawn over the previous frame, leaving motion smear
pub const BACKGROUND: Color = [0.0, 17.0 / 255.0, 34.0 / 255.0, 0.1];
const SHIELD_COLOR: u32 = 0x00aaff;
const DEBUG_COLOR: u32 = 0xffff00;

/// Host-side counters shown by the debug overlay
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub pad_connected: bool,
}

/// One frame's draw commands, back to front
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub background: Color,
    pub shapes: Vec<Shape>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Build the draw list for the current state
pub fn build_frame(state: &GameState, settings: &Settings, debug: Option<&DebugInfo>) -> Frame {
    let mut out = Vec::with_capacity(
        state.stars.len()
            + state.enemies.len() * 3
            + state.player_bullets.len() * 2
            + state.enemy_bullets.len()
            + state.particles.len()
            + 16,
    );

    for star in &state.stars {
        out.push(shapes::circle(star.pos, star.size, shapes::fade(WHITE, star.brightness)));
    }

    let blink = blink_alpha(state.clock_ms);
    for player in &state.players {
        draw_player(&mut out, player, blink);
    }
    for enemy in &state.enemies {
        draw_enemy(&mut out, enemy);
    }

    let trails = settings.quality.trails_enabled();
    for bullet in state.player_bullets.iter().chain(&state.enemy_bullets) {
        let color = rgb(bullet.color());
        if trails && let Some(trail) = shapes::trail(bullet.trail.iter().copied(), color) {
            out.push(trail);
        }
        out.push(shapes::circle(bullet.pos, bullet.radius, color));
    }

    for power_up in &state.power_ups {
        let pulse = (power_up.age_ms * 0.01).sin() * 0.3 + 1.0;
        let color = rgb(power_up.kind.color());
        out.push(shapes::circle(power_up.pos, power_up.radius * pulse * 0.8, color));
        out.push(shapes::ring(power_up.pos, power_up.radius * pulse, 2.0, WHITE));
        out.push(shapes::text(
            power_up.pos + Vec2::new(0.0, 5.0),
            power_up.kind.glyph(),
            14.0,
            TextAlign::Center,
            [0.0, 0.0, 0.0, 1.0],
        ));
    }

    if settings.particles {
        for particle in &state.particles {
            out.push(shapes::circle(
                particle.pos,
                particle.size * particle.alpha(),
                rgba(particle.color, particle.alpha()),
            ));
        }
    }

    if settings.effective_screen_flash() && state.screen_flash > 0.0 {
        out.push(shapes::rect(
            Vec2::ZERO,
            Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            shapes::fade(WHITE, state.screen_flash * 0.6),
        ));
    }

    if state.phase == GamePhase::Paused {
        draw_pause_overlay(&mut out);
    }

    if settings.debug_overlay
        && let Some(debug) = debug
    {
        draw_debug(&mut out, state, debug);
    }

    Frame {
        background: BACKGROUND,
        shapes: out,
    }
}

/// Invulnerability flicker, 0.0 - 1.0
fn blink_alpha(clock_ms: f64) -> f32 {
    ((clock_ms * 0.01).sin() * 0.5 + 0.5) as f32
}

fn draw_player(out: &mut Vec<Shape>, player: &Player, blink: f32) {
    let alpha = if player.invulnerable { blink } else { 1.0 };

    if player.effects.shield {
        out.push(shapes::ring(
            player.pos,
            player.radius + 5.0,
            3.0,
            rgba(SHIELD_COLOR, alpha),
        ));
    }

    let hull = match shapes::ship(player.pos, player.radius, 1.0, rgba(player.slot.color(), alpha)) {
        Shape::Polygon { points, fill, .. } => Shape::Polygon {
            points,
            fill,
            stroke: Some(shapes::fade(WHITE, alpha)),
        },
        other => other,
    };
    out.push(hull);

    // Engine flame
    out.push(shapes::circle(
        player.pos + Vec2::new(0.0, player.radius * 0.6),
        player.radius * 0.25,
        rgba(0xff6600, alpha),
    ));

    let fraction = player.health.max(0) as f32 / player.max_health.max(1) as f32;
    out.extend(shapes::health_bar(
        player.pos.x,
        player.pos.y + player.radius + 6.0,
        player.radius * 2.0,
        fraction,
    ));
}

fn draw_enemy(out: &mut Vec<Shape>, enemy: &Enemy) {
    out.extend(shapes::health_bar(
        enemy.pos.x,
        enemy.pos.y - enemy.radius - 10.0,
        enemy.radius * 2.0,
        enemy.health_fraction(),
    ));

    let color = rgb(enemy.kind.color());
    let body = match enemy.kind {
        EnemyKind::Heavy => shapes::regular_polygon(enemy.pos, enemy.radius, 6, 0.0, color),
        EnemyKind::Bomber => {
            shapes::regular_polygon(enemy.pos, enemy.radius, 4, std::f32::consts::FRAC_PI_4, color)
        }
        EnemyKind::Boss => shapes::regular_polygon(enemy.pos, enemy.radius, 8, 0.0, color),
        _ => shapes::ship(enemy.pos, enemy.radius, -1.0, color),
    };
    out.push(body);
}

fn draw_pause_overlay(out: &mut Vec<Shape>) {
    let center = Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0);
    let cyan = rgb(0x00ffff);
    out.push(shapes::rect(
        Vec2::ZERO,
        Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
        [0.0, 0.0, 0.0, 0.7],
    ));
    out.push(shapes::text(
        center - Vec2::new(0.0, 30.0),
        "PAUSED",
        48.0,
        TextAlign::Center,
        cyan,
    ));
    out.push(shapes::text(
        center + Vec2::new(0.0, 30.0),
        "Press ESC or P to resume",
        24.0,
        TextAlign::Center,
        cyan,
    ));
}

fn draw_debug(out: &mut Vec<Shape>, state: &GameState, debug: &DebugInfo) {
    let lines = [
        format!("FPS: {:.0}", debug.fps),
        format!("State: {:?}", state.phase),
        format!("Enemies: {}", state.enemies.len()),
        format!("Bullets: {}", state.player_bullets.len()),
        format!("Enemy bullets: {}", state.enemy_bullets.len()),
        format!("Particles: {}", state.particles.len()),
        format!("Power-ups: {}", state.power_ups.len()),
        format!(
            "Gamepad: {}",
            if debug.pad_connected { "connected" } else { "none" }
        ),
    ];
    for (i, line) in lines.into_iter().enumerate() {
        out.push(shapes::text(
            Vec2::new(10.0, 20.0 + i as f32 * 16.0),
            line,
            14.0,
            TextAlign::Left,
            rgb(DEBUG_COLOR),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameMode;

    fn texts(frame: &Frame) -> Vec<String> {
        frame
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_menu_frame_is_starfield() {
        let state = GameState::new(1);
        let frame = build_frame(&state, &Settings::default(), None);
        assert_eq!(frame.len(), state.stars.len());
        assert_eq!(frame.background, BACKGROUND);
    }

    #[test]
    fn test_shield_ring_drawn() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        let plain = build_frame(&state, &Settings::default(), None).len();

        state.players[0].effects.shield = true;
        let frame = build_frame(&state, &Settings::default(), None);
        assert_eq!(frame.len(), plain + 1);
        assert!(frame.shapes.iter().any(|s| matches!(
            s,
            Shape::Ring { radius, .. } if *radius == state.players[0].radius + 5.0
        )));
    }

    #[test]
    fn test_damaged_enemy_gets_health_bar() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.spawn_enemy(EnemyKind::Heavy, Vec2::new(400.0, 100.0));
        let full = build_frame(&state, &Settings::default(), None).len();

        state.enemies[0].health -= 1;
        let damaged = build_frame(&state, &Settings::default(), None).len();
        assert_eq!(damaged, full + 2);
    }

    #[test]
    fn test_pause_overlay_and_debug_text() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.toggle_pause();

        let settings = Settings {
            debug_overlay: true,
            ..Settings::default()
        };
        let debug = DebugInfo {
            fps: 60.0,
            pad_connected: true,
        };
        let lines = texts(&build_frame(&state, &settings, Some(&debug)));
        assert!(lines.iter().any(|t| t == "PAUSED"));
        assert!(lines.iter().any(|t| t == "FPS: 60"));
        assert!(lines.iter().any(|t| t == "Gamepad: connected"));
    }

    #[test]
    fn test_flash_respects_reduced_motion() {
        let mut state = GameState::new(1);
        state.start_session(GameMode::Single);
        state.screen_flash = 1.0;

        let with_flash = build_frame(&state, &Settings::default(), None).len();
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let without = build_frame(&state, &settings, None).len();
        assert_eq!(with_flash, without + 1);
    }
}
