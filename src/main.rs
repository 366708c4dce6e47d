//! Star Barrage entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        MouseEvent,
    };

    use star_barrage::Tuning;
    use star_barrage::audio::AudioManager;
    use star_barrage::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    use star_barrage::game::{Collaborators, Game};
    use star_barrage::haptics::NavigatorVibration;
    use star_barrage::highscores::HighScores;
    use star_barrage::input::{BUTTON_COUNT, BUTTON_THRESHOLD, InputSnapshot, PadState};
    use star_barrage::persistence::default_store;
    use star_barrage::platform::{GameOverSummary, HudSnapshot, Presenter, Screen};
    use star_barrage::renderer::shapes::{Shape, TextAlign};
    use star_barrage::renderer::{Frame, css};
    use star_barrage::sim::{GameMode, PlayerSlot};

    /// Keys whose default browser action (scrolling) is suppressed
    const CAPTURED_KEYS: [&str; 5] = ["Space", "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

    /// Everything the browser callbacks share
    struct Host {
        game: Game,
        input: InputSnapshot,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
        pad_connected: bool,
    }

    impl Host {
        fn frame(&mut self, time: f64) {
            let dt_ms = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                16.0
            };
            self.last_time = time;

            poll_gamepads(&mut self.input);
            let connected = self.input.any_pad_connected();
            if connected != self.pad_connected {
                self.pad_connected = connected;
                log::info!("Gamepad {}", if connected { "connected" } else { "disconnected" });
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_text(
                        &document,
                        "gamepadStatus",
                        if connected { "Gamepad connected" } else { "No gamepad" },
                    );
                }
            }

            self.game.update(dt_ms, &self.input);
            draw(&self.ctx, &self.game.render());
        }

        /// Client coordinates to playfield coordinates
        fn to_playfield(&self, event: &MouseEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let sx = PLAYFIELD_WIDTH as f64 / rect.width().max(1.0);
            let sy = PLAYFIELD_HEIGHT as f64 / rect.height().max(1.0);
            Vec2::new(
                ((event.client_x() as f64 - rect.left()) * sx) as f32,
                ((event.client_y() as f64 - rect.top()) * sy) as f32,
            )
        }
    }

    /// DOM overlay: screens, HUD, banner, leaderboard
    struct DomPresenter {
        document: Document,
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("display", if visible { "block" } else { "none" });
        }
    }

    impl DomPresenter {
        fn activate(&self, id: Option<&str>) {
            if let Ok(screens) = self.document.query_selector_all(".screen") {
                for i in 0..screens.length() {
                    if let Some(el) = screens.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) {
                        let _ = el.class_list().remove_1("active");
                    }
                }
            }
            if let Some(el) = id.and_then(|id| self.document.get_element_by_id(id)) {
                let _ = el.class_list().add_1("active");
            }
        }

        fn fill_leaderboard(&self, scores: &HighScores) {
            let Some(list) = self.document.get_element_by_id("leaderboardList") else {
                return;
            };
            if scores.is_empty() {
                list.set_inner_html(r#"<div class="leaderboard-empty">No scores yet</div>"#);
                return;
            }
            let rows: String = scores
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        r#"<div class="leaderboard-entry"><span>{}. {} pts (level {})</span><span>{} {}</span></div>"#,
                        i + 1,
                        e.score,
                        e.level,
                        e.date,
                        e.time
                    )
                })
                .collect();
            list.set_inner_html(&rows);
        }
    }

    impl Presenter for DomPresenter {
        fn show_screen(&mut self, screen: Screen) {
            log::info!("Screen: {}", screen.as_str());
            match screen {
                Screen::Start => {
                    self.activate(Some("startScreen"));
                    set_visible(&self.document, "hud", false);
                }
                Screen::Playing => {
                    self.activate(None);
                    set_visible(&self.document, "hud", true);
                }
                // Drawn on the canvas
                Screen::Paused => {}
                Screen::GameOver => self.activate(Some("gameOverScreen")),
                Screen::Leaderboard => self.activate(Some("leaderboardScreen")),
            }
        }

        fn update_hud(&mut self, hud: &HudSnapshot) {
            set_text(&self.document, "score", &format!("Score: {}", hud.score));
            set_text(&self.document, "level", &format!("Level: {}", hud.level));
            set_text(
                &self.document,
                "lives",
                &format!("Lives: {}", "\u{2764}".repeat(hud.lives as usize)),
            );
            for slot in [PlayerSlot::One, PlayerSlot::Two] {
                let id = format!("p{}Status", slot.number());
                match hud.players.iter().find(|p| p.slot == slot) {
                    Some(p) => {
                        set_visible(&self.document, &id, true);
                        set_text(
                            &self.document,
                            &id,
                            &format!(
                                "P{} HP {}/{}  Bombs {}  {} Lv{}",
                                slot.number(),
                                p.health,
                                p.max_health,
                                p.bombs,
                                p.bullet.as_str().to_uppercase(),
                                p.bullet_level
                            ),
                        );
                    }
                    None => set_visible(&self.document, &id, false),
                }
            }
        }

        fn show_game_over(&mut self, summary: &GameOverSummary) {
            set_text(&self.document, "finalScore", &format!("Score: {}", summary.score));
            set_text(&self.document, "finalLevel", &format!("Level: {}", summary.level));
            set_visible(&self.document, "newRecord", summary.new_record);
        }

        fn show_leaderboard(&mut self, scores: &HighScores) {
            self.fill_leaderboard(scores);
        }

        fn show_power_up(&mut self, slot: PlayerSlot, name: &str) {
            set_text(&self.document, "powerUpText", &format!("P{}: {}", slot.number(), name));
            set_visible(&self.document, "powerUpIndicator", true);
        }

        fn hide_power_up(&mut self) {
            set_visible(&self.document, "powerUpIndicator", false);
        }
    }

    fn poll_gamepads(input: &mut InputSnapshot) {
        input.pads = [PadState::default(); 2];
        let Some(window) = web_sys::window() else { return };
        let Ok(pads) = window.navigator().get_gamepads() else {
            return;
        };

        let mut slot = 0;
        for entry in pads.iter() {
            if slot >= input.pads.len() {
                break;
            }
            // Empty slots come back as null
            let Ok(gp) = entry.dyn_into::<web_sys::Gamepad>() else {
                continue;
            };
            if !gp.connected() {
                continue;
            }

            let mut pad = PadState {
                connected: true,
                ..PadState::default()
            };
            for (i, axis) in gp.axes().iter().take(pad.axes.len()).enumerate() {
                pad.axes[i] = axis.as_f64().unwrap_or(0.0) as f32;
            }
            for (i, button) in gp.buttons().iter().take(BUTTON_COUNT).enumerate() {
                if let Ok(button) = button.dyn_into::<web_sys::GamepadButton>() {
                    pad.buttons[i] = button.pressed() || button.value() > BUTTON_THRESHOLD as f64;
                }
            }
            input.pads[slot] = pad;
            slot += 1;
        }
    }

    fn trace(ctx: &CanvasRenderingContext2d, points: &[Vec2]) {
        ctx.begin_path();
        if let Some((first, rest)) = points.split_first() {
            ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                ctx.line_to(p.x as f64, p.y as f64);
            }
        }
    }

    fn draw(ctx: &CanvasRenderingContext2d, frame: &Frame) {
        ctx.set_fill_style_str(&css(frame.background));
        ctx.fill_rect(0.0, 0.0, PLAYFIELD_WIDTH as f64, PLAYFIELD_HEIGHT as f64);

        for shape in &frame.shapes {
            match shape {
                Shape::Rect { min, size, color } => {
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                }
                Shape::Circle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU);
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill();
                }
                Shape::Ring {
                    center,
                    radius,
                    width,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU);
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.stroke();
                }
                Shape::Polygon {
                    points,
                    fill,
                    stroke,
                } => {
                    trace(ctx, points);
                    ctx.close_path();
                    ctx.set_fill_style_str(&css(*fill));
                    ctx.fill();
                    if let Some(stroke) = stroke {
                        ctx.set_line_width(1.5);
                        ctx.set_stroke_style_str(&css(*stroke));
                        ctx.stroke();
                    }
                }
                Shape::Polyline {
                    points,
                    width,
                    color,
                } => {
                    trace(ctx, points);
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.stroke();
                }
                Shape::Text {
                    pos,
                    text,
                    size,
                    align,
                    color,
                } => {
                    ctx.set_font(&format!("{}px monospace", size));
                    ctx.set_text_align(match align {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                    });
                    ctx.set_fill_style_str(&css(*color));
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }

    /// Balance overrides embedded in the page as JSON, if any
    fn page_tuning(document: &Document) -> Tuning {
        let Some(text) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };
        match Tuning::from_json(&text) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Star Barrage starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("gameCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #gameCanvas element");
            return;
        };
        canvas.set_width(PLAYFIELD_WIDTH as u32);
        canvas.set_height(PLAYFIELD_HEIGHT as u32);

        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let io = Collaborators {
            store: default_store(),
            audio: Box::new(AudioManager::new()),
            haptics: Box::new(NavigatorVibration::new()),
            presenter: Box::new(DomPresenter {
                document: document.clone(),
            }),
        };
        let game = Game::new(seed, page_tuning(&document), io);
        log::info!("Game initialized with seed: {}", seed);

        let host = Rc::new(RefCell::new(Host {
            game,
            input: InputSnapshot::default(),
            canvas: canvas.clone(),
            ctx,
            last_time: 0.0,
            pad_connected: false,
        }));

        setup_input_handlers(&canvas, host.clone());
        setup_buttons(&document, host.clone());
        setup_auto_pause(host.clone());

        request_animation_frame(host);

        log::info!("Star Barrage running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if CAPTURED_KEYS.contains(&code.as_str()) {
                    event.prevent_default();
                }
                host.borrow_mut().input.press_key(&code);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                host.borrow_mut().input.release_key(&event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer steering and fire
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                let pos = h.to_playfield(&event);
                h.input.pointer = Some(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                host.borrow_mut().input.pointer_pressed = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                host.borrow_mut().input.pointer_pressed = false;
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // No context menu over the playfield
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, host: &Rc<RefCell<Host>>, action: fn(&mut Game)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut host.borrow_mut().game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, host: Rc<RefCell<Host>>) {
        on_click(document, "startButton", &host, |g| g.start(GameMode::Single));
        on_click(document, "coopButton", &host, |g| g.start(GameMode::Coop));
        on_click(document, "restartButton", &host, Game::restart);
        on_click(document, "mainMenuButton", &host, Game::main_menu);
        on_click(document, "leaderboardButton", &host, Game::show_leaderboard);
        on_click(document, "leaderboardBackButton", &host, Game::main_menu);
        on_click(document, "vibrationButton", &host, |g| {
            let enabled = g.toggle_vibration();
            log::info!("Vibration {}", if enabled { "on" } else { "off" });
        });
    }

    fn setup_auto_pause(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let host = host.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    host.borrow_mut().game.on_focus_lost();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut h = host.borrow_mut();
                h.input.keys.clear();
                h.input.pointer_pressed = false;
                h.game.on_focus_lost();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        host.borrow_mut().frame(time);
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Star Barrage (native) starting...");
    log::info!("Native mode runs a headless session - use `trunk serve` for the playable web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    headless_session(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot: hold fire and sweep side to side until the lives run out
#[cfg(not(target_arch = "wasm32"))]
fn headless_session(seed: u64) {
    use star_barrage::Game;
    use star_barrage::input::InputSnapshot;
    use star_barrage::sim::{GameMode, GamePhase};

    const FRAME_MS: f32 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    let mut game = Game::headless(seed);
    game.start(GameMode::Single);

    let mut input = InputSnapshot::default();
    input.press_key("Space");
    let mut frames = 0;
    while game.phase() == GamePhase::Playing && frames < MAX_FRAMES {
        // Switch direction every two seconds
        let (on, off) = if (frames / 120) % 2 == 0 {
            ("KeyA", "KeyD")
        } else {
            ("KeyD", "KeyA")
        };
        input.press_key(on);
        input.release_key(off);

        game.update(FRAME_MS, &input);
        frames += 1;
    }

    println!("Seed {}: {} frames simulated", seed, frames);
    match game.last_result() {
        Some(result) => println!(
            "Game over - score {} at level {}{}",
            result.score,
            result.level,
            if result.new_record { " (new record)" } else { "" }
        ),
        None => println!(
            "Still alive - score {} at level {}",
            game.state.score, game.state.level
        ),
    }
}
