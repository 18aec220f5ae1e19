//! Wave Dash entry point
//!
//! In the browser this wires DOM input, the animation loop, HUD text and audio
//! to a [`GameSession`]; drawing is left to the page, which reads the JSON frame
//! snapshot published on `window.waveDashFrame`. Natively it plays a headless
//! autopilot demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use wave_dash::audio::AudioManager;
    use wave_dash::persistence::LocalStore;
    use wave_dash::sim::{GameEvent, RunStatus};
    use wave_dash::{Difficulty, GameSession, SessionConfig, Settings, platform};

    /// Property on `window` holding the latest frame snapshot
    const FRAME_PROPERTY: &str = "waveDashFrame";

    struct Game {
        session: GameSession<LocalStore>,
        settings: Settings,
        audio: AudioManager,
        /// Decorative loop currently scheduled
        effects_running: bool,
        /// Results panel already filled for the finished run
        results_shown: bool,
    }

    impl Game {
        fn new(width: f32, height: f32) -> Self {
            let settings = Settings::load(&LocalStore::new());
            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());
            audio.set_muted(!settings.sound);
            let session = GameSession::with_canvas(
                LocalStore::new(),
                SessionConfig::from_settings(&settings),
                width,
                height,
                platform::new_seed(),
            );
            Self {
                session,
                settings,
                audio,
                effects_running: false,
                results_shown: false,
            }
        }

        /// Persist settings that only change presentation
        fn save_settings(&mut self) {
            self.settings.save(&mut LocalStore::new());
            self.audio.set_volume(self.settings.effective_volume());
            self.audio.set_muted(!self.settings.sound);
        }

        /// Persist settings and push the new run config into the session
        fn apply_settings(&mut self) {
            self.save_settings();
            self.session
                .set_config(SessionConfig::from_settings(&self.settings));
            self.results_shown = false;
            log::info!(
                "Mode: {} mini={} endless={} pattern={} reduced_motion={}",
                self.settings.difficulty.as_str(),
                self.settings.mini,
                self.settings.endless,
                self.settings.training_pattern.as_str(),
                self.settings.reduced_motion
            );
        }

        fn restart(&mut self) {
            self.session.reset();
            self.results_shown = false;
        }

        /// Advance one animation frame; returns true when a run just ended
        fn update(&mut self, time: f64) -> bool {
            let events = self.session.frame(time);
            self.audio.play_events(&events);
            events
                .iter()
                .any(|e| matches!(e, GameEvent::Crashed | GameEvent::Won))
        }

        /// Publish the frame snapshot for the page renderer
        fn publish(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let mut snapshot = self.session.snapshot();
            if !self.settings.trails {
                snapshot.trail = &[];
            }
            if !self.settings.particles {
                snapshot.particles = &[];
                snapshot.click_effects = &[];
            }
            if !self.settings.effective_screen_shake() {
                snapshot.shake = 0.0;
            }
            if !self.settings.ghost {
                snapshot.ghost_y = None;
            }
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    let _ = js_sys::Reflect::set(
                        &window,
                        &JsValue::from_str(FRAME_PROPERTY),
                        &JsValue::from_str(&json),
                    );
                }
                Err(e) => log::warn!("Failed to encode frame: {e}"),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let status = self.session.status();
            let stats = self.session.stats();

            set_text(
                &document,
                "#hud-time .hud-value",
                &format!("{:.2}", self.session.state().elapsed_ms / 1000.0),
            );
            set_text(
                &document,
                "#hud-consistency .hud-value",
                &format!("{:.0}%", stats.consistency),
            );
            set_text(
                &document,
                "#hud-best .hud-value",
                &format!("{:.2}", stats.best_time),
            );

            set_visible(&document, "start-prompt", status == RunStatus::Idle);
            set_visible(&document, "results", status.is_finished());

            if !status.is_finished() || self.results_shown {
                return;
            }
            self.results_shown = true;

            let Some(run) = self.session.last_run() else {
                return;
            };
            let headline = match run.status {
                RunStatus::Won => "Cleared!",
                _ => "Crashed",
            };
            set_text(&document, "#results-title", headline);
            set_text(&document, "#final-time", &format!("{:.2}s", run.entry.time));
            set_text(&document, "#final-consistency", &run.entry.consistency);
            set_text(
                &document,
                "#final-ur",
                &format!("{:.0}", run.stats.unstable_rate),
            );
            set_text(&document, "#final-band", run.stats.band().label());
            set_visible(&document, "new-best", run.rank == Some(1));

            if let Some(list) = document.get_element_by_id("leaderboard-list") {
                list.set_text_content(None);
                for (i, entry) in stats.leaderboard.iter().enumerate() {
                    if let Ok(row) = document.create_element("li") {
                        // Stored strings are shown as text, never parsed as markup
                        row.set_text_content(Some(&entry.row_label(i + 1)));
                        let _ = list.append_child(&row);
                    }
                }
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Wave Dash starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let (width, height) = fit_canvas(&canvas);

        let game = Rc::new(RefCell::new(Game::new(width, height)));

        setup_input_handlers(&canvas, game.clone())?;
        setup_buttons(&document, game.clone());
        setup_resize(&canvas, game.clone())?;

        request_animation_frame(game);

        log::info!("Wave Dash running!");
        Ok(())
    }

    /// Match the canvas backing size to its layout size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32) {
        let w = canvas.client_width().max(1) as u32;
        let h = canvas.client_height().max(1) as u32;
        canvas.set_width(w);
        canvas.set_height(h);
        (w as f32, h as f32)
    }

    fn is_hold_key(key: &str) -> bool {
        matches!(key, " " | "ArrowUp" | "w" | "W")
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Pointer down/up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().session.set_holding(true);
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().session.set_holding(false);
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if is_hold_key(&key) {
                    event.prevent_default();
                    if !event.repeat() {
                        game.borrow_mut().session.set_holding(true);
                    }
                    return;
                }
                let mut g = game.borrow_mut();
                match key.as_str() {
                    "r" | "R" | "Enter" => g.restart(),
                    "1" | "2" | "3" | "4" | "5" => {
                        let idx = key.parse::<usize>().unwrap_or(1) - 1;
                        if let Some(&difficulty) = Difficulty::ALL.get(idx) {
                            g.settings.difficulty = difficulty;
                            g.apply_settings();
                        }
                    }
                    "e" | "E" => {
                        g.settings.endless = !g.settings.endless;
                        g.apply_settings();
                    }
                    "m" | "M" => {
                        g.settings.mini = !g.settings.mini;
                        g.apply_settings();
                    }
                    "p" | "P" => {
                        g.settings.training_pattern = g.settings.training_pattern.next();
                        g.apply_settings();
                    }
                    "x" | "X" => {
                        g.settings.reduced_motion = !g.settings.reduced_motion;
                        g.apply_settings();
                    }
                    "s" | "S" => {
                        g.settings.sound = !g.settings.sound;
                        g.save_settings();
                    }
                    "t" | "T" => {
                        g.settings.trails = !g.settings.trails;
                        g.save_settings();
                    }
                    "k" | "K" => {
                        g.settings.particles = !g.settings.particles;
                        g.save_settings();
                    }
                    "g" | "G" => {
                        g.settings.ghost = !g.settings.ghost;
                        g.save_settings();
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if is_hold_key(&event.key()) {
                    game.borrow_mut().session.set_holding(false);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("clear-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.session.clear_leaderboard();
                g.results_shown = false;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = fit_canvas(&canvas);
            game.borrow_mut().session.resize(w, h);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let start_effects = {
            let mut g = game.borrow_mut();
            let finished = g.update(time);
            g.publish();
            g.update_hud();
            let start = finished && !g.effects_running;
            if start {
                g.effects_running = true;
            }
            start
        };
        if start_effects {
            request_effects_frame(game.clone());
        }

        request_animation_frame(game);
    }

    /// Decorative loop: decays crash particles and shake after a run ends
    fn request_effects_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            let keep_going = {
                let mut g = game.borrow_mut();
                let keep_going =
                    g.session.status() != RunStatus::Playing && g.session.tick_effects();
                g.effects_running = keep_going;
                keep_going
            };
            if keep_going {
                request_effects_frame(game);
            }
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Wave Dash failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Wave Dash (native) starting...");
    log::info!("Native mode plays a headless autopilot demo; build for wasm32 to play");

    // Usage: wave-dash [difficulty] [pattern]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let difficulty = args
        .first()
        .and_then(|s| wave_dash::Difficulty::from_str(s))
        .unwrap_or_default();
    let pattern = args
        .get(1)
        .and_then(|s| wave_dash::sim::PatternMode::from_str(s))
        .unwrap_or_default();
    demo::run(difficulty, pattern);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use wave_dash::persistence::MemoryStore;
    use wave_dash::sim::{GravitySide, PatternMode, RunState, RunStatus};
    use wave_dash::{Difficulty, GameSession, SessionConfig, platform};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: usize = 60 * 30;
    const RUNS: usize = 3;

    /// Steer toward the gap of the next obstacle still in reach
    fn autopilot(state: &RunState) -> bool {
        let avatar = state.avatar;
        let r = state.params.avatar_radius;
        let target = state
            .obstacles
            .iter()
            .find(|o| o.right() + r > avatar.x)
            .map(|o| o.gap_center())
            .unwrap_or(state.params.height * 0.5);
        match state.gravity_side {
            GravitySide::Normal => avatar.y > target,
            GravitySide::Flipped => avatar.y < target,
        }
    }

    pub fn run(difficulty: Difficulty, pattern: PatternMode) {
        let config = SessionConfig {
            difficulty,
            training_pattern: pattern,
            ..Default::default()
        };
        let mut session = GameSession::new(MemoryStore::new(), config, platform::new_seed());
        println!(
            "Autopilot on {} / {} ({} runs)",
            difficulty.as_str(),
            pattern.as_str(),
            RUNS
        );

        let mut now = 0.0;
        for run in 1..=RUNS {
            session.set_holding(false);
            session.reset();
            session.set_holding(true);
            session.frame(now);

            let mut frames = 0;
            while session.status() == RunStatus::Playing && frames < MAX_FRAMES {
                now += FRAME_MS;
                frames += 1;
                let holding = autopilot(session.state());
                session.set_holding(holding);
                session.frame(now);
            }
            now += 1000.0;

            match session.last_run() {
                Some(result) => {
                    println!(
                        "Run {}: {:?} after {:.2}s ({} frames), consistency {}, UR {:.0} ({}), rank {:?}",
                        run,
                        result.status,
                        result.entry.time,
                        frames,
                        result.entry.consistency,
                        result.stats.unstable_rate,
                        result.stats.band().label(),
                        result.rank
                    );
                }
                None => println!("Run {}: still playing after {} frames", run, frames),
            }
        }

        println!("\nLeaderboard:");
        for (i, entry) in session.leaderboard().entries.iter().enumerate() {
            println!("  {}", entry.row_label(i + 1));
        }
        println!("Best time: {:.2}s", session.best_time());
    }
}
