//! Vibe Flap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, KeyboardEvent, MouseEvent, TouchEvent};

    use vibe_flap::audio::{AudioSink, WebAudioSink};
    use vibe_flap::sim::{GamePhase, RunOutcome};
    use vibe_flap::game::is_ui_control;
    use vibe_flap::{BestScore, Game, Settings, Snapshot, Tuning};

    // Hand each frame to a JS renderer if the page registered one
    #[wasm_bindgen(inline_js = "
        export function publish_frame(json) {
            const render = window.vibeRender;
            if (typeof render === 'function') {
                render(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn publish_frame(json: &str);
    }

    /// Host-side wrapper: the game plus what the page needs to draw it
    struct Host {
        game: Game,
        settings: Settings,
        last_phase: GamePhase,
        last_score: Option<u32>,
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Buttons and the title handle their own input
    fn targets_ui_control(event: &Event) -> bool {
        event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .is_some_and(|el| is_ui_control(&el.tag_name()))
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    impl Host {
        /// Update HUD elements in DOM
        fn update_hud(&mut self, snap: &Snapshot) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if self.last_score != Some(snap.score) {
                set_text(&document, "current-score", &snap.score.to_string());
                self.last_score = Some(snap.score);
            }

            if snap.phase == self.last_phase {
                return;
            }
            self.last_phase = snap.phase;

            set_hidden(&document, "start-screen", snap.phase != GamePhase::Start);
            set_hidden(&document, "hud", snap.phase != GamePhase::Playing);

            let (crashed, won) = match &snap.outcome {
                Some(RunOutcome::Crashed { .. }) => (true, false),
                Some(RunOutcome::Won { .. }) => (false, true),
                None => (false, false),
            };
            let over = snap.phase == GamePhase::GameOver;
            set_hidden(&document, "game-over-screen", !(over && crashed));
            set_hidden(&document, "win-screen", !(over && won));

            if let Some(outcome) = &snap.outcome {
                if let RunOutcome::Crashed { message, .. } = outcome {
                    set_text(&document, "death-reason", message);
                }
                set_text(&document, "final-score", &outcome.score().to_string());
                set_text(&document, "win-score", &outcome.score().to_string());
            }
            set_text(&document, "best-score", &snap.best_score.to_string());
        }

        fn frame(&mut self, time: f64) {
            self.game.frame(time);
            self.game.take_events();

            let snap = self.game.snapshot();
            self.update_hud(&snap);
            if let Some(json) = snap.to_json() {
                publish_frame(&json);
            }
        }

        fn press(&mut self) {
            self.game.resume_audio();
            self.game.press(now_ms());
        }

        fn toggle_mute(&mut self) {
            self.settings.toggle_mute();
            let volume = self.settings.effective_music_volume();
            self.game.set_music_volume(volume);
        }

        /// Buttons skip the restart cooldown
        fn restart(&mut self) {
            self.game.resume_audio();
            self.game.init(now_ms());
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Vibe Flap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let best = BestScore::load();
        let seed = js_sys::Date::now() as u64;

        let audio = WebAudioSink::new(&settings, seed).map(|s| Box::new(s) as Box<dyn AudioSink>);
        let tuning = Tuning::with_viewport(
            window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(480.0) as f32,
            window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(800.0) as f32,
        );

        let game = Game::new(seed, tuning, best, audio);
        if game.audio_unavailable() {
            set_hidden(&document, "audio-warning", false);
        }
        set_text(&document, "best-score", &best.value().to_string());
        log::info!("Game initialized with seed: {}", seed);

        let host = Rc::new(RefCell::new(Host {
            game,
            settings,
            last_phase: GamePhase::GameOver,
            last_score: None,
        }));
        // Force the first HUD pass to draw the start screen
        let snap = host.borrow().game.snapshot();
        host.borrow_mut().update_hud(&snap);

        setup_input_handlers(host.clone());
        setup_buttons(&document, host.clone());
        setup_focus_handlers(host.clone());

        // Start game loop
        request_animation_frame(host);

        log::info!("Vibe Flap running!");
    }

    fn setup_input_handlers(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard: Space plays, M mutes, I toggles the autopilot, backquote the cheat
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut h = host.borrow_mut();
                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        if !event.repeat() {
                            h.press();
                        }
                    }
                    "KeyM" => h.toggle_mute(),
                    "KeyI" => {
                        let on = !h.game.idle_mode();
                        h.game.set_idle_mode(on);
                    }
                    "Backquote" => {
                        h.game.toggle_dev_invincible();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if targets_ui_control(&event) {
                    return;
                }
                host.borrow_mut().press();
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if targets_ui_control(&event) {
                    return;
                }
                event.prevent_default();
                host.borrow_mut().press();
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, host: Rc<RefCell<Host>>) {
        for id in ["start-btn", "restart-btn", "win-restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                host.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hidden cheat: click the title a few times
        let Some(title) = document.query_selector("#start-screen h1").ok().flatten() else {
            return;
        };
        for kind in ["mousedown", "touchstart"] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
                event.stop_propagation();
                // Keeps a touch from also firing mousedown
                event.prevent_default();
                if host.borrow_mut().game.title_click() {
                    log::info!("Title cheat toggled");
                }
            });
            let _ = title.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };

        // Window blur (click outside)
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut h = host.borrow_mut();
                let volume = h.settings.blurred_music_volume();
                h.game.set_music_volume(volume);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut h = host.borrow_mut();
                let volume = h.settings.effective_music_volume();
                h.game.set_music_volume(volume);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
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
    use vibe_flap::audio::{Layer, VoiceRecorder};
    use vibe_flap::sim::GamePhase;
    use vibe_flap::{BestScore, Game, Tuning};

    /// Simulated wall-clock limit for the demo
    const DEMO_SECONDS: f64 = 300.0;

    env_logger::init();
    log::info!("Vibe Flap (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - build for wasm32 to play");

    // Optional tuning override: first argument is a JSON file
    let tuning = std::env::args()
        .nth(1)
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                None
            }
        })
        .unwrap_or_default();

    let recorder = VoiceRecorder::new();
    let mut game = Game::new(
        0x5eed,
        tuning,
        BestScore::load(),
        Some(Box::new(recorder.clone())),
    );
    game.set_idle_mode(true);

    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    game.press(now);
    while game.phase() == GamePhase::Playing && now < DEMO_SECONDS * 1000.0 {
        now += frame_ms;
        game.frame(now);
        game.take_events();
    }

    let snap = game.snapshot();
    match &snap.outcome {
        Some(outcome) => log::info!("Demo finished: {:?}", outcome),
        None => log::info!(
            "Demo still running after {:.0}s with {} points",
            DEMO_SECONDS,
            snap.score
        ),
    }
    log::info!(
        "Scheduled {} voices over {} music steps",
        recorder.len(),
        game.music().step()
    );
    for layer in Layer::ALL {
        let count = recorder.count_layer(layer);
        if count > 0 {
            log::info!("  {:<16} {}", layer.name(), count);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
