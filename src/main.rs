//! Circuit Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use anyhow::{Result, anyhow};
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use circuit_runner::audio::AudioManager;
    use circuit_runner::persistence::{KeyValueStore, LocalStore, NullStore};
    use circuit_runner::platform::{
        Action, HOW_TO_PLAY, LoopDriver, action_for_key, browser, seed_from_clock, today,
    };
    use circuit_runner::renderer::{CanvasRenderer, DrawOptions};
    use circuit_runner::sim::{GameEvent, GamePhase, Session, TickOutcome, Viewport};
    use circuit_runner::{Leaderboard, LeaderboardEntry, Settings, Tuning};

    /// Dev override for game balance, plain JSON
    const TUNING_KEY: &str = "circuit_runner_tuning";

    /// Game instance holding all state
    struct Game {
        driver: LoopDriver,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        leaderboard: Leaderboard,
        /// Finished run waiting for a name
        pending_entry: Option<(u64, u32)>,
        render_failed: bool,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            if let Some(outcome) = self.driver.frame(time) {
                self.handle_outcome(&outcome);
            }
            self.audio.update_music();

            let options = DrawOptions {
                reduced_motion: self.settings.reduced_motion,
            };
            if let Err(e) = self.renderer.draw(self.driver.session(), time, options) {
                // Log once, keep the loop alive
                if !self.render_failed {
                    log::warn!("Render error: {:#}", e);
                    self.render_failed = true;
                }
            }
            self.update_hud();
        }

        fn handle_outcome(&mut self, outcome: &TickOutcome) {
            for event in &outcome.events {
                if let Some(cue) = event.cue() {
                    self.audio.play(cue);
                }
                match event {
                    GameEvent::GameOverRevealed { score, level } => self.reveal_game_over(*score, *level),
                    GameEvent::LevelStarted { level } => log::info!("Entering level {}", level),
                    _ => {}
                }
            }
        }

        fn reveal_game_over(&mut self, score: u64, level: u32) {
            browser::set_text("final-score", &score.to_string());
            browser::set_text("final-level", &level.to_string());
            browser::set_visible("game-over", true);

            if let Some(rank) = self.leaderboard.potential_rank(score) {
                self.pending_entry = Some((score, level));
                browser::set_text("entry-rank", &rank.to_string());
                if let Some(input) = browser::element("name-input")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    input.set_value(&self.settings.player_name);
                }
                browser::set_visible("name-entry", true);
            } else {
                browser::set_visible("name-entry", false);
            }
            self.render_leaderboard();
        }

        /// Offer the leaderboard write for the finished run
        fn submit_score(&mut self) {
            let Some((score, level)) = self.pending_entry.take() else {
                return;
            };
            let name = browser::element("name-input")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_else(|| self.settings.player_name.clone());

            let entry = LeaderboardEntry::new(&name, score, level, &today());
            self.settings.player_name = entry.name.clone();
            self.settings.save(self.store.as_ref());
            if let Some(rank) = self.leaderboard.record(self.store.as_ref(), entry) {
                log::info!("New leaderboard entry at rank {}", rank);
            }
            browser::set_visible("name-entry", false);
            self.render_leaderboard();
        }

        fn render_leaderboard(&self) {
            let Some(list) = browser::element("leaderboard") else {
                return;
            };
            let rows: String = self
                .leaderboard
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "<li><span>{}. {}</span><span>{}</span><span>L{}</span><span>{}</span></li>",
                        i + 1,
                        escape(&e.name),
                        e.score,
                        e.level,
                        escape(&e.date)
                    )
                })
                .collect();
            list.set_inner_html(&rows);
        }

        /// Swap the menu for the how-to-play screen and back
        fn show_how_to_play(&self, show: bool) {
            if self.driver.session().state.phase != GamePhase::Menu {
                return;
            }
            browser::set_visible("menu", !show);
            browser::set_visible("how-to-play", show);
        }

        fn start_or_retry(&mut self) {
            self.audio.resume();
            if self.driver.start_or_retry() {
                self.audio.start_music();
                self.pending_entry = None;
                browser::set_visible("menu", false);
                browser::set_visible("how-to-play", false);
                browser::set_visible("game-over", false);
                browser::set_visible("hud", true);
            }
        }

        fn quit_to_menu(&mut self) {
            self.driver.quit_to_menu();
            self.pending_entry = None;
            browser::set_visible("game-over", false);
            browser::set_visible("hud", false);
            browser::set_visible("how-to-play", false);
            browser::set_visible("menu", true);
            self.render_leaderboard();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let session = self.driver.session();
            let state = &session.state;
            browser::set_text("hud-score", &state.score.to_string());
            browser::set_text("hud-lives", &state.lives.to_string());
            browser::set_text("hud-level", &state.level.to_string());
            browser::set_text(
                "hud-chips",
                &session.level.remaining_collectibles().to_string(),
            );
            if self.settings.show_fps {
                browser::set_text("hud-fps", &self.driver.fps().to_string());
            }
            browser::set_visible("rotate-prompt", !self.driver.is_landscape());
            browser::set_visible(
                "level-banner",
                state.phase == GamePhase::LevelComplete,
            );
        }
    }

    fn render_how_to_play() {
        let Some(list) = browser::element("how-to-play-list") else {
            return;
        };
        let rows: String = HOW_TO_PLAY
            .iter()
            .map(|(heading, detail)| format!("<li><h3>{}</h3><p>{}</p></li>", heading, detail))
            .collect();
        list.set_inner_html(&rows);
    }

    fn escape(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// A registered listener, kept so it can be removed on teardown
    struct Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    /// Everything needed to stop the game
    struct Handle {
        game: Rc<RefCell<Game>>,
        listeners: Vec<Listener>,
        raf_id: Rc<Cell<Option<i32>>>,
    }

    thread_local! {
        static HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
    }

    impl Handle {
        fn listen<F>(&mut self, target: &EventTarget, event: &'static str, f: F)
        where
            F: FnMut(web_sys::Event) + 'static,
        {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(f);
            if let Err(e) =
                target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                log::warn!("Could not listen for '{}': {:?}", event, e);
                return;
            }
            self.listeners.push(Listener {
                target: target.clone(),
                event,
                closure,
            });
        }

        /// Listen on `#id` if it exists
        fn listen_id<F>(&mut self, id: &str, event: &'static str, f: F)
        where
            F: FnMut(web_sys::Event) + 'static,
        {
            if let Some(el) = browser::element(id) {
                self.listen(&el, event, f);
            }
        }

        fn teardown(self) {
            if let Some(id) = self.raf_id.take() {
                if let Ok(window) = browser::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
            for listener in &self.listeners {
                let _ = listener.target.remove_event_listener_with_callback(
                    listener.event,
                    listener.closure.as_ref().unchecked_ref(),
                );
            }
            {
                let mut game = self.game.borrow_mut();
                game.driver.stop();
                game.audio.stop_music();
            }
            log::info!("Circuit Runner stopped ({} listeners released)", self.listeners.len());
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Storage unavailable, scores will not persist: {:#}", e);
                Box::new(NullStore)
            }
        }
    }

    fn load_tuning(store: &dyn KeyValueStore) -> Tuning {
        match store.get(TUNING_KEY) {
            Ok(Some(json)) => Tuning::from_json_or_default(&json),
            _ => Tuning::default(),
        }
    }

    pub fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow!("logger init failed: {}", e))?;

        log::info!("Circuit Runner starting...");

        let canvas: HtmlCanvasElement = browser::canvas()?;
        let mut renderer = CanvasRenderer::new(canvas.clone())?;
        let (w, h) = renderer.resize();

        let store = open_store();
        let settings = Settings::load(store.as_ref());
        let leaderboard = Leaderboard::read(store.as_ref());
        let tuning = load_tuning(store.as_ref());

        let seed = seed_from_clock();
        let session = Session::new(seed, tuning, Viewport::new(w, h));
        log::info!("Session created with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            driver: LoopDriver::new(session),
            renderer,
            audio: AudioManager::new(&settings),
            settings,
            store,
            leaderboard,
            pending_entry: None,
            render_failed: false,
        }));
        game.borrow().render_leaderboard();
        render_how_to_play();

        browser::set_visible("loading", false);
        browser::set_visible("menu", true);

        let mut handle = Handle {
            game: game.clone(),
            listeners: Vec::new(),
            raf_id: Rc::new(Cell::new(None)),
        };
        setup_listeners(&mut handle)?;

        let raf_id = handle.raf_id.clone();
        HANDLE.with(|slot| *slot.borrow_mut() = Some(handle));

        request_animation_frame(game, raf_id);
        log::info!("Circuit Runner running!");
        Ok(())
    }

    fn setup_listeners(handle: &mut Handle) -> Result<()> {
        let window = browser::window()?;
        let document = browser::document()?;
        let game = handle.game.clone();

        // Keyboard
        {
            let game = game.clone();
            handle.listen(&window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let Some(action) = action_for_key(&event.key()) else {
                    return;
                };
                // Typing a name must not move the player
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                if typing {
                    if action == Action::Start {
                        game.borrow_mut().submit_score();
                    }
                    return;
                }
                event.prevent_default();
                let mut g = game.borrow_mut();
                match action {
                    Action::Start => g.start_or_retry(),
                    Action::Quit => g.quit_to_menu(),
                    _ if event.repeat() => {}
                    _ => g.driver.input_mut().press(action),
                }
            });
        }
        {
            let game = game.clone();
            handle.listen(&window, "keyup", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    if let Some(action) = action_for_key(&event.key()) {
                        game.borrow_mut().driver.input_mut().release(action);
                    }
                }
            });
        }

        // Touch stick: horizontal offset from the pad center, normalized
        for name in ["touchstart", "touchmove"] {
            let game = game.clone();
            handle.listen_id("joystick", name, move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let (Some(touch), Some(pad)) = (event.target_touches().get(0), browser::element("joystick"))
                else {
                    return;
                };
                let rect = pad.get_bounding_client_rect();
                let radius = (rect.width() / 2.0).max(1.0);
                let center = rect.left() + radius;
                let x = (touch.client_x() as f64 - center) / radius;
                game.borrow_mut().driver.input_mut().set_stick(x as f32);
            });
        }
        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            handle.listen_id("joystick", name, move |_event| {
                game.borrow_mut().driver.input_mut().set_stick(0.0);
            });
        }

        // Jump button
        for name in ["touchstart", "mousedown"] {
            let game = game.clone();
            handle.listen_id("jump-btn", name, move |event| {
                event.prevent_default();
                game.borrow_mut().driver.input_mut().request_jump();
            });
        }

        // Menu buttons
        for id in ["start-btn", "retry-btn"] {
            let game = game.clone();
            handle.listen_id(id, "click", move |_event| {
                game.borrow_mut().start_or_retry();
            });
        }
        {
            let game = game.clone();
            handle.listen_id("menu-btn", "click", move |_event| {
                game.borrow_mut().quit_to_menu();
            });
        }
        for (id, show) in [("how-to-play-btn", true), ("how-to-back-btn", false)] {
            let game = game.clone();
            handle.listen_id(id, "click", move |_event| {
                game.borrow().show_how_to_play(show);
            });
        }
        {
            let game = game.clone();
            handle.listen_id("save-score-btn", "click", move |_event| {
                game.borrow_mut().submit_score();
            });
        }

        // Resize / rotation
        {
            let game = game.clone();
            handle.listen(&window, "resize", move |_event| {
                let mut g = game.borrow_mut();
                let (w, h) = g.renderer.resize();
                g.driver.resize(w, h);
            });
        }

        // Tab hidden or window blurred: drop held input, optionally mute
        {
            let game = game.clone();
            let doc = document.clone();
            handle.listen(&document, "visibilitychange", move |_event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().driver.suspend();
                    log::info!("Suspended (tab hidden)");
                }
            });
        }
        {
            let game = game.clone();
            handle.listen(&window, "blur", move |_event| {
                let mut g = game.borrow_mut();
                g.driver.suspend();
                let mute = g.settings.mute_on_blur;
                g.audio.set_blurred(mute);
            });
        }
        {
            let game = game.clone();
            handle.listen(&window, "focus", move |_event| {
                game.borrow_mut().audio.set_blurred(false);
            });
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, raf_id: Rc<Cell<Option<i32>>>) {
        let Ok(window) = browser::window() else {
            return;
        };
        let next_id = raf_id.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, next_id, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => raf_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, raf_id: Rc<Cell<Option<i32>>>, time: f64) {
        raf_id.set(None);
        let running = {
            let mut g = game.borrow_mut();
            g.frame(time);
            g.driver.is_running()
        };
        if running {
            request_animation_frame(game, raf_id);
        }
    }

    /// Cancel the frame loop and release every listener
    pub fn stop() {
        if let Some(handle) = HANDLE.with(|slot| slot.borrow_mut().take()) {
            handle.teardown();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Circuit Runner failed to start: {:#}", e);
    }
}

/// Tear the game down (page navigation, host component unmount)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop_game() {
    wasm_game::stop();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run: a scripted player holds right and hops every half second
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use circuit_runner::persistence::MemoryStore;
    use circuit_runner::platform::{LoopDriver, seed_from_clock, today};
    use circuit_runner::sim::{GameEvent, GamePhase, Session};
    use circuit_runner::{Leaderboard, LeaderboardEntry};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(seed_from_clock);
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);

    log::info!("Circuit Runner (headless) seed={} seconds={}", seed, seconds);

    let mut driver = LoopDriver::new(Session::with_seed(seed));
    driver.start_or_retry();

    let frame_ms = 1000.0 / 60.0;
    let frames = (seconds * 60.0) as u64;
    let mut final_run = None;

    for i in 0..frames {
        let now = i as f64 * frame_ms;
        driver.input_mut().set_stick(1.0);
        if i % 30 == 0 {
            driver.input_mut().request_jump();
        }
        let Some(outcome) = driver.frame(now) else {
            break;
        };
        for event in &outcome.events {
            match event {
                GameEvent::LevelStarted { level } => log::info!("Reached level {}", level),
                GameEvent::GameOver { score, level } => final_run = Some((*score, *level)),
                _ => log::debug!("{:?}", event),
            }
        }
        if driver.session().state.phase == GamePhase::GameOver && final_run.is_some() {
            break;
        }
    }
    driver.stop();

    let state = &driver.session().state;
    let (score, level) = final_run.unwrap_or((state.score, state.level));
    println!(
        "seed {}: score {} on level {} with {} lives left",
        seed, score, level, state.lives
    );

    let store = MemoryStore::new();
    let mut board = Leaderboard::read(&store);
    if let Some(rank) = board.record(&store, LeaderboardEntry::new("Headless", score, level, &today())) {
        println!("leaderboard rank {}", rank);
    }
}
