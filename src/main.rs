//! Danmaku entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use danmaku::Settings;
    use danmaku::audio::AudioManager;
    use danmaku::platform::{FrameClock, KeyState};
    use danmaku::sim::{GameEvent, GamePhase, GameState, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        keys: KeyState,
        clock: FrameClock,
        audio: AudioManager,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: GameState::new(seed),
                keys: KeyState::new(),
                clock: FrameClock::new(),
                audio: AudioManager::new(settings),
            }
        }

        /// Run one simulation step and hand its events to audio
        fn update(&mut self, time_ms: f64) {
            let dt = self.clock.advance(time_ms / 1000.0);
            let input = self.keys.to_input();
            tick(&mut self.state, &input, dt);

            // Paused time never reaches the simulation
            if self.state.phase != GamePhase::Playing {
                self.clock.discard();
            }

            for event in self.state.drain_events() {
                if let GameEvent::Sound(cue) = event {
                    self.audio.play(cue);
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let set_text = |id: &str, text: String| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            };
            set_text("hud-score", self.state.score.to_string());
            set_text("hud-life", self.state.life.to_string());
            set_text("hud-wave", self.state.level.to_string());
            set_text("hud-meter", self.state.meter.to_string());

            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            show("title-screen", self.state.phase == GamePhase::Title);
            show("pause-menu", self.state.phase == GamePhase::Paused);
            show("game-over", self.state.phase == GamePhase::GameOver);
            show("meter-charged", self.state.meter_charged);
            show("desaturate", self.state.desaturated);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Danmaku running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let code = event.code();
                if down && code == "KeyM" && !event.repeat() {
                    toggle_mute(&mut g.audio);
                    return;
                }
                if g.keys.set(&code, down) {
                    event.prevent_default();
                    // First gesture unlocks the audio context
                    g.audio.resume();
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Mute preference survives reloads
    fn toggle_mute(audio: &mut AudioManager) {
        let mut settings = audio.settings().clone();
        let muted = settings.toggle_mute();
        settings.save();
        audio.set_settings(settings);
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
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
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Playing {
                        g.state.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
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
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.keys.release_all();
                g.audio.set_blurred(true);
                if g.state.phase == GamePhase::Playing {
                    g.state.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus back: sound returns, the game stays paused until the player resumes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_blurred(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Danmaku (native) starting...");
    log::info!("Native mode runs a headless autoplay session - serve the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let tuning = match std::env::args().nth(2) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => danmaku::Tuning::default(),
    };

    autoplay(seed, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<danmaku::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(danmaku::Tuning::from_json(&json)?)
}

/// Scripted player: sweep side to side with fire held, slow time whenever
/// the meter allows. Runs until game over or five simulated minutes.
#[cfg(not(target_arch = "wasm32"))]
fn autoplay(seed: u64, tuning: danmaku::Tuning) {
    use danmaku::consts::{ARENA_WIDTH, FRAME_DT, METER_CHARGED};
    use danmaku::sim::{GameEvent, GamePhase, GameState, SoundCue, TickInput, tick};

    const MAX_FRAMES: u64 = 60 * 60 * 5;

    let mut state = GameState::with_tuning(seed, tuning);
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, FRAME_DT);

    let mut heading_right = true;
    let mut grazes = 0u32;
    let mut kills = 0u32;
    let mut frames = 0u64;

    while state.phase == GamePhase::Playing && frames < MAX_FRAMES {
        if state.ship.pos.x > ARENA_WIDTH - 60.0 {
            heading_right = false;
        } else if state.ship.pos.x < 60.0 {
            heading_right = true;
        }
        let input = TickInput {
            left: !heading_right,
            right: heading_right,
            fire: true,
            special: state.meter >= METER_CHARGED,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        frames += 1;

        for event in state.drain_events() {
            match event {
                GameEvent::Sound(SoundCue::Graze) => grazes += 1,
                GameEvent::Sound(SoundCue::Explode) => kills += 1,
                _ => {}
            }
        }
    }

    log::info!(
        "Autoplay finished after {:.1}s: {:?}, wave {}, score {}, life {}",
        frames as f32 * FRAME_DT,
        state.phase,
        state.level,
        state.score,
        state.life
    );
    println!(
        "seed {} | wave {} | score {} | kills {} | grazes {} | {:?}",
        seed, state.level, state.score, kills, grazes, state.phase
    );
}
