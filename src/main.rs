//! Gift Shooter entry point
//!
//! In the browser: sets up the canvas, WebGPU, DOM input and the animation
//! frame loop. Natively: plays one headless session with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlSelectElement, KeyboardEvent, TouchEvent, Window,
    };

    use gift_shooter::audio::{AudioService, WebAudioSink};
    use gift_shooter::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
    use gift_shooter::input::{InputSource, TouchZone, key_event};
    use gift_shooter::renderer::{RenderState, SceneOptions, build_frame};
    use gift_shooter::sim::{SessionPhase, SessionSummary, Viewport};
    use gift_shooter::{FrameStatus, GameSession, QualityPreset, RenderError, Settings};

    /// Game instance holding all state
    struct Game {
        session: GameSession<WebAudioSink>,
        render_state: Option<RenderState>,
        settings: Settings,
        scene: SceneOptions,
        /// Starfield twinkle
        star_rng: Pcg32,
        canvas: HtmlCanvasElement,
        frame_pending: bool,
        last_hud: Option<SessionSummary>,
    }

    impl Game {
        fn start(&mut self) {
            self.session.start(now_ms());
            log::info!("New session started");
        }

        /// Match the canvas backing store to its CSS size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let size = canvas_size(&window, &self.canvas);
            self.canvas.set_width(size.physical.0);
            self.canvas.set_height(size.physical.1);
            self.session.resize(size.logical.0, size.logical.1);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(size.physical.0, size.physical.1, size.logical);
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = build_frame(self.session.state(), time, &self.scene, &mut self.star_rng);
            match render_state.render(&vertices) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let summary = self.session.summary();
            if self.last_hud == Some(summary) {
                return;
            }
            self.last_hud = Some(summary);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "#hud-score .hud-value", &summary.score.to_string());
            set_text(&document, "#hud-time .hud-value", &summary.time_left.to_string());
            set_text(&document, "#hud-combo .hud-value", &format!("x{}", summary.combo));
            set_hidden(&document, "hud-combo", !summary.combo_active);

            set_hidden(&document, "start-screen", summary.phase != SessionPhase::NotStarted);
            set_hidden(&document, "hud", summary.phase == SessionPhase::NotStarted);
            set_hidden(&document, "touch-controls", summary.phase != SessionPhase::Playing);
            set_hidden(&document, "game-over", summary.phase != SessionPhase::Over);

            if let (Some(final_score), Some(el)) =
                (summary.final_score, document.get_element_by_id("final-score"))
            {
                el.set_text_content(Some(&final_score.to_string()));
            }

            if let Some(hud) = document.get_element_by_id("hud") {
                match serde_json::to_string(&summary) {
                    Ok(json) => {
                        let _ = hud.set_attribute("data-summary", &json);
                    }
                    Err(e) => log::warn!("HUD summary not serializable: {}", e),
                }
            }
        }

        fn update_mute_button(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(btn) = document.get_element_by_id("mute-btn") {
                let muted = self.session.audio().is_muted();
                btn.set_text_content(Some(if muted { "Sound: off" } else { "Sound: on" }));
                let _ = btn.set_attribute("aria-pressed", if muted { "true" } else { "false" });
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    struct CanvasSize {
        logical: (f32, f32),
        physical: (u32, u32),
    }

    fn canvas_size(window: &Window, canvas: &HtmlCanvasElement) -> CanvasSize {
        let dpr = window.device_pixel_ratio().max(1.0);
        let mut w = canvas.client_width() as f32;
        let mut h = canvas.client_height() as f32;
        if w <= 0.0 || h <= 0.0 {
            w = DEFAULT_VIEWPORT_WIDTH;
            h = DEFAULT_VIEWPORT_HEIGHT;
        }
        CanvasSize {
            logical: (w, h),
            physical: ((w as f64 * dpr) as u32, (h as f64 * dpr) as u32),
        }
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        size: &CanvasSize,
    ) -> Result<RenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| RenderError::CreateSurface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::NoAdapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(
            surface,
            &adapter,
            size.physical.0,
            size.physical.1,
            size.logical,
        )
        .await
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Gift Shooter starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no #canvas element"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("#canvas is not a canvas"))?;

        let size = canvas_size(&window, &canvas);
        canvas.set_width(size.physical.0);
        canvas.set_height(size.physical.1);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let audio = AudioService::new(WebAudioSink::new(), settings.audio_config());
        let session = GameSession::new(seed, Viewport::new(size.logical.0, size.logical.1), audio);

        // Without a GPU the game keeps running; frames are skipped
        let render_state = match init_renderer(&canvas, &size).await {
            Ok(render_state) => Some(render_state),
            Err(e) => {
                log::error!("Rendering disabled: {}", e);
                None
            }
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state,
            scene: SceneOptions::from(&settings),
            settings,
            star_rng: Pcg32::seed_from_u64(seed.rotate_left(17)),
            canvas,
            frame_pending: false,
            last_hud: None,
        }));

        setup_keyboard(&window, game.clone());
        setup_touch_controls(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_quality_select(&document, game.clone());
        setup_window_events(&window, game.clone());

        // Paint the idle scene behind the start screen
        {
            let mut g = game.borrow_mut();
            g.render(now_ms());
            g.update_hud();
            g.update_mute_button();
        }

        log::info!("Gift Shooter ready (seed {})", seed);
        Ok(())
    }

    fn setup_keyboard(window: &Window, game: Rc<RefCell<Game>>) {
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                if let Some(input) = key_event(&event.key(), pressed) {
                    event.prevent_default();
                    game.borrow_mut()
                        .session
                        .handle_input(input, InputSource::Keyboard);
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_controls(document: &Document, game: Rc<RefCell<Game>>) {
        for (zone, id) in TouchZone::ALL {
            let Some(el) = document.get_element_by_id(id) else {
                log::warn!("Touch control #{} missing", id);
                continue;
            };
            for (event_name, pressed) in [
                ("touchstart", true),
                ("touchend", false),
                ("touchcancel", false),
            ] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    if let Some(input) = zone.event(pressed) {
                        game.borrow_mut()
                            .session
                            .handle_input(input, InputSource::Touch);
                    }
                });
                let _ = el
                    .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        // Start and restart both begin a fresh session
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start();
                request_animation_frame(game.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let muted = g.session.toggle_mute();
                g.settings.muted = muted;
                g.settings.save();
                g.update_mute_button();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_quality_select(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(select) = document
            .get_element_by_id("quality-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        select.set_value(game.borrow().settings.quality.as_str());

        let select_clone = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(preset) = QualityPreset::parse(&select_clone.value()) else {
                log::warn!("Unknown quality preset: {}", select_clone.value());
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.quality = preset;
            g.scene = SceneOptions::from(&g.settings);
            g.settings.save();
            log::info!("Quality set to {}", preset.as_str());
            if !g.session.is_running() {
                g.render(now_ms());
            }
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_window_events(window: &Window, game: Rc<RefCell<Game>>) {
        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.resize();
                // Repaint a stopped scene so it matches the new size
                if !g.session.is_running() {
                    g.render(now_ms());
                }
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside): release held keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.session.release_inputs();
                if g.settings.mute_on_blur {
                    g.session.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let muted = g.settings.muted;
                g.session.set_muted(muted);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Leaving the page tears the session down
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.teardown();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.frame_pending {
                return;
            }
            g.frame_pending = true;
        }
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
        let status = {
            let mut g = game.borrow_mut();
            g.frame_pending = false;
            let status = g.session.advance(time);
            g.render(time);
            g.update_hud();
            status
        };

        // A stopped session stops requesting frames until the next start
        if status == FrameStatus::Running {
            request_animation_frame(game);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use gift_shooter::audio::{AudioService, SilentSink};
    use gift_shooter::input::{Direction, InputEvent, InputSource};
    use gift_shooter::renderer::{SceneOptions, build_frame};
    use gift_shooter::sim::{GameState, SessionSummary, Viewport};
    use gift_shooter::{FrameStatus, GameSession, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Frames between shots while lined up
    const FIRE_EVERY: u64 = 10;

    /// Horizontal center of the lowest gift still above the avatar
    fn target_x(state: &GameState) -> Option<f32> {
        state
            .gifts
            .iter()
            .filter(|g| !g.is_hit() && g.pos.y + g.height < state.avatar.pos.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|g| g.center().x)
    }

    fn steer(state: &GameState) -> Option<Direction> {
        let dx = target_x(state)? - state.avatar.muzzle().x;
        if dx > 6.0 {
            Some(Direction::Right)
        } else if dx < -6.0 {
            Some(Direction::Left)
        } else {
            None
        }
    }

    fn lined_up(state: &GameState) -> bool {
        target_x(state).is_some_and(|x| (x - state.avatar.muzzle().x).abs() <= 18.0)
    }

    /// Play one full session at 60 frames per second
    pub fn run(seed: u64, settings: &Settings) -> SessionSummary {
        let audio = AudioService::new(SilentSink, settings.audio_config());
        let mut session = GameSession::new(seed, Viewport::default(), audio);
        let scene = SceneOptions::from(settings);
        let mut star_rng = Pcg32::seed_from_u64(seed.rotate_left(17));

        let mut now = 0.0;
        let mut frame: u64 = 0;
        let mut held: Option<Direction> = None;
        session.start(now);

        loop {
            now += FRAME_MS;
            frame += 1;

            let wanted = steer(session.state());
            if wanted != held {
                if let Some(dir) = held {
                    session.handle_input(InputEvent::MoveStop(dir), InputSource::Keyboard);
                }
                if let Some(dir) = wanted {
                    session.handle_input(InputEvent::MoveStart(dir), InputSource::Keyboard);
                }
                held = wanted;
            }
            if frame % FIRE_EVERY == 0 && lined_up(session.state()) {
                session.queue_fire();
            }

            let status = session.advance(now);

            if frame % 600 == 0 {
                let vertices = build_frame(session.state(), now, &scene, &mut star_rng);
                log::info!(
                    "t={:>2}s score={} gifts={} vertices={}",
                    (now / 1000.0) as u32,
                    session.state().score,
                    session.state().gifts.len(),
                    vertices.len()
                );
            }

            if status == FrameStatus::Stopped {
                break;
            }
        }

        session.summary()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use gift_shooter::{QualityPreset, Settings};

    env_logger::init();
    log::info!("Gift Shooter (native) starting...");
    log::info!("The playable build runs in the browser; running a headless session instead");

    // Optional first argument picks a quality preset for the sampled frames
    let settings = match std::env::args().nth(1) {
        Some(arg) => match QualityPreset::parse(&arg) {
            Some(preset) => Settings::from_preset(preset),
            None => {
                log::warn!("Unknown quality preset {:?}, using saved settings", arg);
                Settings::load()
            }
        },
        None => Settings::load(),
    };
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let summary = headless::run(seed, &settings);
    log::info!("Session over, final score {}", summary.score);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
