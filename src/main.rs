//! Ember Hunt entry point
//!
//! In the browser this wires the camera feed, buttons, pointer and
//! orientation listeners to the session and runs the frame loop. Natively it
//! plays one headless game with the autopilot and logs the status lines.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{
        DeviceOrientationEvent, HtmlButtonElement, HtmlCanvasElement, HtmlVideoElement,
        KeyboardEvent, MediaStream, MediaStreamConstraints, MediaStreamTrack, PointerEvent,
    };

    use ember_hunt::consts::*;
    use ember_hunt::renderer::{CanvasOverlay, build_frame};
    use ember_hunt::sim::{
        Autopilot, GameSession, OrientationSample, PointerInput, TickInput, screen_to_ndc, tick,
    };
    use ember_hunt::{Settings, status};

    // iOS asks for motion permission; other browsers resolve straight away
    #[wasm_bindgen(inline_js = "
        export function request_orientation_permission() {
            if (typeof DeviceOrientationEvent === 'undefined') {
                return Promise.reject(new Error('DeviceOrientationEvent unsupported'));
            }
            if (typeof DeviceOrientationEvent.requestPermission === 'function') {
                return DeviceOrientationEvent.requestPermission().then((res) => {
                    if (res !== 'granted') throw new Error('DeviceOrientation permission denied');
                });
            }
            return Promise.resolve();
        }
    ")]
    extern "C" {
        fn request_orientation_permission() -> js_sys::Promise;
    }

    /// DOM elements the game talks to
    #[derive(Clone)]
    struct Dom {
        video: HtmlVideoElement,
        btn_start: HtmlButtonElement,
        btn_stop: HtmlButtonElement,
        btn_place: HtmlButtonElement,
        status: web_sys::Element,
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        overlay: CanvasOverlay,
        dom: Dom,
        /// Demo bot, toggled with "i"
        autopilot: Option<Autopilot>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        stream: Option<MediaStream>,
        /// Motion permission has been asked for (at most once per page)
        orientation_requested: bool,
    }

    impl Game {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(MAX_FRAME_DT);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                if let Some(bot) = &mut self.autopilot {
                    let bot_input = bot.next_input(&mut self.session);
                    self.input.pointer.extend(bot_input.pointer);
                }
                tick(&mut self.session, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Input is applied once, on the first substep
                self.input.clear();
            }
        }

        fn render(&self) {
            let (w, h) = self.overlay.size;
            self.overlay.draw(&build_frame(&self.session, w, h));
        }

        /// Push event text and button state into the DOM
        fn update_hud(&mut self) {
            let events = self.session.drain_events();
            if let Some(line) = status::latest_line(&events) {
                self.dom.status.set_text_content(Some(&line));
            }

            let feed_on = self.stream.is_some();
            self.dom.btn_start.set_disabled(feed_on);
            self.dom.btn_stop.set_disabled(!feed_on);
            self.dom
                .btn_place
                .set_disabled(!status::place_button_enabled(&self.session));
            self.dom
                .btn_place
                .set_text_content(Some(status::place_button_label(&self.session)));
        }

        fn resize(&mut self) {
            self.overlay.fit_to_client();
            let (w, h) = self.overlay.size;
            self.session.set_viewport(w, h);
        }

        /// Pointer position relative to the overlay, in NDC
        fn pointer_ndc(&self, event: &PointerEvent) -> glam::Vec2 {
            let (w, h) = self.overlay.size;
            screen_to_ndc(event.offset_x() as f32, event.offset_y() as f32, w, h)
        }
    }

    fn element<T: JsCast>(document: &web_sys::Document, id: &str) -> Result<T, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{}", id)))?
            .dyn_into::<T>()
            .map_err(|_| JsValue::from_str(&format!("#{} has the wrong element type", id)))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Ember Hunt starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let dom = Dom {
            video: element(&document, "video")?,
            btn_start: element(&document, "btnStart")?,
            btn_stop: element(&document, "btnStop")?,
            btn_place: element(&document, "btnPlace")?,
            status: element(&document, "status")?,
        };
        let canvas: HtmlCanvasElement = element(&document, "three")?;
        let overlay = CanvasOverlay::new(canvas.clone())?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let mut session = GameSession::with_settings(seed, settings);
        let (w, h) = overlay.size;
        session.set_viewport(w, h);
        log::info!("Session initialized with seed: {}", session.seed);

        if window.navigator().media_devices().is_err() {
            dom.status
                .set_text_content(Some("This browser does not support getUserMedia"));
            dom.btn_start.set_disabled(true);
        }

        let game = Rc::new(RefCell::new(Game {
            session,
            overlay,
            dom,
            autopilot: None,
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            stream: None,
            orientation_requested: false,
        }));

        setup_buttons(game.clone());
        setup_pointer_handlers(&canvas, game.clone());
        setup_window_handlers(game.clone());

        request_animation_frame(game);

        log::info!("Ember Hunt running!");
        Ok(())
    }

    fn on_click(button: &HtmlButtonElement, mut handler: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let dom = game.borrow().dom.clone();

        {
            let game = game.clone();
            on_click(&dom.btn_start, move || spawn_local(start_camera(game.clone())));
        }
        {
            let game = game.clone();
            on_click(&dom.btn_stop, move || stop_camera(&mut game.borrow_mut()));
        }
        on_click(&dom.btn_place, move || {
            // iOS only shows the motion prompt from inside a user gesture
            let permission = {
                let mut g = game.borrow_mut();
                let first = !g.orientation_requested;
                g.orientation_requested = true;
                g.session.prepare_placement();
                first.then(request_orientation_permission)
            };
            if let Some(permission) = permission {
                spawn_local(enable_floor_detection(game.clone(), permission));
            }
        });
    }

    async fn acquire_stream(video: &HtmlVideoElement) -> Result<MediaStream, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let devices = window.navigator().media_devices()?;

        let ideal = |value: JsValue| -> Result<js_sys::Object, JsValue> {
            let obj = js_sys::Object::new();
            js_sys::Reflect::set(&obj, &"ideal".into(), &value)?;
            Ok(obj)
        };
        let video_constraints = js_sys::Object::new();
        js_sys::Reflect::set(&video_constraints, &"facingMode".into(), &ideal("environment".into())?)?;
        js_sys::Reflect::set(&video_constraints, &"width".into(), &ideal(1280.into())?)?;
        js_sys::Reflect::set(&video_constraints, &"height".into(), &ideal(720.into())?)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::FALSE);
        constraints.set_video(&video_constraints);

        let stream: MediaStream =
            JsFuture::from(devices.get_user_media_with_constraints(&constraints)?)
                .await?
                .dyn_into()?;
        video.set_src_object(Some(&stream));
        let played = match video.play() {
            Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = played {
            stop_tracks(&stream);
            video.set_src_object(None);
            return Err(err);
        }
        Ok(stream)
    }

    async fn start_camera(game: Rc<RefCell<Game>>) {
        let video = {
            let g = game.borrow();
            if g.stream.is_some() {
                return;
            }
            g.dom.video.clone()
        };

        match acquire_stream(&video).await {
            Ok(stream) => {
                let mut g = game.borrow_mut();
                if g.stream.is_some() {
                    // Another start finished first; keep its stream on screen
                    log::warn!("Camera already running, dropping the duplicate stream");
                    stop_tracks(&stream);
                    video.set_src_object(g.stream.as_ref());
                    let _ = video.play();
                    return;
                }
                g.stream = Some(stream);
                g.session.reset();
                g.session.start_feed();
            }
            Err(err) => {
                {
                    let g = game.borrow();
                    if g.stream.is_some() {
                        log::warn!("Duplicate camera start failed: {:?}", err);
                        video.set_src_object(g.stream.as_ref());
                        let _ = video.play();
                        return;
                    }
                }
                let name = js_sys::Reflect::get(&err, &"name".into())
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_else(|| "Error".to_string());
                game.borrow_mut().session.feed_failed(name.clone());
                if let Some(window) = web_sys::window() {
                    let _ = window.alert_with_message(&format!(
                        "Camera failed to start: {}\n\nCheck that:\n1) the page is served over HTTPS\n2) camera permission is allowed",
                        name
                    ));
                }
            }
        }
    }

    fn stop_tracks(stream: &MediaStream) {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }

    fn stop_camera(game: &mut Game) {
        let Some(stream) = game.stream.take() else {
            return;
        };
        stop_tracks(&stream);
        game.dom.video.set_src_object(None);
        game.session.stop_feed();
    }

    /// Wait for the motion permission, then feed orientation samples to the session
    async fn enable_floor_detection(game: Rc<RefCell<Game>>, permission: js_sys::Promise) {
        match JsFuture::from(permission).await {
            Ok(_) => {
                let Some(window) = web_sys::window() else {
                    return;
                };
                log::info!("Listening for device orientation");
                let closure = {
                    let game = game.clone();
                    Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
                        game.borrow_mut().input.orientation = Some(OrientationSample {
                            alpha: event.alpha().map(|v| v as f32),
                            beta: event.beta().map(|v| v as f32),
                            gamma: event.gamma().map(|v| v as f32),
                        });
                    })
                };
                let _ = window.add_event_listener_with_callback_and_bool(
                    "deviceorientation",
                    closure.as_ref().unchecked_ref(),
                    true,
                );
                closure.forget();
            }
            Err(err) => {
                log::warn!("Orientation unavailable: {:?}", err);
                game.borrow_mut().session.orientation_unavailable();
            }
        }
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let listen = |name: &str, handler: Box<dyn FnMut(PointerEvent)>| {
            let closure = Closure::<dyn FnMut(PointerEvent)>::wrap(handler);
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        };

        {
            let game = game.clone();
            let canvas = canvas.clone();
            listen(
                "pointerdown",
                Box::new(move |event: PointerEvent| {
                    event.prevent_default();
                    let _ = canvas.set_pointer_capture(event.pointer_id());
                    let mut g = game.borrow_mut();
                    let ndc = g.pointer_ndc(&event);
                    g.input.pointer.push(PointerInput::Down(ndc));
                }),
            );
        }
        {
            let game = game.clone();
            listen(
                "pointermove",
                Box::new(move |event: PointerEvent| {
                    let mut g = game.borrow_mut();
                    let ndc = g.pointer_ndc(&event);
                    g.input.pointer.push(PointerInput::Move(ndc));
                }),
            );
        }
        {
            let game = game.clone();
            listen(
                "pointerup",
                Box::new(move |_event: PointerEvent| {
                    game.borrow_mut().input.pointer.push(PointerInput::Up);
                }),
            );
        }
        listen(
            "pointercancel",
            Box::new(move |_event: PointerEvent| {
                game.borrow_mut().input.pointer.push(PointerInput::Cancel);
            }),
        );
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "i" | "I" => {
                    g.autopilot = if g.autopilot.is_some() {
                        None
                    } else {
                        Some(Autopilot::default())
                    };
                    log::info!("Autopilot: {}", g.autopilot.is_some());
                }
                "r" | "R" => {
                    g.session.reset();
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(err) = wasm_game::run().await {
        log::error!("Ember Hunt failed to start: {:?}", err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ember_hunt::consts::SIM_DT;
    use ember_hunt::sim::{Autopilot, GameSession, PhaseKind, tick};
    use ember_hunt::{Settings, status};

    env_logger::init();
    log::info!("Ember Hunt (native) starting...");
    log::info!("Native mode runs a headless autopilot game - run with `trunk serve` for the camera version");

    let settings = Settings::load();
    if std::env::args().any(|a| a == "--print-settings") {
        match settings.to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => log::error!("Could not encode settings: {}", err),
        }
        return;
    }
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut session = GameSession::with_settings(seed, settings);
    // No sensor natively: the default camera already looks at the floor
    session.orientation_unavailable();

    let mut bot = if std::env::args().any(|a| a == "--reckless") {
        Autopilot::reckless()
    } else {
        Autopilot::default()
    };

    const MAX_FRAMES: u32 = 60 * 180;
    for _ in 0..MAX_FRAMES {
        let input = bot.next_input(&mut session);
        tick(&mut session, &input, SIM_DT);
        for event in session.drain_events() {
            if let Some(line) = status::status_line(&event) {
                println!("[{:7.2}s] {}", session.time, line);
            }
        }
        if session.kind() == PhaseKind::Done {
            break;
        }
    }

    log::info!(
        "Finished in phase {:?} after {:.1}s (seed {})",
        session.kind(),
        session.time,
        session.seed
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
