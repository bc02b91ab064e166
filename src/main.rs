//! Office Arcade entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use office_arcade::platform::{FrameTicket, LocalStore};
    use office_arcade::renderer::{CanvasPainter, DrawList};
    use office_arcade::sim::{Direction, GameEvent, InputEvent, Key};
    use office_arcade::{Cabinet, GameId, MountConfig, Progression};

    const SPRITES: [&str; 3] = ["assets/chai-cup.png", "assets/car.png", "assets/truck.png"];

    /// Everything the page callbacks share
    struct App {
        cabinet: Cabinet<LocalStore>,
        painter: CanvasPainter,
        canvas: HtmlCanvasElement,
        progress: Progression,
    }

    impl App {
        fn sync_surface(&mut self) {
            let w = self.canvas.client_width() as f32;
            let h = self.canvas.client_height() as f32;
            self.cabinet.set_surface(w, h);
        }

        /// Pointer position relative to the canvas
        fn touch_point(&self, event: &TouchEvent) -> Option<(f32, f32)> {
            let touch = event.touches().get(0)?;
            let rect = self.canvas.get_bounding_client_rect();
            Some((
                touch.client_x() as f32 - rect.left() as f32,
                touch.client_y() as f32 - rect.top() as f32,
            ))
        }

        fn render(&self) -> DrawList {
            if let Some(window) = web_sys::window() {
                self.painter.resize(window.device_pixel_ratio());
            }
            let list = self.cabinet.draw();
            self.painter.paint(&list);
            list
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_class(document: &Document, id: &str, class: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(app: &App, list: &DrawList) {
        let Some(document) = document() else {
            return;
        };
        for item in &list.hud {
            let selector = format!("#hud-{} .hud-value", item.key);
            if let Some(el) = document.query_selector(&selector).ok().flatten() {
                el.set_text_content(Some(&item.value));
            }
        }
        set_text(&document, "progress-total", &app.progress.total().to_string());

        let paused = app.cabinet.is_paused();
        set_class(&document, "pause-menu", if paused { "" } else { "hidden" });
    }

    fn show_game_over(app: &App) {
        let Some(document) = document() else {
            return;
        };
        let session = app.cabinet.session();
        set_text(&document, "final-score", &session.score().to_string());
        set_text(
            &document,
            "final-reward",
            &session.reward().unwrap_or(0).to_string(),
        );
        if let Some(best) = app.cabinet.best() {
            set_text(&document, "best-score", &best.to_string());
        }
        set_class(&document, "game-over", "");
    }

    fn cancel_frame(handle: Option<i32>) {
        if let (Some(handle), Some(window)) = (handle, web_sys::window()) {
            let _ = window.cancel_animation_frame(handle);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Office Arcade starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Game picked by the URL hash, e.g. `#lane-racer`
        let hash = window.location().hash().unwrap_or_default();
        let id = GameId::from_slug(hash.trim_start_matches('#')).unwrap_or(GameId::ChaiCatcher);

        let seed = js_sys::Date::now() as u64;
        let cabinet = match Cabinet::mount(id, &MountConfig::default(), LocalStore, seed) {
            Ok(cabinet) => cabinet,
            Err(e) => {
                log::error!("Could not mount {}: {}", id.name(), e);
                return;
            }
        };

        let Some(mut painter) = CanvasPainter::new(canvas.clone()) else {
            log::error!("Canvas 2D context unavailable");
            return;
        };
        for src in SPRITES {
            painter.preload(src);
        }
        painter.resize(window.device_pixel_ratio());

        set_text(&document, "game-title", id.name());
        log::info!("{} mounted with seed: {}", id.name(), seed);

        let app = Rc::new(RefCell::new(App {
            cabinet,
            painter,
            canvas: canvas.clone(),
            progress: Progression::new(),
        }));
        app.borrow_mut().sync_surface();

        setup_input_handlers(&canvas, app.clone());
        setup_buttons(app.clone());
        setup_auto_pause(app.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        start(app);
        log::info!("Office Arcade running!");
    }

    fn start(app: Rc<RefCell<App>>) {
        let stale = app.borrow_mut().cabinet.start();
        cancel_frame(stale);
        if let Some(document) = document() {
            set_class(&document, "game-over", "hidden");
        }
        request_animation_frame(app);
    }

    fn dispatch(app: &Rc<RefCell<App>>, event: InputEvent) {
        let mut a = app.borrow_mut();
        a.sync_surface();
        a.cabinet.input(event);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                dispatch(&app, InputEvent::PointerMove { x, y });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down (tap games, runner jump)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                dispatch(&app, InputEvent::PointerDown { x, y });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let point = app.borrow().touch_point(&event);
                if let Some((x, y)) = point {
                    dispatch(&app, InputEvent::PointerMove { x, y });
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let point = app.borrow().touch_point(&event);
                if let Some((x, y)) = point {
                    dispatch(&app, InputEvent::PointerDown { x, y });
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    event.prevent_default();
                    dispatch(&app, InputEvent::KeyDown(key));
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    dispatch(&app, InputEvent::KeyUp(key));
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen lane buttons
        let Some(document) = document() else {
            return;
        };
        for (id, dir) in [("btn-left", Direction::Left), ("btn-right", Direction::Right)] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    dispatch(&app, InputEvent::Button(dir));
                });
                let _ = btn
                    .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let ticket = app.borrow().cabinet.ticket();
        let next = app.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, ticket, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => app.borrow_mut().cabinet.arm(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, ticket: FrameTicket, time: f64) {
        {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.sync_surface();
            let Some(events) = a
                .cabinet
                .frame(ticket, time, js_sys::Date::now(), &mut a.progress)
            else {
                // Stale frame from before a restart or exit
                return;
            };

            let list = a.render();
            update_hud(a, &list);
            if events.iter().any(|e| matches!(e, GameEvent::Ended { .. })) {
                show_game_over(a);
            }
            if !a.cabinet.wants_frame() {
                return;
            }
        }

        request_animation_frame(app);
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        let Some(document) = document() else {
            return;
        };

        for id in ["restart-btn", "start-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    start(app.clone());
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().cabinet.set_paused(false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Back to the arcade
        if let Some(btn) = document.get_element_by_id("back-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let stale = {
                    let mut guard = app.borrow_mut();
                    let a = &mut *guard;
                    a.cabinet.exit(&mut a.progress)
                };
                cancel_frame(stale);
                if let Some(document) = document() {
                    set_class(&document, "hud", "hidden");
                    set_class(&document, "menu", "");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    if a.cabinet.session().is_active() && !a.cabinet.is_paused() {
                        a.cabinet.set_paused(true);
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
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.cabinet.session().is_active() && !a.cabinet.is_paused() {
                    a.cabinet.set_paused(true);
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless run: `office-arcade [game] [seed]`
///
/// The chai catcher gets a simple bot that chases the lowest cup; the other
/// games run untouched until they end or five minutes of game time pass.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use office_arcade::consts::TICKS_PER_SECOND;
    use office_arcade::games::catcher::Falling;
    use office_arcade::games::{Arcade, ArcadeGame, ChaiCatcher};
    use office_arcade::sim::InputEvent;
    use office_arcade::{DifficultyPreset, GameId, HostShell, MountConfig, Progression, Settings};

    env_logger::init();
    log::info!("Office Arcade (native) starting...");
    log::info!("The playable version runs in the browser - build for wasm32 with `trunk serve`");

    let mut args = std::env::args().skip(1);
    let id = args
        .next()
        .and_then(|slug| GameId::from_slug(&slug))
        .unwrap_or(GameId::ChaiCatcher);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let limit = 300 * TICKS_PER_SECOND;
    let mut progress = Progression::new();

    if id == GameId::ChaiCatcher {
        let mut game = Arcade::new(id, ChaiCatcher::new(DifficultyPreset::Normal), seed);
        game.start();
        for _ in 0..limit {
            let state = game.state();
            let target = state
                .entities
                .iter()
                .filter(|e| matches!(e.kind, Falling::Chai | Falling::Boss))
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x);
            if let Some(x) = target {
                game.input(InputEvent::PointerMove { x, y: 90.0 });
            }
            game.step();
            if !game.session().is_active() {
                break;
            }
        }
        report(&mut game, &mut progress);
    } else {
        let mut game = match id.mount(&MountConfig::with_seed(seed), seed, &Settings::default()) {
            Ok(game) => game,
            Err(e) => {
                log::error!("Could not mount {}: {}", id.name(), e);
                return;
            }
        };
        game.start();
        for _ in 0..limit {
            game.step();
            if !game.session().is_active() {
                break;
            }
        }
        report(game.as_mut(), &mut progress);
    }

    fn report(game: &mut dyn ArcadeGame, progress: &mut Progression) {
        let session = game.session();
        let reason = session.termination().map_or("still running", |r| r.as_str());
        println!(
            "{}: score {} after {}s ({})",
            game.id().name(),
            session.score(),
            session.elapsed_secs(),
            reason
        );
        if let Some(reward) = game.take_reward() {
            progress.on_complete(game.id(), reward);
        }
        println!("Reward total: {}", progress.total());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
