pub mod core;

#[cfg(target_arch = "wasm32")]
mod constants;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod overlay;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod webcam;

#[cfg(target_arch = "wasm32")]
pub use web_entry::start;

#[cfg(target_arch = "wasm32")]
mod web_entry {
    use crate::constants::*;
    use crate::core::{Viewer, ViewerConfig};
    use crate::webcam::SessionSlot;
    use crate::{dom, events, frame, overlay, webcam};
    use instant::Instant;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys as web;

    fn load_config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        let pairs = dom::query_pairs();
        let skipped = config.apply_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if !pairs.is_empty() {
            log::info!(
                "[config] {} query option(s), {} ignored",
                pairs.len(),
                skipped.len()
            );
        }
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("[config] {}; using defaults", e);
                ViewerConfig::default()
            }
        }
    }

    fn wire_canvas_resize(canvas: &web::HtmlCanvasElement, viewer: &Rc<RefCell<Viewer>>) {
        let (w, h) = dom::sync_canvas_backing_size(canvas);
        viewer.borrow_mut().resize(w, h);
        let canvas_resize = canvas.clone();
        let viewer_resize = viewer.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            let (w, h) = dom::sync_canvas_backing_size(&canvas_resize);
            viewer_resize.borrow_mut().resize(w, h);
        }) as Box<dyn FnMut()>);
        if let Some(window) = web::window() {
            _ = window
                .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
        }
        resize_closure.forget();
    }

    fn wire_controls(document: &web::Document, viewer: &Rc<RefCell<Viewer>>, slot: &SessionSlot) {
        {
            let v = viewer.borrow();
            dom::set_checked(document, TRACKING_TOGGLE_ID, false);
            dom::set_checked(document, OFF_AXIS_TOGGLE_ID, v.is_off_axis());
            dom::set_checked(document, MIRROR_TOGGLE_ID, v.config().tracking.mirror_x);
            dom::set_value(
                document,
                SENSITIVITY_ID,
                &format!("{}", v.config().tracking.sensitivity),
            );
        }

        let (v, s) = (viewer.clone(), slot.clone());
        dom::add_input_listener(document, TRACKING_TOGGLE_ID, "change", move |el| {
            if el.checked() {
                webcam::start_tracking(v.clone(), s.clone());
            } else {
                webcam::stop_tracking(&v, &s);
            }
        });

        let v = viewer.clone();
        dom::add_input_listener(document, OFF_AXIS_TOGGLE_ID, "change", move |el| {
            v.borrow_mut().set_off_axis(el.checked());
        });

        let v = viewer.clone();
        dom::add_input_listener(document, MIRROR_TOGGLE_ID, "change", move |el| {
            v.borrow_mut().set_mirror_x(el.checked());
        });

        let v = viewer.clone();
        dom::add_input_listener(document, SENSITIVITY_ID, "input", move |el| {
            let value = el.value_as_number();
            if value.is_finite() {
                v.borrow_mut().set_sensitivity(value as f32);
            }
        });

        let v = viewer.clone();
        dom::add_click_listener(document, CALIBRATE_ID, move || {
            if !v.borrow_mut().calibrate() {
                log::info!("[tracking] nothing to calibrate against yet");
            }
        });

        let v = viewer.clone();
        dom::add_click_listener(document, RESET_ID, move || {
            v.borrow_mut().input_mut().request_reset();
        });
    }

    fn wire_teardown(viewer: &Rc<RefCell<Viewer>>, slot: &SessionSlot) {
        let Some(window) = web::window() else {
            return;
        };
        let (v, s) = (viewer.clone(), slot.clone());
        let closure = Closure::wrap(Box::new(move || {
            v.borrow_mut().teardown();
            webcam::release_slot(&s);
        }) as Box<dyn FnMut()>);
        for event in ["pagehide", "beforeunload"] {
            _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("holo-window starting");

        spawn_local(async move {
            if let Err(e) = init().await {
                log::error!("init error: {:?}", e);
            }
        });
        Ok(())
    }

    async fn init() -> anyhow::Result<()> {
        static STARTED: AtomicBool = AtomicBool::new(false);
        if STARTED.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow::anyhow!("no document"))?;

        let canvas: web::HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

        let viewer = Rc::new(RefCell::new(Viewer::new(load_config())?));
        let slot: SessionSlot = Rc::new(RefCell::new(None));

        wire_canvas_resize(&canvas, &viewer);
        events::wire_input_handlers(events::InputWiring {
            canvas: canvas.clone(),
            viewer: viewer.clone(),
        });
        events::wire_global_keys(viewer.clone(), canvas.clone());
        wire_controls(&document, &viewer, &slot);
        wire_teardown(&viewer, &slot);
        overlay::show(&document);

        let gpu = frame::init_gpu(&canvas).await;

        let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
            viewer,
            session: slot,
            canvas,
            gpu,
            status: overlay::StatusLine::default(),
            last_instant: Instant::now(),
            last_plane: None,
            tracking_was_live: false,
        }));
        frame::start_loop(frame_ctx);
        Ok(())
    }
}
