use crate::constants::{MAX_FRAME_DT_SEC, TRACKING_TOGGLE_ID};
use crate::core::constants::{ROOM_DEPTH, SCENE_SEED};
use crate::core::scene::build_room;
use crate::core::{FaceDetector, FrameError, ScreenPlane, SessionState, Viewer};
use crate::dom;
use crate::overlay::StatusLine;
use crate::render;
use crate::webcam::{self, SessionSlot};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub viewer: Rc<RefCell<Viewer>>,
    pub session: SessionSlot,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub status: StatusLine,
    pub last_instant: Instant,
    pub last_plane: Option<ScreenPlane>,
    pub tracking_was_live: bool,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        let dt_sec = dt.as_secs_f32().min(MAX_FRAME_DT_SEC);
        let now_ms = web::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0);

        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
            let plane = *self.viewer.borrow().plane();
            if self.last_plane != Some(plane) {
                gpu.set_scene(&build_room(&plane, ROOM_DEPTH, SCENE_SEED));
                self.last_plane = Some(plane);
            }
        }

        let mut slot = self.session.borrow_mut();
        let detector = slot.as_mut().map(|s| s as &mut dyn FaceDetector);
        let mut viewer = self.viewer.borrow_mut();
        let result = match self.gpu.as_mut() {
            Some(gpu) => viewer.run_frame(now_ms, dt_sec, detector, gpu),
            None => viewer.tick(now_ms, dt_sec, detector).map_err(FrameError::from),
        };
        let report = match result {
            Ok(r) => Some(r),
            Err(FrameError::Render(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.reconfigure();
                }
                None
            }
            Err(e) => {
                log::error!("[gpu] frame failed: {}", e);
                None
            }
        };

        // Tracking can end inside the tick (Escape, failure); let the camera go.
        let live = viewer.tracker().state() != SessionState::Idle;
        if !live && slot.is_some() {
            drop(slot);
            webcam::release_slot(&self.session);
        }
        if self.tracking_was_live && !live {
            if let Some(doc) = dom::window_document() {
                dom::set_checked(&doc, TRACKING_TOGGLE_ID, false);
            }
        }
        self.tracking_was_live = live;

        if let Some(report) = report {
            if let Some(doc) = dom::window_document() {
                self.status
                    .update(&doc, &report.status.status_line(), report.eye);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("[gpu] WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
