//! Webcam capture and the face-landmarker bridge.
//!
//! The landmarker itself is JavaScript (see `js/face_bridge.js`); this module
//! acquires the camera stream, feeds video frames to it and releases
//! everything again. A session is only handed out once both the stream and
//! the model are ready; any failure on the way cleans up what was acquired.

use crate::constants::{VIDEO_FACING_MODE, VIDEO_IDEAL_HEIGHT, VIDEO_IDEAL_WIDTH};
use crate::core::{
    FaceDetector, FaceLandmarks, ModelResolver, TrackingCapabilities, TrackingError, Viewer,
};
use js_sys::Reflect;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

#[wasm_bindgen(module = "/js/face_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn create_face_landmarker(model_path: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn detect_faces(
        landmarker: &JsValue,
        video: &web::HtmlVideoElement,
        timestamp_ms: f64,
    ) -> Result<js_sys::Array, JsValue>;

    fn close_landmarker(landmarker: &JsValue);
}

pub type SessionSlot = Rc<RefCell<Option<WebcamSession>>>;

pub struct WebcamSession {
    stream: web::MediaStream,
    video: web::HtmlVideoElement,
    landmarker: Option<JsValue>,
    released: bool,
    ended: Rc<Cell<bool>>,
    on_ended: Option<Closure<dyn FnMut()>>,
}

impl WebcamSession {
    /// Stop the stream, drop the model and detach the video. Safe to call twice.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(l) = self.landmarker.take() {
            close_landmarker(&l);
        }
        if let Some(cb) = self.on_ended.take() {
            for_each_track(&self.stream, |track| {
                _ = track
                    .remove_event_listener_with_callback("ended", cb.as_ref().unchecked_ref());
            });
        }
        stop_tracks(&self.stream);
        self.video.set_src_object(None);
        self.video.remove();
        log::info!("[tracking] camera released");
    }
}

impl Drop for WebcamSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl FaceDetector for WebcamSession {
    fn detect(&mut self, timestamp_ms: f64) -> Result<Vec<FaceLandmarks>, TrackingError> {
        // Unplugged camera or revoked permission.
        if self.ended.get() {
            return Err(TrackingError::Media("camera disconnected".to_string()));
        }
        let Some(landmarker) = &self.landmarker else {
            return Ok(Vec::new());
        };
        // HAVE_CURRENT_DATA
        if self.video.ready_state() < 2 {
            return Ok(Vec::new());
        }
        let faces = detect_faces(landmarker, &self.video, timestamp_ms)
            .map_err(|e| TrackingError::Detection(format!("{:?}", e)))?;
        Ok(faces
            .iter()
            .filter_map(|f| f.dyn_into::<js_sys::Float32Array>().ok())
            .map(|xy| FaceLandmarks::from_interleaved(&xy.to_vec()))
            .collect())
    }
}

fn classify(err: JsValue) -> TrackingError {
    match err.dyn_ref::<web::DomException>() {
        Some(ex) => TrackingError::from_dom_exception(&ex.name()),
        None => TrackingError::Media(format!("{:?}", err)),
    }
}

fn for_each_track(stream: &web::MediaStream, mut f: impl FnMut(&web::MediaStreamTrack)) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            f(&track);
        }
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for_each_track(stream, |track| track.stop());
}

fn watch_tracks(stream: &web::MediaStream, ended: Rc<Cell<bool>>) -> Closure<dyn FnMut()> {
    let cb = Closure::wrap(Box::new(move || {
        log::warn!("[tracking] camera track ended");
        ended.set(true);
    }) as Box<dyn FnMut()>);
    for_each_track(stream, |track| {
        _ = track.add_event_listener_with_callback("ended", cb.as_ref().unchecked_ref());
    });
    cb
}

pub fn capabilities(window: &web::Window) -> TrackingCapabilities {
    let media_devices = Reflect::get(&window.navigator(), &JsValue::from_str("mediaDevices"))
        .map(|v| !v.is_undefined() && !v.is_null())
        .unwrap_or(false);
    TrackingCapabilities {
        secure_context: window.is_secure_context(),
        media_devices,
    }
}

fn video_constraints() -> Result<JsValue, JsValue> {
    let ideal = |v: u32| -> Result<JsValue, JsValue> {
        let o = js_sys::Object::new();
        Reflect::set(&o, &"ideal".into(), &JsValue::from(v))?;
        Ok(o.into())
    };
    let video = js_sys::Object::new();
    Reflect::set(&video, &"facingMode".into(), &VIDEO_FACING_MODE.into())?;
    Reflect::set(&video, &"width".into(), &ideal(VIDEO_IDEAL_WIDTH)?)?;
    Reflect::set(&video, &"height".into(), &ideal(VIDEO_IDEAL_HEIGHT)?)?;
    Ok(video.into())
}

async fn acquire_stream(window: &web::Window) -> Result<web::MediaStream, TrackingError> {
    let devices = window.navigator().media_devices().map_err(classify)?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_video(&video_constraints().map_err(classify)?);
    constraints.set_audio(&JsValue::FALSE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(classify)?;
    let stream = JsFuture::from(promise).await.map_err(classify)?;
    stream
        .dyn_into::<web::MediaStream>()
        .map_err(|v| TrackingError::Media(format!("unexpected stream value {:?}", v)))
}

async fn attach_video(
    document: &web::Document,
    stream: &web::MediaStream,
) -> Result<web::HtmlVideoElement, TrackingError> {
    let video = document
        .create_element("video")
        .map_err(classify)?
        .dyn_into::<web::HtmlVideoElement>()
        .map_err(|_| TrackingError::Unsupported)?;
    video.set_muted(true);
    video.set_autoplay(true);
    _ = video.set_attribute("playsinline", "true");
    // Off-screen but still decoding; some browsers pause display:none video.
    _ = video.set_attribute(
        "style",
        "position:fixed;left:0;top:0;width:1px;height:1px;opacity:0;pointer-events:none",
    );
    if let Some(body) = document.body() {
        _ = body.append_child(&video);
    }
    video.set_src_object(Some(stream));
    let play = video.play().map_err(classify);
    let played = match play {
        Ok(p) => JsFuture::from(p).await.map(|_| ()).map_err(classify),
        Err(e) => Err(e),
    };
    if let Err(e) = played {
        video.set_src_object(None);
        video.remove();
        return Err(e);
    }
    Ok(video)
}

/// Acquire camera and model. Nothing stays allocated when this fails.
pub async fn open_session(resolver: ModelResolver) -> Result<WebcamSession, TrackingError> {
    let window = web::window().ok_or(TrackingError::Unsupported)?;
    capabilities(&window).check()?;
    let document = window.document().ok_or(TrackingError::Unsupported)?;

    let stream = acquire_stream(&window).await?;
    let video = match attach_video(&document, &stream).await {
        Ok(v) => v,
        Err(e) => {
            stop_tracks(&stream);
            return Err(e);
        }
    };
    // From here on the session owns the stream and video, and Drop releases them.
    let ended = Rc::new(Cell::new(false));
    let on_ended = watch_tracks(&stream, ended.clone());
    let mut session = WebcamSession {
        stream,
        video,
        landmarker: None,
        released: false,
        ended,
        on_ended: Some(on_ended),
    };
    let landmarker = resolver
        .resolve(|source| {
            let path = source.location().to_string();
            async move { create_face_landmarker(&path).await }
        })
        .await?;
    session.landmarker = Some(landmarker);
    Ok(session)
}

/// Kick off an asynchronous tracking start; the viewer decides whether the
/// result is still wanted when it arrives.
pub fn start_tracking(viewer: Rc<RefCell<Viewer>>, slot: SessionSlot) {
    let Some(token) = viewer.borrow_mut().begin_tracking() else {
        return;
    };
    let resolver = viewer.borrow().tracker().model_resolver();
    spawn_local(async move {
        match open_session(resolver).await {
            Ok(mut session) => {
                if viewer.borrow_mut().finish_tracking_start(token, Ok(())) {
                    *slot.borrow_mut() = Some(session);
                } else {
                    session.release();
                }
            }
            Err(err) => {
                viewer.borrow_mut().finish_tracking_start(token, Err(err));
            }
        }
    });
}

pub fn stop_tracking(viewer: &Rc<RefCell<Viewer>>, slot: &SessionSlot) {
    viewer.borrow_mut().stop_tracking();
    release_slot(slot);
}

pub fn release_slot(slot: &SessionSlot) {
    if let Some(mut session) = slot.borrow_mut().take() {
        session.release();
    }
}
