//! Head tracking: turns face landmark detections into a smoothed eye offset.
//!
//! The detector itself lives outside the core behind [`FaceDetector`]. This
//! module owns the session state machine, the calibration baseline, the
//! poll-rate limit and the low-pass filter on the output.

use super::config::TrackingConfig;
use super::constants::TRACKING_SENSITIVITY_MAX;
use super::error::TrackingError;
use glam::{Vec2, Vec3};
use std::fmt::Debug;
use std::future::Future;

/// Normalized 2D landmarks of one face (0..1 across the video frame, y down).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    pub points: Vec<Vec2>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Build from interleaved `x, y` pairs; a trailing odd value is ignored.
    pub fn from_interleaved(xy: &[f32]) -> Self {
        Self {
            points: xy.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect(),
        }
    }
}

/// Bounding-box summary of one detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceObservation {
    pub center: Vec2,
    pub width: f32,
}

impl FaceObservation {
    /// Returns `None` for an empty set or a zero-width box.
    pub fn from_landmarks(face: &FaceLandmarks) -> Option<Self> {
        let mut points = face.points.iter().copied().filter(|p| p.is_finite());
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        let width = max.x - min.x;
        if !(width.is_finite() && width > f32::EPSILON) {
            return None;
        }
        Some(Self {
            center: (min + max) * 0.5,
            width,
        })
    }
}

/// Per-frame face detection, implemented by the platform layer.
pub trait FaceDetector {
    fn detect(&mut self, timestamp_ms: f64) -> Result<Vec<FaceLandmarks>, TrackingError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelSource {
    Local(String),
    Remote(String),
}

impl ModelSource {
    pub fn location(&self) -> &str {
        match self {
            ModelSource::Local(p) | ModelSource::Remote(p) => p,
        }
    }
}

/// Ordered model lookup: the first source that loads wins.
#[derive(Clone, Debug)]
pub struct ModelResolver {
    sources: Vec<ModelSource>,
}

impl ModelResolver {
    pub fn new(sources: Vec<ModelSource>) -> Self {
        Self { sources }
    }

    pub async fn resolve<T, E, F, Fut>(&self, mut load: F) -> Result<T, TrackingError>
    where
        F: FnMut(&ModelSource) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Debug,
    {
        for source in &self.sources {
            match load(source).await {
                Ok(model) => {
                    log::info!("[tracking] face model loaded from {}", source.location());
                    return Ok(model);
                }
                Err(e) => {
                    log::warn!(
                        "[tracking] face model unavailable at {}: {:?}",
                        source.location(),
                        e
                    );
                }
            }
        }
        Err(TrackingError::ModelLoadFailed {
            attempts: self.sources.len(),
        })
    }
}

/// What the host platform offers for camera access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackingCapabilities {
    pub secure_context: bool,
    pub media_devices: bool,
}

impl TrackingCapabilities {
    pub fn check(&self) -> Result<(), TrackingError> {
        if !self.secure_context {
            return Err(TrackingError::InsecureContext);
        }
        if !self.media_devices {
            return Err(TrackingError::Unsupported);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Active { face_visible: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrackingStatus {
    Off,
    Starting,
    Tracking,
    NoFace,
    Failed(TrackingError),
}

impl TrackingStatus {
    pub fn status_line(&self) -> String {
        match self {
            TrackingStatus::Off => "Head tracking off. Drag, scroll or use the arrow keys.".to_string(),
            TrackingStatus::Starting => "Starting camera…".to_string(),
            TrackingStatus::Tracking => "Head tracking active.".to_string(),
            TrackingStatus::NoFace => "No face detected. Easing back to center.".to_string(),
            TrackingStatus::Failed(err) => err.user_message(),
        }
    }
}

/// Identifies one start attempt so a late completion cannot revive a
/// session that was stopped in the meantime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionToken(u32);

#[derive(Clone, Debug)]
pub struct HeadTracker {
    cfg: TrackingConfig,
    state: SessionState,
    status: TrackingStatus,
    session: u32,
    baseline: Option<FaceObservation>,
    last_observation: Option<FaceObservation>,
    output: Vec3,
    last_poll_ms: Option<f64>,
}

impl HeadTracker {
    pub fn new(cfg: TrackingConfig) -> Self {
        Self {
            cfg,
            state: SessionState::Idle,
            status: TrackingStatus::Off,
            session: 0,
            baseline: None,
            last_observation: None,
            output: Vec3::ZERO,
            last_poll_ms: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> &TrackingStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn output(&self) -> Vec3 {
        self.output
    }

    pub fn baseline(&self) -> Option<FaceObservation> {
        self.baseline
    }

    pub fn sensitivity(&self) -> f32 {
        self.cfg.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_finite() {
            self.cfg.sensitivity = sensitivity.clamp(0.0, TRACKING_SENSITIVITY_MAX);
        }
    }

    pub fn set_mirror_x(&mut self, mirror: bool) {
        self.cfg.mirror_x = mirror;
    }

    pub fn model_resolver(&self) -> ModelResolver {
        ModelResolver::new(self.cfg.model_sources.clone())
    }

    /// Idle → Starting. Returns `None` if a session is already starting or active.
    pub fn begin_start(&mut self) -> Option<SessionToken> {
        if self.state != SessionState::Idle {
            return None;
        }
        self.session = self.session.wrapping_add(1);
        self.state = SessionState::Starting;
        self.status = TrackingStatus::Starting;
        log::info!("[tracking] starting session {}", self.session);
        Some(SessionToken(self.session))
    }

    /// Starting → Active on success, back to Idle on failure. Stale tokens
    /// are ignored; returns whether the session is now active.
    pub fn finish_start(&mut self, token: SessionToken, result: Result<(), TrackingError>) -> bool {
        if token.0 != self.session || self.state != SessionState::Starting {
            log::info!("[tracking] ignoring completion of cancelled session {}", token.0);
            return false;
        }
        match result {
            Ok(()) => {
                self.state = SessionState::Active { face_visible: false };
                self.status = TrackingStatus::Tracking;
                self.baseline = None;
                self.last_observation = None;
                self.last_poll_ms = None;
                self.output = Vec3::ZERO;
                log::info!("[tracking] session {} active", self.session);
                true
            }
            Err(err) => {
                log::warn!("[tracking] start failed: {}", err);
                self.state = SessionState::Idle;
                self.status = TrackingStatus::Failed(err);
                false
            }
        }
    }

    /// Any state → Idle. The output drops to zero at once.
    pub fn stop(&mut self) {
        if self.state != SessionState::Idle {
            log::info!("[tracking] session {} stopped", self.session);
        }
        // Invalidate any in-flight start.
        self.session = self.session.wrapping_add(1);
        self.state = SessionState::Idle;
        if !matches!(self.status, TrackingStatus::Failed(_)) {
            self.status = TrackingStatus::Off;
        }
        self.baseline = None;
        self.last_observation = None;
        self.last_poll_ms = None;
        self.output = Vec3::ZERO;
    }

    /// Record a failure reported outside the start sequence, e.g. a stream
    /// that ended while active.
    pub fn fail(&mut self, err: TrackingError) {
        self.stop();
        self.status = TrackingStatus::Failed(err);
    }

    /// Use the latest observation as the new reference point.
    pub fn calibrate(&mut self) -> bool {
        match self.last_observation {
            Some(obs) if self.is_active() => {
                self.baseline = Some(obs);
                log::info!(
                    "[tracking] calibrated at ({:.3},{:.3}) width {:.3}",
                    obs.center.x,
                    obs.center.y,
                    obs.width
                );
                true
            }
            _ => false,
        }
    }

    /// Forget the baseline; the next detection becomes the reference.
    pub fn reset_baseline(&mut self) {
        self.baseline = None;
        self.output = Vec3::ZERO;
    }

    pub fn should_poll(&self, now_ms: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.last_poll_ms {
            None => true,
            Some(last) => now_ms - last >= 1000.0 / self.cfg.poll_hz as f64,
        }
    }

    /// Run one rate-limited detection. Returns the new output when a poll
    /// happened.
    pub fn poll(
        &mut self,
        now_ms: f64,
        detector: &mut dyn FaceDetector,
        screen_size: Vec2,
    ) -> Option<Vec3> {
        if !self.should_poll(now_ms) {
            return None;
        }
        let faces = match detector.detect(now_ms) {
            Ok(faces) => faces,
            Err(e @ TrackingError::Detection(_)) => {
                log::warn!("[tracking] {}", e);
                Vec::new()
            }
            Err(e) => {
                log::error!("[tracking] session {} lost: {}", self.session, e);
                self.fail(e);
                return Some(self.output);
            }
        };
        Some(self.ingest(now_ms, &faces, screen_size))
    }

    /// Fold one detection result into the output. Only the first face is used.
    pub fn ingest(&mut self, now_ms: f64, faces: &[FaceLandmarks], screen_size: Vec2) -> Vec3 {
        if !self.is_active() {
            return self.output;
        }
        self.last_poll_ms = Some(now_ms);
        let observation = faces.first().and_then(FaceObservation::from_landmarks);
        match observation {
            None => {
                self.output *= 1.0 - self.cfg.no_face_decay;
                self.state = SessionState::Active { face_visible: false };
                self.status = TrackingStatus::NoFace;
            }
            Some(obs) => {
                self.last_observation = Some(obs);
                let baseline = *self.baseline.get_or_insert(obs);
                let target = self.target_offset(obs, baseline, screen_size);
                self.output = self.output.lerp(target, self.cfg.smoothing);
                self.state = SessionState::Active { face_visible: true };
                self.status = TrackingStatus::Tracking;
                log::debug!(
                    "[tracking] target=({:.3},{:.3},{:.3}) out=({:.3},{:.3},{:.3})",
                    target.x,
                    target.y,
                    target.z,
                    self.output.x,
                    self.output.y,
                    self.output.z
                );
            }
        }
        self.output
    }

    /// Map an observation relative to the baseline into a world-space offset.
    fn target_offset(
        &self,
        obs: FaceObservation,
        baseline: FaceObservation,
        screen_size: Vec2,
    ) -> Vec3 {
        let sens = self.cfg.sensitivity;
        let mirror = if self.cfg.mirror_x { -1.0 } else { 1.0 };
        // Image y grows downward; world y grows upward.
        let x_norm = ((obs.center.x - baseline.center.x) * 2.0 * mirror * sens).clamp(-1.0, 1.0);
        let y_norm = (-(obs.center.y - baseline.center.y) * 2.0 * sens).clamp(-1.0, 1.0);
        // A wider face is closer to the camera, which pulls the eye towards the screen.
        let z_norm = (baseline.width / obs.width - 1.0) * sens;
        let max_xy = screen_size * self.cfg.max_lateral_fraction;
        Vec3::new(
            x_norm * max_xy.x,
            y_norm * max_xy.y,
            z_norm.clamp(self.cfg.depth_min, self.cfg.depth_max),
        )
    }
}
