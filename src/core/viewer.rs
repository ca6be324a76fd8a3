//! Per-frame orchestration.
//!
//! Within one tick the stages run in a fixed order, each consuming what the
//! previous one produced: drain input, apply manual motion, poll the head
//! tracker, compute the eye, update the off-axis camera, render.

use super::camera::{Camera, CameraPose};
use super::config::ViewerConfig;
use super::error::{ConfigError, ProjectionError, TrackingError};
use super::eye::EyeController;
use super::input::InputState;
use super::off_axis::{update_off_axis_camera, Frustum};
use super::screen::ScreenPlane;
use super::tracking::{FaceDetector, HeadTracker, SessionState, SessionToken, TrackingStatus};
use glam::{Vec2, Vec3};
use thiserror::Error;

/// Anything that can draw the scene from a camera.
pub trait Renderer {
    type Error;
    fn render(&mut self, camera: &Camera) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum FrameError<E: std::fmt::Debug> {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("render failed: {0:?}")]
    Render(E),
}

#[derive(Clone, Debug)]
pub struct FrameReport {
    pub eye: Vec3,
    /// Whether the head tracker ran a detection this tick.
    pub polled: bool,
    /// Frustum written to the camera, when off-axis mode is on.
    pub frustum: Option<Frustum>,
    pub status: TrackingStatus,
}

pub struct Viewer {
    config: ViewerConfig,
    plane: ScreenPlane,
    eye: EyeController,
    tracker: HeadTracker,
    camera: Camera,
    input: InputState,
    off_axis: bool,
    saved_pose: Option<CameraPose>,
    last_eye: Vec3,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let plane = ScreenPlane::from_aspect(1.0, &config.screen);
        let mut eye = EyeController::new(config.base_eye, config.bounds, config.manual.clone());
        eye.set_screen_size(plane.width(), plane.height());
        let pose = CameraPose {
            eye: config.base_eye,
            target: plane.center(),
            up: Vec3::Y,
        };
        let camera = Camera::new(
            pose,
            1.0,
            config.default_fov_degrees.to_radians(),
            config.near,
            config.far,
        );
        let tracker = HeadTracker::new(config.tracking.clone());
        let last_eye = config.base_eye;
        let mut viewer = Self {
            config,
            plane,
            eye,
            tracker,
            camera,
            input: InputState::default(),
            off_axis: false,
            saved_pose: None,
            last_eye,
        };
        viewer.set_off_axis(true);
        Ok(viewer)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn plane(&self) -> &ScreenPlane {
        &self.plane
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn eye_controller(&self) -> &EyeController {
        &self.eye
    }

    pub fn tracker(&self) -> &HeadTracker {
        &self.tracker
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn eye_position(&self) -> Vec3 {
        self.last_eye
    }

    pub fn is_off_axis(&self) -> bool {
        self.off_axis
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(self.plane.width(), self.plane.height())
    }

    /// React to a new viewport size in CSS pixels. Zero-area viewports keep
    /// the previous plane.
    pub fn resize(&mut self, width_px: f32, height_px: f32) -> bool {
        if !(width_px > 0.0 && height_px > 0.0) {
            return false;
        }
        let aspect = width_px / height_px;
        if !self.plane.update_from_viewport(aspect, &self.config.screen) {
            return false;
        }
        self.eye.set_screen_size(self.plane.width(), self.plane.height());
        self.eye.set_viewport_px(width_px, height_px);
        self.camera.aspect = aspect;
        self.camera.update_matrices();
        log::info!(
            "[viewer] viewport {}x{} -> screen {:.3}x{:.3}",
            width_px,
            height_px,
            self.plane.width(),
            self.plane.height()
        );
        true
    }

    /// Hand the camera to the off-axis engine, or give it back to the
    /// default look-at path with the pose it had before.
    pub fn set_off_axis(&mut self, enabled: bool) {
        if enabled == self.off_axis {
            return;
        }
        if enabled {
            self.saved_pose = Some(self.camera.pose);
            self.camera.set_externally_driven(true);
            self.off_axis = true;
            if let Err(e) = update_off_axis_camera(
                &mut self.camera,
                self.last_eye,
                &self.plane,
                self.config.near,
                self.config.far,
            ) {
                log::error!("[viewer] off-axis update failed: {}", e);
            }
        } else {
            if let Some(pose) = self.saved_pose.take() {
                self.camera.pose = pose;
            }
            self.camera.set_externally_driven(false);
            self.off_axis = false;
        }
        log::info!("[viewer] off-axis {}", if enabled { "on" } else { "off" });
    }

    pub fn begin_tracking(&mut self) -> Option<SessionToken> {
        self.tracker.begin_start()
    }

    pub fn finish_tracking_start(
        &mut self,
        token: SessionToken,
        result: Result<(), TrackingError>,
    ) -> bool {
        let active = self.tracker.finish_start(token, result);
        if active {
            self.eye.set_tracking_active(true);
        } else if !self.tracker.is_active() {
            // A stale completion leaves a newer live session alone.
            self.eye.set_tracking_active(false);
        }
        active
    }

    pub fn stop_tracking(&mut self) {
        self.tracker.stop();
        self.eye.set_tracking_active(false);
    }

    pub fn calibrate(&mut self) -> bool {
        self.tracker.calibrate()
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.tracker.set_sensitivity(sensitivity);
    }

    pub fn set_mirror_x(&mut self, mirror: bool) {
        self.tracker.set_mirror_x(mirror);
    }

    pub fn reset_view(&mut self) {
        self.eye.reset();
        log::info!("[viewer] view reset");
    }

    pub fn tracking_status(&self) -> &TrackingStatus {
        self.tracker.status()
    }

    /// Stop tracking and return the camera to its default behavior.
    pub fn teardown(&mut self) {
        self.stop_tracking();
        self.set_off_axis(false);
        self.input.release_all();
    }

    /// Advance input, tracking and the camera by one frame without rendering.
    pub fn tick(
        &mut self,
        now_ms: f64,
        dt_sec: f32,
        detector: Option<&mut dyn FaceDetector>,
    ) -> Result<FrameReport, ProjectionError> {
        let input = self.input.drain();
        if input.stop_tracking_requested && self.tracker.state() != SessionState::Idle {
            log::info!("[keys] stop tracking");
            self.stop_tracking();
        }
        if input.reset_requested {
            self.reset_view();
        }
        if input.pointer_delta != Vec2::ZERO {
            self.eye
                .apply_pointer_delta(input.pointer_delta.x, input.pointer_delta.y);
        }
        if input.wheel_delta != 0.0 {
            self.eye.apply_wheel(input.wheel_delta);
        }
        self.eye.apply_keyboard(dt_sec, &input.held);
        self.eye.advance(dt_sec);
        if self.eye.take_baseline_reset() {
            self.tracker.reset_baseline();
        }

        let mut polled = false;
        self.eye.set_tracking_active(self.tracker.is_active());
        if let Some(detector) = detector {
            let screen_size = self.screen_size();
            if let Some(offset) = self.tracker.poll(now_ms, detector, screen_size) {
                self.eye.set_tracked_offset(offset);
                polled = true;
            }
            // The stream may have died during the poll.
            if !self.tracker.is_active() {
                self.eye.set_tracking_active(false);
            }
        }

        let eye = self.eye.compute_eye();
        self.last_eye = eye;

        let frustum = if self.off_axis {
            let p = update_off_axis_camera(
                &mut self.camera,
                eye,
                &self.plane,
                self.config.near,
                self.config.far,
            )?;
            Some(p.frustum)
        } else {
            None
        };

        Ok(FrameReport {
            eye,
            polled,
            frustum,
            status: self.tracker.status().clone(),
        })
    }

    /// One full frame: [`Viewer::tick`] followed by a render.
    pub fn run_frame<R: Renderer + ?Sized>(
        &mut self,
        now_ms: f64,
        dt_sec: f32,
        detector: Option<&mut dyn FaceDetector>,
        renderer: &mut R,
    ) -> Result<FrameReport, FrameError<R::Error>>
    where
        R::Error: std::fmt::Debug,
    {
        let report = self.tick(now_ms, dt_sec, detector)?;
        renderer.render(&self.camera).map_err(FrameError::Render)?;
        Ok(report)
    }
}
