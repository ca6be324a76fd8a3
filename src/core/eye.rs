//! Eye-position controller.
//!
//! Two additive offsets move the eye away from its base position: a manual
//! one driven by pointer drag, wheel and held keys, and a tracked one fed by
//! the head tracker. Manual nudges keep working while tracking is active.

use super::config::{EyeBounds, ManualConfig};
use super::input::{DirectionKey, HeldKeys};
use glam::{Vec2, Vec3};

#[derive(Clone, Debug)]
pub struct EyeController {
    base: Vec3,
    bounds: EyeBounds,
    manual_cfg: ManualConfig,
    /// World-space size of the screen rectangle.
    screen_size: Vec2,
    /// CSS-pixel size of the render viewport.
    viewport_px: Vec2,
    manual_offset: Vec3,
    manual_display: Vec3,
    tracked_offset: Vec3,
    tracking_active: bool,
    baseline_reset_pending: bool,
}

impl EyeController {
    pub fn new(base: Vec3, bounds: EyeBounds, manual_cfg: ManualConfig) -> Self {
        Self {
            base,
            bounds,
            manual_cfg,
            screen_size: Vec2::ONE,
            viewport_px: Vec2::ONE,
            manual_offset: Vec3::ZERO,
            manual_display: Vec3::ZERO,
            tracked_offset: Vec3::ZERO,
            tracking_active: false,
            baseline_reset_pending: false,
        }
    }

    pub fn base(&self) -> Vec3 {
        self.base
    }

    pub fn manual_offset(&self) -> Vec3 {
        self.manual_offset
    }

    pub fn tracked_offset(&self) -> Vec3 {
        self.tracked_offset
    }

    pub fn is_tracking_active(&self) -> bool {
        self.tracking_active
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.screen_size = Vec2::new(width, height);
            self.manual_offset = self.clamp_offset(self.manual_offset);
        }
    }

    pub fn set_viewport_px(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport_px = Vec2::new(width, height);
        }
    }

    /// Lateral limit per axis, in world units relative to the base eye.
    fn lateral_limit(&self) -> Vec2 {
        self.screen_size * self.bounds.max_lateral_fraction
    }

    fn clamp_offset(&self, offset: Vec3) -> Vec3 {
        let lim = self.lateral_limit();
        Vec3::new(
            offset.x.clamp(-lim.x, lim.x),
            offset.y.clamp(-lim.y, lim.y),
            offset.z.clamp(
                self.bounds.min_eye_z - self.base.z,
                self.bounds.max_eye_z - self.base.z,
            ),
        )
    }

    /// Drag the view by a pixel delta. Dragging right moves the eye right;
    /// dragging down (positive pixel y) moves it down.
    pub fn apply_pointer_delta(&mut self, dx_px: f32, dy_px: f32) {
        let per_px = self.screen_size / self.viewport_px;
        self.manual_offset.x += dx_px * per_px.x;
        self.manual_offset.y -= dy_px * per_px.y;
        self.manual_offset = self.clamp_offset(self.manual_offset);
    }

    pub fn apply_wheel(&mut self, delta_y: f32) {
        self.manual_offset.z += delta_y * self.manual_cfg.wheel_scale;
        self.manual_offset = self.clamp_offset(self.manual_offset);
    }

    /// Move along every held direction, scaled by elapsed time.
    pub fn apply_keyboard(&mut self, dt_sec: f32, held: &HeldKeys) {
        if dt_sec <= 0.0 || held.is_empty() {
            return;
        }
        let step_xy = self.manual_cfg.speed_xy * dt_sec;
        let step_z = self.manual_cfg.speed_z * dt_sec;
        for key in held.iter() {
            match key {
                DirectionKey::Left => self.manual_offset.x -= step_xy,
                DirectionKey::Right => self.manual_offset.x += step_xy,
                DirectionKey::Up => self.manual_offset.y += step_xy,
                DirectionKey::Down => self.manual_offset.y -= step_xy,
                DirectionKey::Closer => self.manual_offset.z -= step_z,
                DirectionKey::Farther => self.manual_offset.z += step_z,
            }
        }
        self.manual_offset = self.clamp_offset(self.manual_offset);
    }

    /// Ease the displayed manual offset towards the accumulator.
    pub fn advance(&mut self, dt_sec: f32) {
        if dt_sec <= 0.0 {
            return;
        }
        let alpha = 1.0 - (-dt_sec * self.manual_cfg.smoothing_per_sec).exp();
        self.manual_display += (self.manual_offset - self.manual_display) * alpha;
    }

    pub fn set_tracking_active(&mut self, active: bool) {
        self.tracking_active = active;
        if !active {
            self.tracked_offset = Vec3::ZERO;
        }
    }

    pub fn set_tracked_offset(&mut self, offset: Vec3) {
        if self.tracking_active {
            self.tracked_offset = offset;
        }
    }

    /// Zero both offsets and ask the head tracker for a fresh baseline.
    pub fn reset(&mut self) {
        self.manual_offset = Vec3::ZERO;
        self.manual_display = Vec3::ZERO;
        self.tracked_offset = Vec3::ZERO;
        self.baseline_reset_pending = true;
    }

    /// Returns true once after each `reset()`.
    pub fn take_baseline_reset(&mut self) -> bool {
        std::mem::take(&mut self.baseline_reset_pending)
    }

    pub fn compute_eye(&self) -> Vec3 {
        let mut offset = self.manual_display;
        if self.tracking_active {
            offset += self.tracked_offset;
        }
        self.base + self.clamp_offset(offset)
    }
}
