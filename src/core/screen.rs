use super::config::ScreenConfig;
use super::constants::SCREEN_Z;
use glam::Vec3;

/// The virtual window: three world-space corners of a rectangle.
///
/// `pa` is bottom-left, `pb` bottom-right, `pc` top-left. The fourth corner
/// is only needed for drawing and is derived on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPlane {
    pub pa: Vec3,
    pub pb: Vec3,
    pub pc: Vec3,
}

impl ScreenPlane {
    pub fn new(pa: Vec3, pb: Vec3, pc: Vec3) -> Self {
        Self { pa, pb, pc }
    }

    /// A plane sized for `aspect` (width / height) and centered on
    /// `(0, center_y)` in the `z = 0` plane.
    pub fn from_aspect(aspect: f32, config: &ScreenConfig) -> Self {
        let half_w = config.height * aspect * 0.5;
        let half_h = config.height * 0.5;
        let cy = config.center_y;
        Self {
            pa: Vec3::new(-half_w, cy - half_h, SCREEN_Z),
            pb: Vec3::new(half_w, cy - half_h, SCREEN_Z),
            pc: Vec3::new(-half_w, cy + half_h, SCREEN_Z),
        }
    }

    /// Recompute the corners for a new viewport aspect ratio.
    ///
    /// Returns `false` and keeps the previous corners when the aspect is not
    /// a positive finite number (e.g. a zero-area viewport).
    pub fn update_from_viewport(&mut self, aspect: f32, config: &ScreenConfig) -> bool {
        if !(aspect.is_finite() && aspect > 0.0) {
            return false;
        }
        *self = Self::from_aspect(aspect, config);
        true
    }

    /// Top-right corner, `pb + pc - pa`.
    pub fn pd(&self) -> Vec3 {
        self.pb + self.pc - self.pa
    }

    pub fn width(&self) -> f32 {
        (self.pb - self.pa).length()
    }

    pub fn height(&self) -> f32 {
        (self.pc - self.pa).length()
    }

    pub fn center(&self) -> Vec3 {
        (self.pb + self.pc) * 0.5
    }
}
