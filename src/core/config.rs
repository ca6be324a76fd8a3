//! Viewer configuration.
//!
//! `ViewerConfig::default()` is assembled from `constants.rs`. The web
//! front-end layers URL query overrides on top via [`ViewerConfig::apply_overrides`].

use super::constants::*;
use super::error::ConfigError;
use super::tracking::ModelSource;
use glam::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    /// Height of the virtual screen in world units; width follows the aspect.
    pub height: f32,
    /// Vertical center of the screen rectangle.
    pub center_y: f32,
}

/// Per-axis limits for the eye position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeBounds {
    /// Lateral limit as a fraction of the screen's width (x) or height (y).
    pub max_lateral_fraction: f32,
    pub min_eye_z: f32,
    pub max_eye_z: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ManualConfig {
    pub speed_xy: f32,
    pub speed_z: f32,
    pub wheel_scale: f32,
    pub smoothing_per_sec: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackingConfig {
    pub sensitivity: f32,
    pub mirror_x: bool,
    pub poll_hz: f32,
    pub smoothing: f32,
    pub no_face_decay: f32,
    pub max_lateral_fraction: f32,
    pub depth_min: f32,
    pub depth_max: f32,
    pub model_sources: Vec<ModelSource>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub screen: ScreenConfig,
    pub base_eye: Vec3,
    pub near: f32,
    pub far: f32,
    pub bounds: EyeBounds,
    pub manual: ManualConfig,
    pub tracking: TrackingConfig,
    pub default_fov_degrees: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            height: SCREEN_HEIGHT,
            center_y: SCREEN_CENTER_Y,
        }
    }
}

impl Default for EyeBounds {
    fn default() -> Self {
        Self {
            max_lateral_fraction: MAX_LATERAL_FRACTION,
            min_eye_z: MIN_EYE_Z,
            max_eye_z: MAX_EYE_Z,
        }
    }
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            speed_xy: KEY_SPEED_XY,
            speed_z: KEY_SPEED_Z,
            wheel_scale: WHEEL_SCALE,
            smoothing_per_sec: MANUAL_SMOOTHING_PER_SEC,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sensitivity: TRACKING_SENSITIVITY,
            mirror_x: true,
            poll_hz: TRACKING_POLL_HZ,
            smoothing: TRACKING_SMOOTHING,
            no_face_decay: NO_FACE_DECAY,
            max_lateral_fraction: TRACKING_LATERAL_FRACTION,
            depth_min: TRACKING_DEPTH_MIN,
            depth_max: TRACKING_DEPTH_MAX,
            model_sources: vec![
                ModelSource::Local(MODEL_LOCAL_PATH.to_string()),
                ModelSource::Remote(MODEL_REMOTE_URL.to_string()),
            ],
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            base_eye: BASE_EYE,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            bounds: EyeBounds::default(),
            manual: ManualConfig::default(),
            tracking: TrackingConfig::default(),
            default_fov_degrees: DEFAULT_FOV_DEGREES,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement: "positive",
            value,
        })
    }
}

fn unit_fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement: "in (0, 1]",
            value,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("screen.height", self.screen.height)?;
        positive("near", self.near)?;
        if !(self.far > self.near) {
            return Err(ConfigError::OutOfRange {
                field: "far",
                requirement: "greater than near",
                value: self.far,
            });
        }
        unit_fraction("bounds.max_lateral_fraction", self.bounds.max_lateral_fraction)?;
        positive("bounds.min_eye_z", self.bounds.min_eye_z)?;
        if !(self.bounds.max_eye_z > self.bounds.min_eye_z) {
            return Err(ConfigError::OutOfRange {
                field: "bounds.max_eye_z",
                requirement: "greater than min_eye_z",
                value: self.bounds.max_eye_z,
            });
        }
        let z = self.base_eye.z;
        if z < self.bounds.min_eye_z || z > self.bounds.max_eye_z {
            return Err(ConfigError::EyeOutsideBounds {
                eye_z: z,
                min_z: self.bounds.min_eye_z,
                max_z: self.bounds.max_eye_z,
            });
        }
        positive("manual.smoothing_per_sec", self.manual.smoothing_per_sec)?;
        positive("tracking.poll_hz", self.tracking.poll_hz)?;
        unit_fraction("tracking.smoothing", self.tracking.smoothing)?;
        unit_fraction("tracking.no_face_decay", self.tracking.no_face_decay)?;
        unit_fraction(
            "tracking.max_lateral_fraction",
            self.tracking.max_lateral_fraction,
        )?;
        if !(self.tracking.sensitivity >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "tracking.sensitivity",
                requirement: "non-negative",
                value: self.tracking.sensitivity,
            });
        }
        if !(self.tracking.depth_min <= 0.0 && self.tracking.depth_max >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "tracking.depth_min",
                requirement: "<= 0 with depth_max >= 0",
                value: self.tracking.depth_min,
            });
        }
        if self.tracking.model_sources.is_empty() {
            return Err(ConfigError::NoModelSources);
        }
        Ok(())
    }

    /// Apply `key=value` overrides. Returns the keys that were skipped
    /// because they were unknown or did not parse.
    pub fn apply_overrides<'a, I>(&mut self, pairs: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut skipped = Vec::new();
        for (key, value) in pairs {
            if !self.apply_one(key, value.trim()) {
                log::warn!("[config] ignoring override {}={}", key, value);
                skipped.push(key.to_string());
            }
        }
        skipped
    }

    fn apply_one(&mut self, key: &str, value: &str) -> bool {
        if key == "mirror" {
            return match parse_bool(value) {
                Some(b) => {
                    self.tracking.mirror_x = b;
                    true
                }
                None => false,
            };
        }
        if key == "model" {
            if value.is_empty() {
                return false;
            }
            // An explicit model goes first; the built-in sources stay as fallbacks.
            let source = if value.starts_with("http://") || value.starts_with("https://") {
                ModelSource::Remote(value.to_string())
            } else {
                ModelSource::Local(value.to_string())
            };
            self.tracking.model_sources.insert(0, source);
            return true;
        }
        let Ok(v) = value.parse::<f32>() else {
            return false;
        };
        if !v.is_finite() {
            return false;
        }
        let slot = match key {
            "screen_height" => &mut self.screen.height,
            "center_y" => &mut self.screen.center_y,
            "eye_x" => &mut self.base_eye.x,
            "eye_y" => &mut self.base_eye.y,
            "eye_z" => &mut self.base_eye.z,
            "near" => &mut self.near,
            "far" => &mut self.far,
            "lateral" => &mut self.bounds.max_lateral_fraction,
            "min_z" => &mut self.bounds.min_eye_z,
            "max_z" => &mut self.bounds.max_eye_z,
            "sensitivity" => &mut self.tracking.sensitivity,
            "poll_hz" => &mut self.tracking.poll_hz,
            "smoothing" => &mut self.tracking.smoothing,
            "manual_smoothing" => &mut self.manual.smoothing_per_sec,
            "fov" => &mut self.default_fov_degrees,
            _ => return false,
        };
        *slot = v;
        true
    }
}
