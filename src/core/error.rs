//! Error types for the viewer core.
//!
//! Geometry and projection errors are caller bugs and are meant to surface
//! immediately. Tracking errors are user-facing and always recoverable: the
//! viewer falls back to manual control and shows [`TrackingError::user_message`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("screen corners are collinear or coincident")]
    DegenerateScreen,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("camera is not externally driven; enable off-axis mode before writing matrices")]
    CameraNotExternallyDriven,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    DeviceNotFound,
    #[error("camera device is busy")]
    DeviceBusy,
    #[error("camera access requires a secure context")]
    InsecureContext,
    #[error("camera API unavailable")]
    Unsupported,
    #[error("face model failed to load ({attempts} sources tried)")]
    ModelLoadFailed { attempts: usize },
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("camera stream error: {0}")]
    Media(String),
}

impl TrackingError {
    /// Status line shown to the user when a tracking session cannot run.
    pub fn user_message(&self) -> String {
        match self {
            TrackingError::PermissionDenied => {
                "Head tracking off: camera permission was denied.".to_string()
            }
            TrackingError::DeviceNotFound => {
                "Head tracking off: no camera was found.".to_string()
            }
            TrackingError::DeviceBusy => {
                "Head tracking off: the camera is in use by another application.".to_string()
            }
            TrackingError::InsecureContext => {
                "Head tracking off: camera access needs HTTPS or localhost.".to_string()
            }
            TrackingError::Unsupported => {
                "Head tracking off: this browser has no camera API.".to_string()
            }
            TrackingError::ModelLoadFailed { .. } => {
                "Head tracking off: the face model could not be loaded.".to_string()
            }
            TrackingError::Detection(msg) => format!("Face detection error: {}", msg),
            TrackingError::Media(msg) => format!("Head tracking off: camera error ({}).", msg),
        }
    }

    /// Map a DOMException name from `getUserMedia` to an error kind.
    pub fn from_dom_exception(name: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => TrackingError::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                TrackingError::DeviceNotFound
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => TrackingError::DeviceBusy,
            "SecurityError" => TrackingError::InsecureContext,
            other => TrackingError::Media(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be {requirement} (got {value})")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
    #[error("base eye z {eye_z} lies outside [{min_z}, {max_z}]")]
    EyeOutsideBounds { eye_z: f32, min_z: f32, max_z: f32 },
    #[error("at least one face model source is required")]
    NoModelSources,
}
