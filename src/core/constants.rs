use glam::Vec3;

// Default viewer tuning. Everything here can be overridden through
// `ViewerConfig`; these are only the starting values.

// Screen plane
pub const SCREEN_HEIGHT: f32 = 1.0; // world units spanned by the viewport's height
pub const SCREEN_CENTER_Y: f32 = 0.0; // vertical center of the screen rectangle
pub const SCREEN_Z: f32 = 0.0; // the screen always lies in this plane

// Eye
pub const BASE_EYE: Vec3 = Vec3::new(0.0, 0.0, 1.25);
pub const NEAR_PLANE: f32 = 0.05;
pub const FAR_PLANE: f32 = 100.0;
pub const MIN_EYE_DISTANCE: f32 = 1e-6; // floor for the eye-to-plane distance

// Bounds
pub const MAX_LATERAL_FRACTION: f32 = 0.45; // of screen width/height
pub const MIN_EYE_Z: f32 = 0.35;
pub const MAX_EYE_Z: f32 = 2.25;

// Manual input
pub const KEY_SPEED_XY: f32 = 0.6; // world units per second
pub const KEY_SPEED_Z: f32 = 0.8;
pub const WHEEL_SCALE: f32 = 0.0012; // world units per wheel deltaY unit
pub const MANUAL_SMOOTHING_PER_SEC: f32 = 14.0;

// Head tracking
pub const TRACKING_SENSITIVITY: f32 = 1.0;
pub const TRACKING_SENSITIVITY_MAX: f32 = 3.0;
pub const TRACKING_POLL_HZ: f32 = 30.0;
pub const TRACKING_SMOOTHING: f32 = 0.18; // fraction of the gap closed per poll
pub const NO_FACE_DECAY: f32 = 0.12; // fraction of the offset shed per empty poll
pub const TRACKING_LATERAL_FRACTION: f32 = 0.35; // of screen width/height
pub const TRACKING_DEPTH_MIN: f32 = -0.55;
pub const TRACKING_DEPTH_MAX: f32 = 0.7;

pub const MODEL_LOCAL_PATH: &str = "./models/face_landmarker.task";
pub const MODEL_REMOTE_URL: &str = "https://storage.googleapis.com/mediapipe-models/face_landmarker/face_landmarker/float16/1/face_landmarker.task";

// Fallback camera used while off-axis mode is disabled
pub const DEFAULT_FOV_DEGREES: f32 = 50.0;

// Decorative room behind the screen
pub const ROOM_DEPTH: f32 = 3.0;
pub const ROOM_GRID_LINES: usize = 10;
pub const ROOM_DEPTH_RINGS: usize = 6;
pub const MARKER_COUNT: usize = 24;
pub const MARKER_SIZE: f32 = 0.04;
pub const SCENE_SEED: u64 = 42;
