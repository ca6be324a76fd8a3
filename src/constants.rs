/// Browser-side identifiers and tuning.
///
/// Element ids match `index.html`; keep the two in sync.
pub const CANVAS_ID: &str = "app-canvas";
pub const STATUS_ID: &str = "status-line";
pub const EYE_READOUT_ID: &str = "eye-readout";
pub const HINT_ID: &str = "hint-overlay";

// Controls
pub const TRACKING_TOGGLE_ID: &str = "tracking-toggle";
pub const OFF_AXIS_TOGGLE_ID: &str = "offaxis-toggle";
pub const CALIBRATE_ID: &str = "calibrate-button";
pub const RESET_ID: &str = "reset-button";
pub const SENSITIVITY_ID: &str = "sensitivity-slider";
pub const MIRROR_TOGGLE_ID: &str = "mirror-toggle";

// Webcam request hints
pub const VIDEO_FACING_MODE: &str = "user";
pub const VIDEO_IDEAL_WIDTH: u32 = 640;
pub const VIDEO_IDEAL_HEIGHT: u32 = 480;

// Longest frame step fed to the controller (seconds); avoids jumps after a tab stall
pub const MAX_FRAME_DT_SEC: f32 = 0.1;

// Background
pub const CLEAR_COLOR: [f64; 3] = [0.02, 0.025, 0.05];
