pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod eye;
pub mod input;
pub mod off_axis;
pub mod scene;
pub mod screen;
pub mod tracking;
pub mod viewer;

pub use camera::*;
pub use config::*;
pub use error::*;
pub use eye::*;
pub use input::*;
pub use off_axis::*;
pub use screen::*;
pub use tracking::*;
pub use viewer::*;

// Shaders bundled as string constants
pub static SCENE_WGSL: &str = include_str!("../../shaders/scene.wgsl");
