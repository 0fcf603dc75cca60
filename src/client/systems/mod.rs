pub mod camera;
pub mod debug;
