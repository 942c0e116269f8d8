pub mod camera;
pub mod earth;
pub mod scene;
pub mod time;
pub mod ui;
