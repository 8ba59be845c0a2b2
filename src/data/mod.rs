pub mod image;
pub mod loader;

pub use image::*;
pub use loader::*;
