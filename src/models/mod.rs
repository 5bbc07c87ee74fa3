pub mod common;
pub mod image;
pub mod prompt;

pub use common::*;
pub use image::*;
pub use prompt::*;
