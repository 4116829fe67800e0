//! Common utilities for the field viewers
//!
//! Window and GPU setup plus the 2D camera shared by interactive binaries.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
