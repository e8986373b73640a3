pub mod document;
pub mod gpx;

pub use document::{GpxDocument, GpxFormat};
pub use gpx::*;
