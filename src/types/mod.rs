pub mod point;
pub mod track;

pub use point::*;
pub use track::*;
