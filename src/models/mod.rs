pub mod geometry;
pub mod settings;

pub use geometry::{Point, Rect, Size};
pub use settings::{Corner, Settings};
