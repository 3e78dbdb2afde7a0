//! Pure math/data for the focus overlay engine
//!
//! Screen-space geometry primitives and density-independent units shared by
//! the animation and overlay crates.

mod geometry;
mod unit;

pub use geometry::*;
pub use unit::*;

pub mod prelude {
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
    pub use crate::unit::{Density, Dp};
}
