//! Animation system for the focus overlay engine
//!
//! Provides easing curves, tween specifications and the single-job
//! [`AnimationDriver`] that moves the overlay between rectangles.

pub mod animation;
pub mod driver;

pub use animation::*;
pub use driver::*;

pub mod prelude {
    pub use crate::animation::{AnimationSpec, Easing, Lerp};
    pub use crate::driver::{AnimationDriver, AnimationOutcome, AnimationState};
}
