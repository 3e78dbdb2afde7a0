//! Easing curves and tween specifications.

use focus_ui_graphics::{EdgeInsets, Point, Rect, Size};

/// Trait for types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for f64 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction as f64
    }
}

impl Lerp for Point {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Point::new(self.x.lerp(&target.x, fraction), self.y.lerp(&target.y, fraction))
    }
}

impl Lerp for Size {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Size::new(
            self.width.lerp(&target.width, fraction),
            self.height.lerp(&target.height, fraction),
        )
    }
}

/// Each of the four fields moves independently.
impl Lerp for Rect {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Rect::new(
            self.x.lerp(&target.x, fraction),
            self.y.lerp(&target.y, fraction),
            self.width.lerp(&target.width, fraction),
            self.height.lerp(&target.height, fraction),
        )
    }
}

impl Lerp for EdgeInsets {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        EdgeInsets::from_components(
            self.left.lerp(&target.left, fraction),
            self.top.lerp(&target.top, fraction),
            self.right.lerp(&target.right, fraction),
            self.bottom.lerp(&target.bottom, fraction),
        )
    }
}

/// Easing curves applied to the linear time fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Material "standard" curve.
    FastOutSlowIn,
}

impl Easing {
    /// Apply the easing function to a linear fraction in [0, 1].
    pub fn transform(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Easing::Linear => fraction,
            Easing::EaseIn => CubicBezier::new(0.42, 0.0, 1.0, 1.0).solve(fraction),
            Easing::EaseOut => CubicBezier::new(0.0, 0.0, 0.58, 1.0).solve(fraction),
            Easing::EaseInOut => CubicBezier::new(0.42, 0.0, 0.58, 1.0).solve(fraction),
            Easing::FastOutSlowIn => CubicBezier::new(0.4, 0.0, 0.2, 1.0).solve(fraction),
        }
    }
}

/// CSS-style timing curve from (0,0) to (1,1).
///
/// Control-point y values inside [0, 1] keep the output inside [0, 1], so
/// eased values never overshoot the animation target.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn component(a: f32, b: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * a + 3.0 * mt * t * t * b + t * t * t
    }

    fn component_slope(a: f32, b: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * a + 6.0 * mt * t * (b - a) + 3.0 * t * t * (1.0 - b)
    }

    /// Finds the curve parameter for time `x`, then returns its y value.
    fn solve(&self, x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let mut t = x;
        for _ in 0..8 {
            let error = Self::component(self.x1, self.x2, t) - x;
            if error.abs() < 1e-5 {
                return Self::component(self.y1, self.y2, t).clamp(0.0, 1.0);
            }
            let slope = Self::component_slope(self.x1, self.x2, t);
            if slope.abs() < 1e-6 {
                break;
            }
            t = (t - error / slope).clamp(0.0, 1.0);
        }
        // Newton stalled on a flat segment; fall back to bisection.
        let (mut low, mut high) = (0.0f32, 1.0f32);
        t = x;
        for _ in 0..32 {
            let value = Self::component(self.x1, self.x2, t);
            if (value - x).abs() < 1e-5 {
                break;
            }
            if value < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) * 0.5;
        }
        Self::component(self.y1, self.y2, t).clamp(0.0, 1.0)
    }
}

/// Tween specification: duration, easing and optional start delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Duration in milliseconds.
    pub duration_millis: u64,
    pub easing: Easing,
    /// Delay before the first interpolated value, in milliseconds.
    pub delay_millis: u64,
}

impl AnimationSpec {
    pub const DEFAULT_DURATION_MILLIS: u64 = 200;

    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            delay_millis: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::Linear)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }

    pub fn with_duration(mut self, duration_millis: u64) -> Self {
        self.duration_millis = duration_millis;
        self
    }

    pub fn total_millis(&self) -> u64 {
        self.delay_millis + self.duration_millis
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::linear(Self::DEFAULT_DURATION_MILLIS)
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
