use std::fmt;

use crate::EdgeInsets;

/// Density-independent length.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Dp(pub f32);

impl Dp {
    pub const ZERO: Self = Dp(0.0);

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn to_px(self, density: Density) -> f32 {
        density.dp_to_px(self)
    }
}

impl fmt::Display for Dp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}dp", self.0)
    }
}

impl From<f32> for Dp {
    fn from(value: f32) -> Self {
        Dp(value)
    }
}

/// Pixels per density-independent unit of the host display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub scale: f32,
}

impl Density {
    pub const ONE: Self = Self { scale: 1.0 };

    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    /// Converts to whole pixels, rounding half away from zero.
    pub fn dp_to_px(&self, dp: Dp) -> f32 {
        (dp.0 * self.scale).round()
    }

    pub fn px_to_dp(&self, px: f32) -> Dp {
        if self.scale == 0.0 {
            return Dp::ZERO;
        }
        Dp(px / self.scale)
    }

    pub fn insets_to_px(&self, insets: EdgeInsets) -> EdgeInsets {
        EdgeInsets::from_components(
            self.dp_to_px(Dp(insets.left)),
            self.dp_to_px(Dp(insets.top)),
            self.dp_to_px(Dp(insets.right)),
            self.dp_to_px(Dp(insets.bottom)),
        )
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::ONE
    }
}
