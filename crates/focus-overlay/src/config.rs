//! Per-overlay configuration.
//!
//! Margins are stored in density-independent units and converted to pixels
//! with the configured [`Density`] whenever the overlay rectangle is computed,
//! so density and margin changes take effect on the next resolution.

use std::fmt;

use focus_animation::{AnimationSpec, Easing};
use focus_core::NANOS_PER_MILLI;
use focus_ui_graphics::{Density, Dp, EdgeInsets};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::Left => "left",
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    margins: EdgeInsets,
    density: Density,
    animation: AnimationSpec,
    animations_enabled: bool,
    initial_focus_delay_millis: u64,
}

impl OverlayConfig {
    pub const DEFAULT_MARGIN: Dp = Dp(7.0);
    pub const DEFAULT_INITIAL_FOCUS_DELAY_MILLIS: u64 = 50;
    /// Longest animation duration or start delay, in milliseconds.
    pub const MAX_ANIMATION_MILLIS: u64 = u64::MAX / NANOS_PER_MILLI;

    pub fn new() -> Self {
        Self {
            margins: EdgeInsets::uniform(Self::DEFAULT_MARGIN.value()),
            density: Density::ONE,
            animation: AnimationSpec::default(),
            animations_enabled: true,
            initial_focus_delay_millis: Self::DEFAULT_INITIAL_FOCUS_DELAY_MILLIS,
        }
    }

    pub fn with_margins(
        mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Result<Self, ConfigError> {
        self.set_margins(left, top, right, bottom)?;
        Ok(self)
    }

    pub fn with_animation_duration(mut self, duration_millis: u64) -> Result<Self, ConfigError> {
        self.set_animation_duration(duration_millis)?;
        Ok(self)
    }

    pub fn with_density(mut self, density: Density) -> Result<Self, ConfigError> {
        self.set_density(density)?;
        Ok(self)
    }

    pub fn with_animation_spec(mut self, spec: AnimationSpec) -> Result<Self, ConfigError> {
        validate_animation(spec)?;
        self.animation = spec;
        Ok(self)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.animation.easing = easing;
        self
    }

    pub fn with_animations_enabled(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }

    pub fn with_initial_focus_delay(mut self, delay_millis: u64) -> Self {
        self.initial_focus_delay_millis = delay_millis;
        self
    }

    /// Replaces all four margins (in dp). On error the previous margins stay.
    pub fn set_margins(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Result<(), ConfigError> {
        let margins = EdgeInsets::from_components(left, top, right, bottom);
        validate_margins(margins)?;
        self.margins = margins;
        Ok(())
    }

    pub fn set_animation_duration(&mut self, duration_millis: u64) -> Result<(), ConfigError> {
        validate_animation(self.animation.with_duration(duration_millis))?;
        self.animation.duration_millis = duration_millis;
        Ok(())
    }

    pub fn set_density(&mut self, density: Density) -> Result<(), ConfigError> {
        if !density.scale.is_finite() || density.scale <= 0.0 {
            return Err(ConfigError::InvalidDensity {
                scale: density.scale,
            });
        }
        self.density = density;
        Ok(())
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.animations_enabled = enabled;
    }

    pub fn set_initial_focus_delay(&mut self, delay_millis: u64) {
        self.initial_focus_delay_millis = delay_millis;
    }

    /// Checks every field, for configs assembled from untrusted parts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_margins(self.margins)?;
        validate_animation(self.animation)?;
        if !self.density.scale.is_finite() || self.density.scale <= 0.0 {
            return Err(ConfigError::InvalidDensity {
                scale: self.density.scale,
            });
        }
        Ok(())
    }

    /// Margins in dp, as configured.
    pub fn margins(&self) -> EdgeInsets {
        self.margins
    }

    /// Margins in whole pixels for the configured density.
    pub fn margins_px(&self) -> EdgeInsets {
        self.density.insets_to_px(self.margins)
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn animation_spec(&self) -> AnimationSpec {
        self.animation
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    pub fn initial_focus_delay_millis(&self) -> u64 {
        self.initial_focus_delay_millis
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_margins(margins: EdgeInsets) -> Result<(), ConfigError> {
    let edges = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];
    for (edge, value) in edges.into_iter().zip(margins.edges()) {
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteMargin { edge });
        }
        if value < 0.0 {
            return Err(ConfigError::NegativeMargin { edge, value });
        }
    }
    Ok(())
}

fn validate_animation(spec: AnimationSpec) -> Result<(), ConfigError> {
    if spec.duration_millis == 0 {
        return Err(ConfigError::ZeroDuration);
    }
    for millis in [spec.duration_millis, spec.delay_millis] {
        if millis > OverlayConfig::MAX_ANIMATION_MILLIS {
            return Err(ConfigError::DurationTooLong { millis });
        }
    }
    Ok(())
}
