use std::fmt;

use crate::config::Edge;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    NegativeMargin { edge: Edge, value: f32 },
    NonFiniteMargin { edge: Edge },
    ZeroDuration,
    /// Longer than the frame clock's nanosecond range can express.
    DurationTooLong { millis: u64 },
    InvalidDensity { scale: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NegativeMargin { edge, value } => {
                write!(f, "{edge} margin must not be negative (got {value})")
            }
            ConfigError::NonFiniteMargin { edge } => write!(f, "{edge} margin must be finite"),
            ConfigError::ZeroDuration => write!(f, "animation duration must be positive"),
            ConfigError::DurationTooLong { millis } => {
                write!(f, "animation timing of {millis} ms is out of range")
            }
            ConfigError::InvalidDensity { scale } => {
                write!(f, "density scale must be positive and finite (got {scale})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayError {
    /// The overlay was used after its screen was torn down.
    Disposed,
    Config(ConfigError),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::Disposed => write!(f, "focus overlay used after teardown"),
            OverlayError::Config(err) => write!(f, "invalid overlay configuration: {err}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Config(err) => Some(err),
            OverlayError::Disposed => None,
        }
    }
}

impl From<ConfigError> for OverlayError {
    fn from(err: ConfigError) -> Self {
        OverlayError::Config(err)
    }
}
