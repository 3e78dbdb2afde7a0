//! Focus tracking and focus-indicator overlay synchronization.
//!
//! The host UI framework reports focus changes; [`FocusResolver`] decides
//! which element the indicator should wrap, and [`OverlaySynchronizer`] keeps
//! a single overlay element glued to that element's geometry, animating
//! between positions. [`FocusOverlay`] composes both with the host's focus
//! and lifecycle event sources.

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod resolver;
pub mod synchronizer;

pub use config::{Edge, OverlayConfig};
pub use controller::{FocusOverlay, HostCapabilities, ListenerId};
pub use error::{ConfigError, OverlayError};
pub use host::{
    FocusChangeSource, FocusHierarchy, FocusObserver, FocusRequester, GeometryProbe,
    LifecycleEvent, LifecycleObserver, LifecycleSource, ObserverId, OverlayElement,
    OverlayHandle, OverlayHost,
};
pub use resolver::{FocusOrigin, FocusResolver, FocusTarget};
pub use synchronizer::{OverlayState, OverlaySynchronizer, SyncOutcome};

pub use focus_animation::{AnimationSpec, Easing};
pub use focus_core::ElementId;
pub use focus_ui_graphics::{Density, Dp, EdgeInsets, Rect};

pub mod prelude {
    pub use crate::config::OverlayConfig;
    pub use crate::controller::{FocusOverlay, HostCapabilities};
    pub use crate::host::{
        FocusChangeSource, FocusHierarchy, FocusRequester, GeometryProbe, LifecycleEvent,
        LifecycleSource, OverlayElement, OverlayHandle, OverlayHost,
    };
    pub use crate::resolver::{FocusOrigin, FocusResolver, FocusTarget};
    pub use crate::synchronizer::{OverlaySynchronizer, SyncOutcome};
}
