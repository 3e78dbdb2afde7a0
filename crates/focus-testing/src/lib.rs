//! Testing utilities and harness for the focus overlay engine.
//!
//! [`SceneTree`] stands in for a host UI tree, [`RecordingHost`] captures
//! every write to the overlay and [`HostEventBus`] plays the host's focus and
//! lifecycle listeners. [`OverlayHarness`] wires them to a [`FocusOverlay`]
//! running on a manually advanced clock.
//!
//! [`FocusOverlay`]: focus_overlay::FocusOverlay

pub mod events;
pub mod harness;
pub mod recording;
pub mod scene;

pub use events::HostEventBus;
pub use harness::OverlayHarness;
pub use recording::{RecordingHost, RecordingOverlay};
pub use scene::SceneTree;

pub mod prelude {
    pub use crate::events::HostEventBus;
    pub use crate::harness::OverlayHarness;
    pub use crate::recording::{RecordingHost, RecordingOverlay};
    pub use crate::scene::SceneTree;
}
