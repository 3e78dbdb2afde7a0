use std::rc::Rc;

use focus_core::TestRuntime;
use focus_overlay::{FocusOverlay, HostCapabilities, LifecycleEvent, OverlayConfig, OverlayError};
use focus_ui_graphics::Rect;

use crate::events::HostEventBus;
use crate::recording::RecordingHost;
use crate::scene::SceneTree;

/// Frame interval used by [`OverlayHarness::advance`].
pub const FRAME_MILLIS: u64 = 16;

/// Headless harness for exercising a bound [`FocusOverlay`].
///
/// Owns a manually clocked runtime, a [`SceneTree`] wired to a
/// [`HostEventBus`] and a [`RecordingHost`]. Nothing runs until the test
/// drives a turn or advances time.
pub struct OverlayHarness {
    runtime: TestRuntime,
    events: HostEventBus,
    scene: Rc<SceneTree>,
    host: Rc<RecordingHost>,
    overlay: FocusOverlay,
}

impl OverlayHarness {
    pub fn new() -> Result<Self, OverlayError> {
        Self::with_config(OverlayConfig::default())
    }

    pub fn with_config(config: OverlayConfig) -> Result<Self, OverlayError> {
        let runtime = TestRuntime::new();
        let events = HostEventBus::new();
        let scene = Rc::new(SceneTree::with_events(events.clone()));
        let host = Rc::new(RecordingHost::new());
        let capabilities = HostCapabilities {
            probe: scene.clone(),
            hierarchy: scene.clone(),
            host: host.clone(),
            requester: Some(scene.clone()),
        };
        let overlay = FocusOverlay::new(capabilities, config, runtime.handle())?;
        overlay.bind(Rc::new(events.clone()), Rc::new(events.clone()))?;
        Ok(Self {
            runtime,
            events,
            scene,
            host,
            overlay,
        })
    }

    pub fn runtime(&self) -> &TestRuntime {
        &self.runtime
    }

    pub fn events(&self) -> &HostEventBus {
        &self.events
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    pub fn overlay(&self) -> &FocusOverlay {
        &self.overlay
    }

    /// Runs one event-loop turn without moving the clock.
    pub fn run_turn(&self) {
        self.runtime.run_turn();
    }

    /// Advances the clock by `millis`, one frame at a time.
    pub fn advance(&self, millis: u64) {
        self.runtime.run_turn();
        self.runtime.advance_millis(millis, FRAME_MILLIS);
    }

    /// Runs frames until no animation is in flight, giving up after `max_millis`.
    pub fn settle(&self, max_millis: u64) -> bool {
        self.runtime.run_turn();
        let mut elapsed = 0;
        while self.overlay.is_animating() && elapsed < max_millis {
            self.runtime.advance_millis(FRAME_MILLIS, FRAME_MILLIS);
            elapsed += FRAME_MILLIS;
        }
        !self.overlay.is_animating()
    }

    pub fn show(&self) {
        self.events.emit_lifecycle(LifecycleEvent::BecameVisible);
    }

    pub fn hide(&self) {
        self.events.emit_lifecycle(LifecycleEvent::BecameHidden);
    }

    pub fn destroy(&self) {
        self.events.emit_lifecycle(LifecycleEvent::Destroyed);
    }

    /// Rectangle currently written to the overlay widget.
    pub fn overlay_rect(&self) -> Option<Rect> {
        self.host.overlay_rect()
    }
}
