use std::cell::RefCell;
use std::rc::Rc;

use focus_core::collections::map::HashSet;
use focus_core::collections::ElementMap;
use focus_core::{ElementId, TestRuntime};
use focus_ui_graphics::{Density, Rect};

use super::*;
use crate::host::OverlayElement;
use crate::resolver::{FocusOrigin, FocusTarget};

#[derive(Default)]
struct Probe {
    rects: RefCell<ElementMap<Rect>>,
    hidden: RefCell<HashSet<ElementId>>,
}

impl Probe {
    fn place(&self, element: ElementId, rect: Rect) {
        self.rects.borrow_mut().insert(element, rect);
    }
}

impl GeometryProbe for Probe {
    fn rectangle_of(&self, element: ElementId) -> Option<Rect> {
        self.rects.borrow().get(&element).copied()
    }

    fn is_visible(&self, element: ElementId) -> bool {
        !self.hidden.borrow().contains(&element)
    }
}

#[derive(Default)]
struct Overlay {
    rect: Rect,
    visible: bool,
    writes: Vec<Rect>,
}

impl OverlayElement for Overlay {
    fn set_rectangle(&mut self, rect: Rect) {
        self.rect = rect;
        self.writes.push(rect);
    }

    fn rectangle(&self) -> Rect {
        self.rect
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Default)]
struct Host {
    created: RefCell<Vec<Rc<RefCell<Overlay>>>>,
    inserted: RefCell<usize>,
}

impl Host {
    fn overlay(&self) -> Rc<RefCell<Overlay>> {
        self.created.borrow()[0].clone()
    }
}

impl OverlayHost for Host {
    fn create_overlay(&self) -> OverlayHandle {
        let overlay = Rc::new(RefCell::new(Overlay::default()));
        self.created.borrow_mut().push(overlay.clone());
        overlay
    }

    fn insert_into_root(&self, _overlay: &OverlayHandle) {
        *self.inserted.borrow_mut() += 1;
    }
}

struct Fixture {
    runtime: TestRuntime,
    probe: Rc<Probe>,
    host: Rc<Host>,
    sync: OverlaySynchronizer,
}

fn fixture(config: OverlayConfig) -> Fixture {
    let runtime = TestRuntime::new();
    let probe = Rc::new(Probe::default());
    let host = Rc::new(Host::default());
    let sync = OverlaySynchronizer::new(config, probe.clone(), host.clone(), runtime.handle())
        .expect("valid config");
    Fixture {
        runtime,
        probe,
        host,
        sync,
    }
}

fn target(element: ElementId) -> Option<FocusTarget> {
    Some(FocusTarget::new(element, FocusOrigin::Traversal))
}

const E: ElementId = ElementId(10);
const F: ElementId = ElementId(11);

#[test]
fn first_focus_creates_overlay_without_animation() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));

    let outcome = fx.sync.on_focus_resolved(target(E)).expect("active");

    let expected = Rect::new(93.0, 43.0, 214.0, 94.0);
    assert_eq!(outcome, SyncOutcome::Created(expected));
    assert_eq!(*fx.host.inserted.borrow(), 1);
    let overlay = fx.host.overlay();
    assert_eq!(overlay.borrow().writes, vec![expected]);
    assert!(overlay.borrow().visible);
    assert!(!fx.sync.is_animating());
    assert_eq!(fx.sync.overlay_rectangle(), Some(expected));
}

#[test]
fn missing_target_is_a_no_op() {
    let mut fx = fixture(OverlayConfig::default());
    assert_eq!(fx.sync.on_focus_resolved(None), Ok(SyncOutcome::NoTarget));
    assert!(fx.host.created.borrow().is_empty());
}

#[test]
fn unlaid_out_target_never_creates_overlay() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 0.0, 80.0));
    assert_eq!(
        fx.sync.on_focus_resolved(target(E)),
        Ok(SyncOutcome::GeometryUnavailable)
    );
    assert_eq!(
        fx.sync.on_focus_resolved(target(F)),
        Ok(SyncOutcome::GeometryUnavailable)
    );
    assert!(fx.host.created.borrow().is_empty());
    assert!(!fx.sync.state().is_present());
}

#[test]
fn invalid_geometry_leaves_existing_overlay_in_place() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.probe.place(F, Rect::new(400.0, 50.0, 200.0, 0.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");

    assert_eq!(
        fx.sync.on_focus_resolved(target(F)),
        Ok(SyncOutcome::GeometryUnavailable)
    );
    fx.runtime.advance_millis(300, 16);
    let overlay = fx.host.overlay();
    assert_eq!(overlay.borrow().rect, Rect::new(93.0, 43.0, 214.0, 94.0));
    assert_eq!(overlay.borrow().writes.len(), 1);
}

#[test]
fn hidden_target_is_skipped() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.probe.hidden.borrow_mut().insert(E);
    assert_eq!(
        fx.sync.on_focus_resolved(target(E)),
        Ok(SyncOutcome::GeometryUnavailable)
    );
}

#[test]
fn same_rectangle_twice_writes_once() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");
    assert_eq!(fx.sync.on_focus_resolved(target(E)), Ok(SyncOutcome::Unchanged));
    fx.runtime.advance_millis(300, 16);
    assert_eq!(fx.host.overlay().borrow().writes.len(), 1);
}

#[test]
fn moving_focus_animates_to_padded_target() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.probe.place(F, Rect::new(400.0, 50.0, 200.0, 80.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");

    let outcome = fx.sync.on_focus_resolved(target(F)).expect("active");
    assert_eq!(
        outcome,
        SyncOutcome::Animating {
            from: Rect::new(93.0, 43.0, 214.0, 94.0),
            to: Rect::new(393.0, 43.0, 214.0, 94.0),
        }
    );
    assert!(fx.sync.is_animating());
    fx.runtime.run_turn();
    fx.runtime.advance_millis(200, 16);

    assert!(!fx.sync.is_animating());
    assert_eq!(
        fx.host.overlay().borrow().rect,
        Rect::new(393.0, 43.0, 214.0, 94.0)
    );
}

#[test]
fn animation_start_frame_leaves_overlay_untouched() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.probe.place(F, Rect::new(400.0, 50.0, 200.0, 80.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");
    fx.sync.on_focus_resolved(target(F)).expect("active");

    fx.runtime.run_turn();
    let overlay = fx.host.overlay();
    assert_eq!(overlay.borrow().writes.len(), 1);
    fx.runtime.advance_millis(16, 16);
    let writes = overlay.borrow().writes.clone();
    assert_eq!(writes.len(), 2);
    assert!(writes[1].x > writes[0].x);
}

#[test]
fn disabled_animations_snap_immediately() {
    let mut fx = fixture(OverlayConfig::default().with_animations_enabled(false));
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.probe.place(F, Rect::new(400.0, 50.0, 200.0, 80.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");

    assert_eq!(
        fx.sync.on_focus_resolved(target(F)),
        Ok(SyncOutcome::Snapped(Rect::new(393.0, 43.0, 214.0, 94.0)))
    );
    assert_eq!(
        fx.host.overlay().borrow().rect,
        Rect::new(393.0, 43.0, 214.0, 94.0)
    );
    assert!(!fx.runtime.handle().has_frame_callbacks());
}

#[test]
fn disabling_animations_mid_flight_cancels_the_job() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(0.0, 0.0, 100.0, 100.0));
    fx.probe.place(F, Rect::new(500.0, 0.0, 100.0, 100.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");
    fx.sync.on_focus_resolved(target(F)).expect("active");
    fx.runtime.run_turn();
    fx.runtime.advance_millis(50, 10);

    fx.sync.set_animations_enabled(false).expect("active");
    fx.sync.on_focus_resolved(target(E)).expect("active");
    fx.runtime.advance_millis(300, 16);
    assert_eq!(
        fx.host.overlay().borrow().rect,
        Rect::new(-7.0, -7.0, 114.0, 114.0)
    );
}

#[test]
fn margins_apply_per_side_on_next_resolution() {
    let mut fx = fixture(OverlayConfig::default().with_animations_enabled(false));
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.sync.configure_margins(1.0, 2.0, 3.0, 4.0).expect("valid");
    fx.sync.on_focus_resolved(target(E)).expect("active");
    assert_eq!(
        fx.host.overlay().borrow().rect,
        Rect::new(99.0, 48.0, 204.0, 86.0)
    );

    assert!(fx.sync.configure_margins(-1.0, 0.0, 0.0, 0.0).is_err());
    fx.sync.set_density(Density::new(2.0)).expect("valid density");
    fx.sync.on_focus_resolved(target(E)).expect("active");
    assert_eq!(
        fx.host.overlay().borrow().rect,
        Rect::new(98.0, 46.0, 208.0, 92.0)
    );
}

#[test]
fn show_and_hide_keep_rectangle() {
    let mut fx = fixture(OverlayConfig::default());
    fx.sync.hide_overlay().expect("safe without overlay");
    fx.probe.place(E, Rect::new(100.0, 50.0, 200.0, 80.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");

    let overlay = fx.host.overlay();
    assert!(!overlay.borrow().visible, "created hidden after hide_overlay");
    fx.sync.show_overlay().expect("active");
    assert!(overlay.borrow().visible);
    assert_eq!(overlay.borrow().writes.len(), 1);
}

#[test]
fn teardown_stops_animation_and_rejects_later_calls() {
    let mut fx = fixture(OverlayConfig::default());
    fx.probe.place(E, Rect::new(0.0, 0.0, 100.0, 100.0));
    fx.probe.place(F, Rect::new(500.0, 0.0, 100.0, 100.0));
    fx.sync.on_focus_resolved(target(E)).expect("active");
    fx.sync.on_focus_resolved(target(F)).expect("active");
    fx.runtime.run_turn();
    fx.runtime.advance_millis(32, 16);

    let overlay = fx.host.overlay();
    let writes = overlay.borrow().writes.len();
    fx.sync.teardown().expect("first teardown");
    fx.runtime.advance_millis(300, 16);

    assert_eq!(overlay.borrow().writes.len(), writes);
    assert!(fx.sync.overlay().is_none());
    assert_eq!(fx.sync.on_focus_resolved(target(E)), Err(OverlayError::Disposed));
    assert_eq!(fx.sync.show_overlay(), Err(OverlayError::Disposed));
    assert_eq!(fx.sync.teardown(), Err(OverlayError::Disposed));
}

#[test]
fn zero_margins_are_a_valid_config() {
    let runtime = TestRuntime::new();
    let mut config = OverlayConfig::default();
    config.set_margins(0.0, 0.0, 0.0, 0.0).expect("zero margins are valid");
    let sync = OverlaySynchronizer::new(
        config,
        Rc::new(Probe::default()),
        Rc::new(Host::default()),
        runtime.handle(),
    );
    assert!(sync.is_ok());
}
