//! Capabilities the host UI framework provides to the engine.
//!
//! Every trait takes `&self`: hosts share their collaborators through `Rc`
//! and keep any mutable state behind their own interior mutability. None of
//! these calls may re-enter the engine synchronously.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use focus_core::ElementId;
use focus_ui_graphics::Rect;

/// Reads laid-out geometry of host elements.
pub trait GeometryProbe {
    /// Screen-space rectangle of `element`, or `None` if the element is
    /// detached or otherwise unreadable.
    fn rectangle_of(&self, element: ElementId) -> Option<Rect>;

    fn is_visible(&self, element: ElementId) -> bool;
}

/// Structural queries the resolver needs about the host tree.
pub trait FocusHierarchy {
    fn parent_of(&self, element: ElementId) -> Option<ElementId>;

    /// Whether `element` is a list/grid style container that presents focus
    /// through its selected child.
    fn is_delegating_container(&self, element: ElementId) -> bool;

    /// Whether `element` or one of its descendants holds focus.
    fn has_focus(&self, _element: ElementId) -> bool {
        true
    }
}

/// The focus indicator widget.
pub trait OverlayElement {
    fn set_rectangle(&mut self, rect: Rect);

    fn rectangle(&self) -> Rect;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

/// Shared handle to the overlay; the host's root container keeps a clone.
pub type OverlayHandle = Rc<RefCell<dyn OverlayElement>>;

/// Builds the overlay widget and parents it into the screen's root container.
pub trait OverlayHost {
    fn create_overlay(&self) -> OverlayHandle;

    fn insert_into_root(&self, overlay: &OverlayHandle);
}

pub trait FocusRequester {
    /// Asks the host to move focus to `element`. Returns whether it took focus.
    fn request_focus(&self, element: ElementId) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Receives `(old, new)` focus pairs from the host's global focus listener.
pub type FocusObserver = Rc<dyn Fn(Option<ElementId>, Option<ElementId>)>;

pub trait FocusChangeSource {
    fn add_focus_observer(&self, observer: FocusObserver) -> ObserverId;

    fn remove_focus_observer(&self, id: ObserverId);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    BecameVisible,
    BecameHidden,
    Destroyed,
}

pub type LifecycleObserver = Rc<dyn Fn(LifecycleEvent)>;

/// Host screen show/hide/destroy notifications.
///
/// Sources must tolerate observers removing themselves while an event is
/// being dispatched; `Destroyed` always does.
pub trait LifecycleSource {
    fn add_lifecycle_observer(&self, observer: LifecycleObserver) -> ObserverId;

    fn remove_lifecycle_observer(&self, id: ObserverId);
}
