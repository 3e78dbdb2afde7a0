use std::cell::RefCell;

use indexmap::IndexMap;

use focus_core::collections::map::HashSet;
use focus_core::collections::ElementMap;
use focus_core::ElementId;
use focus_overlay::{FocusHierarchy, FocusRequester, GeometryProbe};
use focus_ui_graphics::Rect;

use crate::events::HostEventBus;

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<ElementId>,
    rect: Option<Rect>,
    attached: bool,
    visible: bool,
}

#[derive(Default)]
struct SceneInner {
    nodes: IndexMap<ElementId, SceneNode>,
    children: ElementMap<Vec<ElementId>>,
    containers: HashSet<ElementId>,
    focused: Option<ElementId>,
    focus_requests: Vec<ElementId>,
}

/// Headless host tree: element geometry, parent links, delegating
/// containers and the currently focused element.
///
/// Moving focus announces the change on the attached [`HostEventBus`], the
/// way a host's global focus listener would.
#[derive(Default)]
pub struct SceneTree {
    inner: RefCell<SceneInner>,
    events: Option<HostEventBus>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: HostEventBus) -> Self {
        Self {
            inner: RefCell::default(),
            events: Some(events),
        }
    }

    pub fn add_element(&self, parent: Option<ElementId>, rect: Rect) -> ElementId {
        self.insert(parent, Some(rect), false)
    }

    /// Adds a list/grid style container that delegates focus to its selection.
    pub fn add_container(&self, parent: Option<ElementId>, rect: Rect) -> ElementId {
        self.insert(parent, Some(rect), true)
    }

    /// Adds an element that has not been laid out yet.
    pub fn add_unlaid_out(&self, parent: Option<ElementId>) -> ElementId {
        self.insert(parent, None, false)
    }

    fn insert(&self, parent: Option<ElementId>, rect: Option<Rect>, container: bool) -> ElementId {
        let id = ElementId::next();
        let mut inner = self.inner.borrow_mut();
        if let Some(parent) = parent {
            inner.children.entry(parent).or_default().push(id);
        }
        if container {
            inner.containers.insert(id);
        }
        inner.nodes.insert(
            id,
            SceneNode {
                parent,
                rect,
                attached: true,
                visible: true,
            },
        );
        id
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        if let Some(node) = self.inner.borrow_mut().nodes.get_mut(&element) {
            node.rect = Some(rect);
        }
    }

    pub fn set_visible(&self, element: ElementId, visible: bool) {
        if let Some(node) = self.inner.borrow_mut().nodes.get_mut(&element) {
            node.visible = visible;
        }
    }

    pub fn detach(&self, element: ElementId) {
        if let Some(node) = self.inner.borrow_mut().nodes.get_mut(&element) {
            node.attached = false;
        }
    }

    pub fn children_of(&self, parent: ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .children
            .get(&parent)
            .cloned()
            .unwrap_or_default()
    }

    /// Moves focus to `element` and announces `(old, new)` on the event bus.
    pub fn focus(&self, element: ElementId) {
        self.move_focus(Some(element));
    }

    pub fn clear_focus(&self) {
        self.move_focus(None);
    }

    fn move_focus(&self, new: Option<ElementId>) {
        let old = std::mem::replace(&mut self.inner.borrow_mut().focused, new);
        if old == new {
            return;
        }
        if let Some(events) = self.events.as_ref() {
            events.emit_focus_change(old, new);
        }
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.inner.borrow().focused
    }

    /// Elements passed to [`FocusRequester::request_focus`], in call order.
    pub fn focus_requests(&self) -> Vec<ElementId> {
        self.inner.borrow().focus_requests.clone()
    }
}

impl GeometryProbe for SceneTree {
    fn rectangle_of(&self, element: ElementId) -> Option<Rect> {
        let inner = self.inner.borrow();
        let node = inner.nodes.get(&element)?;
        if !node.attached {
            return None;
        }
        node.rect
    }

    fn is_visible(&self, element: ElementId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&element)
            .map(|node| node.attached && node.visible)
            .unwrap_or(false)
    }
}

impl FocusHierarchy for SceneTree {
    fn parent_of(&self, element: ElementId) -> Option<ElementId> {
        self.inner.borrow().nodes.get(&element)?.parent
    }

    fn is_delegating_container(&self, element: ElementId) -> bool {
        self.inner.borrow().containers.contains(&element)
    }

    fn has_focus(&self, element: ElementId) -> bool {
        let inner = self.inner.borrow();
        let mut current = inner.focused;
        while let Some(id) = current {
            if id == element {
                return true;
            }
            current = inner.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }
}

impl FocusRequester for SceneTree {
    fn request_focus(&self, element: ElementId) -> bool {
        let focusable = {
            let mut inner = self.inner.borrow_mut();
            inner.focus_requests.push(element);
            inner
                .nodes
                .get(&element)
                .map(|node| node.attached && node.visible)
                .unwrap_or(false)
        };
        if focusable {
            self.focus(element);
        }
        focusable
    }
}
