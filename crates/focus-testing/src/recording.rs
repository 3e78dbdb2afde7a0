use std::cell::RefCell;
use std::rc::Rc;

use focus_overlay::{OverlayElement, OverlayHandle, OverlayHost};
use focus_ui_graphics::Rect;

/// Overlay widget that remembers every rectangle written to it.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    rect: Rect,
    visible: bool,
    writes: Vec<Rect>,
    visibility_changes: usize,
}

impl RecordingOverlay {
    pub fn writes(&self) -> &[Rect] {
        &self.writes
    }

    pub fn visibility_changes(&self) -> usize {
        self.visibility_changes
    }
}

impl OverlayElement for RecordingOverlay {
    fn set_rectangle(&mut self, rect: Rect) {
        self.rect = rect;
        self.writes.push(rect);
    }

    fn rectangle(&self) -> Rect {
        self.rect
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.visibility_changes += 1;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Host root container that hands out [`RecordingOverlay`]s.
#[derive(Default)]
pub struct RecordingHost {
    created: RefCell<Vec<Rc<RefCell<RecordingOverlay>>>>,
    root_children: RefCell<Vec<OverlayHandle>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn root_child_count(&self) -> usize {
        self.root_children.borrow().len()
    }

    /// Most recently created overlay.
    pub fn overlay(&self) -> Option<Rc<RefCell<RecordingOverlay>>> {
        self.created.borrow().last().cloned()
    }

    pub fn overlay_rect(&self) -> Option<Rect> {
        self.overlay().map(|overlay| overlay.borrow().rectangle())
    }

    pub fn overlay_visible(&self) -> Option<bool> {
        self.overlay().map(|overlay| overlay.borrow().is_visible())
    }

    pub fn writes(&self) -> Vec<Rect> {
        self.overlay()
            .map(|overlay| overlay.borrow().writes().to_vec())
            .unwrap_or_default()
    }
}

impl OverlayHost for RecordingHost {
    fn create_overlay(&self) -> OverlayHandle {
        let overlay = Rc::new(RefCell::new(RecordingOverlay::default()));
        self.created.borrow_mut().push(overlay.clone());
        overlay
    }

    fn insert_into_root(&self, overlay: &OverlayHandle) {
        self.root_children.borrow_mut().push(overlay.clone());
    }
}
