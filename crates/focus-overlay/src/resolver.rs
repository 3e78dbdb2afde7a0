//! Maps raw focus notifications to the element the overlay should wrap.
//!
//! Two callers feed the resolver:
//!
//! * plain focus traversal (`resolve`), where a leaf sitting directly inside
//!   a delegating container is represented by the container as a whole, and
//! * the selection channel (`resolve_selection`), where a list/grid reports
//!   its newly selected child and the overlay wraps that child.
//!
//! Focus landing on a delegating container itself resolves to nothing; the
//! container announces its selected child through the selection channel.

use std::cell::OnceCell;

use focus_core::ElementId;
use focus_ui_graphics::Rect;

use crate::host::{FocusHierarchy, GeometryProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusOrigin {
    Traversal,
    Selection,
}

/// Effective target of one focus change, with its geometry read lazily.
#[derive(Debug, Clone)]
pub struct FocusTarget {
    element: ElementId,
    origin: FocusOrigin,
    rectangle: OnceCell<Option<Rect>>,
}

impl FocusTarget {
    pub fn new(element: ElementId, origin: FocusOrigin) -> Self {
        Self {
            element,
            origin,
            rectangle: OnceCell::new(),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn origin(&self) -> FocusOrigin {
        self.origin
    }

    /// Probes the element once; later calls return the cached answer.
    pub fn rectangle(&self, probe: &dyn GeometryProbe) -> Option<Rect> {
        *self
            .rectangle
            .get_or_init(|| probe.rectangle_of(self.element))
    }
}

impl PartialEq for FocusTarget {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element && self.origin == other.origin
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FocusResolver;

impl FocusResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        hierarchy: &dyn FocusHierarchy,
        old: Option<ElementId>,
        new: Option<ElementId>,
    ) -> Option<FocusTarget> {
        let new = new?;
        if hierarchy.is_delegating_container(new) {
            log::trace!("focus {old:?} -> {new} lands on a delegating container; awaiting selection");
            return None;
        }
        let element = match hierarchy.parent_of(new) {
            Some(parent) if hierarchy.is_delegating_container(parent) => parent,
            _ => new,
        };
        Some(FocusTarget::new(element, FocusOrigin::Traversal))
    }

    pub fn resolve_selection(&self, selected: ElementId) -> FocusTarget {
        FocusTarget::new(selected, FocusOrigin::Selection)
    }
}
