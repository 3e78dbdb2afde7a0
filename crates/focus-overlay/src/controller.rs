//! Screen-level composition of resolver, synchronizer and host event sources.
//!
//! A [`FocusOverlay`] is created once per host screen. It subscribes to the
//! screen's focus-change and lifecycle sources, resolves every notification,
//! and applies at most one resolved target per event-loop turn: resolutions
//! queued within the same turn are coalesced, with a target reported through
//! the selection channel taking precedence over a traversal target.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use focus_animation::Easing;
use focus_core::{ElementId, RuntimeHandle, TaskRegistration};
use focus_ui_graphics::{Density, Rect};

use crate::config::OverlayConfig;
use crate::error::{ConfigError, OverlayError};
use crate::host::{
    FocusChangeSource, FocusHierarchy, FocusRequester, GeometryProbe, LifecycleEvent,
    LifecycleSource, ObserverId, OverlayHandle, OverlayHost,
};
use crate::resolver::{FocusOrigin, FocusResolver, FocusTarget};
use crate::synchronizer::{OverlaySynchronizer, SyncOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type FocusListener = Rc<dyn Fn(Option<ElementId>, Option<ElementId>)>;

/// Host collaborators consumed by a [`FocusOverlay`].
#[derive(Clone)]
pub struct HostCapabilities {
    pub probe: Rc<dyn GeometryProbe>,
    pub hierarchy: Rc<dyn FocusHierarchy>,
    pub host: Rc<dyn OverlayHost>,
    pub requester: Option<Rc<dyn FocusRequester>>,
}

struct Bindings {
    focus_source: Rc<dyn FocusChangeSource>,
    focus_observer: ObserverId,
    lifecycle_source: Rc<dyn LifecycleSource>,
    lifecycle_observer: ObserverId,
}

impl Bindings {
    fn detach(self) {
        self.focus_source.remove_focus_observer(self.focus_observer);
        self.lifecycle_source
            .remove_lifecycle_observer(self.lifecycle_observer);
    }
}

struct ControllerInner {
    synchronizer: OverlaySynchronizer,
    resolver: FocusResolver,
    hierarchy: Rc<dyn FocusHierarchy>,
    requester: Option<Rc<dyn FocusRequester>>,
    runtime: RuntimeHandle,
    listeners: IndexMap<ListenerId, FocusListener>,
    next_listener_id: u64,
    pending: Option<FocusTarget>,
    flush_scheduled: bool,
    focused: Option<ElementId>,
    initial_focus: Option<ElementId>,
    focus_request: Option<TaskRegistration>,
    bindings: Option<Bindings>,
    disposed: bool,
}

impl ControllerInner {
    fn ensure_active(&self, operation: &'static str) -> Result<(), OverlayError> {
        if self.disposed {
            log::error!("{operation} called on a focus overlay after teardown");
            return Err(OverlayError::Disposed);
        }
        Ok(())
    }

    /// Stores `target` for the end-of-turn flush. Returns whether a flush
    /// task still has to be spawned.
    fn enqueue(&mut self, target: FocusTarget) -> bool {
        match &self.pending {
            Some(pending)
                if pending.origin() == FocusOrigin::Selection
                    && target.origin() == FocusOrigin::Traversal =>
            {
                log::trace!(
                    "keeping selected {} over traversal target {}",
                    pending.element(),
                    target.element()
                );
            }
            _ => self.pending = Some(target),
        }
        !std::mem::replace(&mut self.flush_scheduled, true)
    }

    fn listeners(&self) -> Vec<FocusListener> {
        self.listeners.values().cloned().collect()
    }

    fn schedule_focus_request(&mut self, element: ElementId) {
        let Some(requester) = self.requester.clone() else {
            log::warn!("no focus requester; cannot focus {element}");
            return;
        };
        let delay = self.synchronizer.config().initial_focus_delay_millis();
        let registration = self.runtime.post_delayed(delay, move || {
            if !requester.request_focus(element) {
                log::debug!("delayed focus request for {element} was declined");
            }
        });
        self.focus_request = Some(registration);
    }
}

#[derive(Clone)]
pub struct FocusOverlay {
    inner: Rc<RefCell<ControllerInner>>,
}

impl FocusOverlay {
    pub fn new(
        capabilities: HostCapabilities,
        config: OverlayConfig,
        runtime: RuntimeHandle,
    ) -> Result<Self, ConfigError> {
        let HostCapabilities {
            probe,
            hierarchy,
            host,
            requester,
        } = capabilities;
        let synchronizer = OverlaySynchronizer::new(config, probe, host, runtime.clone())?;
        let inner = ControllerInner {
            synchronizer,
            resolver: FocusResolver::new(),
            hierarchy,
            requester,
            runtime,
            listeners: IndexMap::new(),
            next_listener_id: 1,
            pending: None,
            flush_scheduled: false,
            focused: None,
            initial_focus: None,
            focus_request: None,
            bindings: None,
            disposed: false,
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    /// Subscribes to the host's focus and lifecycle sources. Rebinding
    /// detaches the previous pair first.
    pub fn bind(
        &self,
        focus_source: Rc<dyn FocusChangeSource>,
        lifecycle_source: Rc<dyn LifecycleSource>,
    ) -> Result<(), OverlayError> {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            inner.ensure_active("bind")?;
            inner.bindings.take()
        };
        if let Some(previous) = previous {
            previous.detach();
        }

        let weak = Rc::downgrade(&self.inner);
        let on_focus = move |old: Option<ElementId>, new: Option<ElementId>| {
            if let Some(overlay) = Self::upgrade(&weak) {
                // Already logged inside; observers have nowhere to report to.
                let _ = overlay.on_focus_changed(old, new);
            }
        };
        let focus_observer = focus_source.add_focus_observer(Rc::new(on_focus));

        let weak = Rc::downgrade(&self.inner);
        let on_lifecycle = move |event: LifecycleEvent| {
            if let Some(overlay) = Self::upgrade(&weak) {
                let _ = overlay.on_lifecycle_event(event);
            }
        };
        let lifecycle_observer = lifecycle_source.add_lifecycle_observer(Rc::new(on_lifecycle));

        self.inner.borrow_mut().bindings = Some(Bindings {
            focus_source,
            focus_observer,
            lifecycle_source,
            lifecycle_observer,
        });
        Ok(())
    }

    fn upgrade(weak: &Weak<RefCell<ControllerInner>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Entry point for the host's global focus-change notification.
    pub fn on_focus_changed(
        &self,
        old: Option<ElementId>,
        new: Option<ElementId>,
    ) -> Result<(), OverlayError> {
        let (target, listeners) = {
            let inner = self.inner.borrow();
            inner.ensure_active("on_focus_changed")?;
            match inner.resolver.resolve(inner.hierarchy.as_ref(), old, new) {
                Some(target) => (target, inner.listeners()),
                None => return Ok(()),
            }
        };
        for listener in listeners {
            listener(old, new);
        }
        self.enqueue(target)
    }

    /// Entry point for list/grid containers whose selected child changed.
    pub fn on_selection_changed(
        &self,
        container: ElementId,
        selected: Option<ElementId>,
    ) -> Result<(), OverlayError> {
        let (target, listeners) = {
            let inner = self.inner.borrow();
            inner.ensure_active("on_selection_changed")?;
            if !inner.hierarchy.has_focus(container) {
                log::trace!("ignoring selection in unfocused container {container}");
                return Ok(());
            }
            let Some(selected) = selected else {
                return Ok(());
            };
            (inner.resolver.resolve_selection(selected), inner.listeners())
        };
        for listener in listeners {
            listener(None, Some(container));
        }
        self.enqueue(target)
    }

    fn enqueue(&self, target: FocusTarget) -> Result<(), OverlayError> {
        let (spawn, runtime) = {
            let mut inner = self.inner.borrow_mut();
            inner.ensure_active("enqueue")?;
            (inner.enqueue(target), inner.runtime.clone())
        };
        if spawn {
            let weak = Rc::downgrade(&self.inner);
            runtime.spawn_task(Box::new(move || {
                if let Some(overlay) = Self::upgrade(&weak) {
                    overlay.flush();
                }
            }));
        }
        Ok(())
    }

    /// Applies the pending resolution now instead of at the end of the turn.
    pub fn flush(&self) -> Option<SyncOutcome> {
        let mut inner = self.inner.borrow_mut();
        inner.flush_scheduled = false;
        let target = inner.pending.take()?;
        if inner.disposed {
            return None;
        }
        let element = target.element();
        match inner.synchronizer.on_focus_resolved(Some(target)) {
            Ok(outcome) => {
                inner.focused = Some(element);
                Some(outcome)
            }
            Err(err) => {
                log::error!("failed to move focus overlay to {element}: {err}");
                None
            }
        }
    }

    pub fn has_pending_resolution(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    pub fn on_lifecycle_event(&self, event: LifecycleEvent) -> Result<(), OverlayError> {
        match event {
            LifecycleEvent::BecameVisible => self.on_became_visible(),
            LifecycleEvent::BecameHidden => self.on_became_hidden(),
            LifecycleEvent::Destroyed => self.teardown(),
        }
    }

    /// Shows the overlay and, if an initial focus element is set, focuses it
    /// after the configured delay so the host's first layout pass has run.
    pub fn on_became_visible(&self) -> Result<(), OverlayError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_active("on_became_visible")?;
        inner.synchronizer.show_overlay()?;
        if let Some(element) = inner.initial_focus {
            inner.schedule_focus_request(element);
        }
        Ok(())
    }

    pub fn on_became_hidden(&self) -> Result<(), OverlayError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_active("on_became_hidden")?;
        inner.focus_request = None;
        inner.synchronizer.hide_overlay()
    }

    /// Detaches from the host sources, cancels pending work and releases the
    /// overlay. Must be called exactly once, when the host screen is destroyed.
    pub fn teardown(&self) -> Result<(), OverlayError> {
        let bindings = {
            let mut inner = self.inner.borrow_mut();
            inner.ensure_active("teardown")?;
            inner.disposed = true;
            inner.focus_request = None;
            inner.pending = None;
            inner.listeners.clear();
            inner.synchronizer.teardown()?;
            inner.bindings.take()
        };
        if let Some(bindings) = bindings {
            bindings.detach();
        }
        Ok(())
    }

    pub fn show_overlay(&self) -> Result<(), OverlayError> {
        self.inner.borrow_mut().synchronizer.show_overlay()
    }

    pub fn hide_overlay(&self) -> Result<(), OverlayError> {
        self.inner.borrow_mut().synchronizer.hide_overlay()
    }

    /// Element focused after the screen becomes visible.
    pub fn set_initial_focus(&self, element: Option<ElementId>) -> Result<(), OverlayError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_active("set_initial_focus")?;
        inner.initial_focus = element;
        Ok(())
    }

    /// Requests focus on `element` after the initial-focus delay, replacing
    /// any request still waiting.
    pub fn request_focus_delayed(&self, element: ElementId) -> Result<(), OverlayError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_active("request_focus_delayed")?;
        inner.schedule_focus_request(element);
        Ok(())
    }

    pub fn has_pending_focus_request(&self) -> bool {
        self.inner
            .borrow()
            .focus_request
            .as_ref()
            .map(TaskRegistration::is_active)
            .unwrap_or(false)
    }

    pub fn add_focus_listener(
        &self,
        listener: impl Fn(Option<ElementId>, Option<ElementId>) + 'static,
    ) -> Result<ListenerId, OverlayError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_active("add_focus_listener")?;
        let id = ListenerId(inner.next_listener_id);
        inner.next_listener_id += 1;
        inner.listeners.insert(id, Rc::new(listener));
        Ok(id)
    }

    pub fn remove_focus_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.shift_remove(&id).is_some()
    }

    pub fn configure_margins(
        &self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Result<(), OverlayError> {
        self.inner
            .borrow_mut()
            .synchronizer
            .configure_margins(left, top, right, bottom)
    }

    pub fn set_animation_duration(&self, duration_millis: u64) -> Result<(), OverlayError> {
        self.inner
            .borrow_mut()
            .synchronizer
            .set_animation_duration(duration_millis)
    }

    pub fn set_animations_enabled(&self, enabled: bool) -> Result<(), OverlayError> {
        self.inner
            .borrow_mut()
            .synchronizer
            .set_animations_enabled(enabled)
    }

    pub fn set_easing(&self, easing: Easing) -> Result<(), OverlayError> {
        self.inner.borrow_mut().synchronizer.set_easing(easing)
    }

    pub fn set_density(&self, density: Density) -> Result<(), OverlayError> {
        self.inner.borrow_mut().synchronizer.set_density(density)
    }

    pub fn config(&self) -> OverlayConfig {
        *self.inner.borrow().synchronizer.config()
    }

    /// Element the overlay was last asked to wrap.
    pub fn focused_element(&self) -> Option<ElementId> {
        self.inner.borrow().focused
    }

    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.inner.borrow().synchronizer.overlay()
    }

    pub fn overlay_rectangle(&self) -> Option<Rect> {
        self.inner.borrow().synchronizer.overlay_rectangle()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().synchronizer.is_animating()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.borrow().bindings.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }
}

impl fmt::Debug for FocusOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FocusOverlay")
            .field("synchronizer", &inner.synchronizer)
            .field("focused", &inner.focused)
            .field("pending", &inner.pending)
            .field("listeners", &inner.listeners.len())
            .field("bound", &inner.bindings.is_some())
            .field("disposed", &inner.disposed)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
