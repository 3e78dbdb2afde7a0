use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use focus_core::ElementId;
use focus_overlay::{
    FocusChangeSource, FocusObserver, LifecycleEvent, LifecycleObserver, LifecycleSource,
    ObserverId,
};

#[derive(Default)]
struct BusInner {
    next_id: u64,
    focus: IndexMap<ObserverId, FocusObserver>,
    lifecycle: IndexMap<ObserverId, LifecycleObserver>,
}

impl BusInner {
    fn allocate(&mut self) -> ObserverId {
        self.next_id += 1;
        ObserverId(self.next_id)
    }
}

/// In-process stand-in for a host screen's focus and lifecycle listeners.
///
/// Observers are snapshotted before each dispatch, so they may unsubscribe
/// while being notified.
#[derive(Clone, Default)]
pub struct HostEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl HostEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_focus_change(&self, old: Option<ElementId>, new: Option<ElementId>) {
        let observers: Vec<FocusObserver> = self.inner.borrow().focus.values().cloned().collect();
        log::trace!("focus {old:?} -> {new:?} to {} observer(s)", observers.len());
        for observer in observers {
            observer(old, new);
        }
    }

    pub fn emit_lifecycle(&self, event: LifecycleEvent) {
        let observers: Vec<LifecycleObserver> =
            self.inner.borrow().lifecycle.values().cloned().collect();
        for observer in observers {
            observer(event);
        }
    }

    pub fn focus_observer_count(&self) -> usize {
        self.inner.borrow().focus.len()
    }

    pub fn lifecycle_observer_count(&self) -> usize {
        self.inner.borrow().lifecycle.len()
    }
}

impl FocusChangeSource for HostEventBus {
    fn add_focus_observer(&self, observer: FocusObserver) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate();
        inner.focus.insert(id, observer);
        id
    }

    fn remove_focus_observer(&self, id: ObserverId) {
        self.inner.borrow_mut().focus.shift_remove(&id);
    }
}

impl LifecycleSource for HostEventBus {
    fn add_lifecycle_observer(&self, observer: LifecycleObserver) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate();
        inner.lifecycle.insert(id, observer);
        id
    }

    fn remove_lifecycle_observer(&self, id: ObserverId) {
        self.inner.borrow_mut().lifecycle.shift_remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[test]
    fn observer_may_unsubscribe_while_notified() {
        let bus = HostEventBus::new();
        let calls = Rc::new(Cell::new(0));
        let own_id = Rc::new(RefCell::new(None::<ObserverId>));
        let id = {
            let observer_bus = bus.clone();
            let calls = calls.clone();
            let own_id = own_id.clone();
            bus.add_lifecycle_observer(Rc::new(move |_event: LifecycleEvent| {
                calls.set(calls.get() + 1);
                if let Some(id) = *own_id.borrow() {
                    observer_bus.remove_lifecycle_observer(id);
                }
            }))
        };
        *own_id.borrow_mut() = Some(id);

        bus.emit_lifecycle(LifecycleEvent::Destroyed);
        bus.emit_lifecycle(LifecycleEvent::Destroyed);
        assert_eq!(calls.get(), 1);
        assert_eq!(bus.lifecycle_observer_count(), 0);
    }
}
