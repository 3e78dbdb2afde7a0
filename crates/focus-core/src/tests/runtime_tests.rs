use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::collections::ElementMap;
use crate::{ElementId, TestRuntime, NANOS_PER_MILLI};

#[test]
fn spawned_tasks_run_in_order_on_drain() {
    let runtime = TestRuntime::new();
    let handle = runtime.handle();
    let log = Rc::new(RefCell::new(Vec::new()));
    for value in 0..3 {
        let log = log.clone();
        handle.spawn_task(Box::new(move || log.borrow_mut().push(value)));
    }
    assert!(handle.has_pending_tasks());
    assert!(runtime.runtime().needs_frame());
    handle.drain_tasks();
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
    assert!(!handle.has_pending_tasks());
}

#[test]
fn delayed_task_fires_once_after_deadline() {
    let runtime = TestRuntime::new();
    let fired = Rc::new(Cell::new(0u32));
    let registration = {
        let fired = fired.clone();
        runtime
            .handle()
            .post_delayed(50, move || fired.set(fired.get() + 1))
    };
    assert!(registration.is_active());
    assert_eq!(runtime.handle().next_deadline(), Some(50 * NANOS_PER_MILLI));

    runtime.advance_millis(49, 1);
    assert_eq!(fired.get(), 0);
    runtime.advance_millis(1, 1);
    assert_eq!(fired.get(), 1);
    assert!(!registration.is_active());
    runtime.advance_millis(100, 10);
    assert_eq!(fired.get(), 1);
    assert_eq!(runtime.handle().next_deadline(), None);
    drop(registration);
}

#[test]
fn huge_delay_saturates_instead_of_overflowing() {
    let runtime = TestRuntime::new();
    let fired = Rc::new(Cell::new(false));
    let registration = {
        let fired = fired.clone();
        runtime
            .handle()
            .post_delayed(u64::MAX / 1000, move || fired.set(true))
    };
    assert_eq!(runtime.handle().next_deadline(), Some(u64::MAX));

    runtime.advance_millis(1_000, 100);
    assert!(!fired.get());
    assert!(registration.is_active());
    assert!(registration.cancel());
}

#[test]
fn dropping_registration_cancels_delayed_task() {
    let runtime = TestRuntime::new();
    let fired = Rc::new(Cell::new(false));
    {
        let fired = fired.clone();
        let _registration = runtime.handle().post_delayed(10, move || fired.set(true));
    }
    runtime.advance_millis(20, 5);
    assert!(!fired.get());
}

#[test]
fn cancel_reports_whether_task_was_pending() {
    let runtime = TestRuntime::new();
    let pending = runtime.handle().post_delayed(10, || {});
    assert!(pending.cancel());

    let fired = runtime.handle().post_delayed(1, || {});
    runtime.advance_millis(2, 1);
    assert!(!fired.cancel());
}

#[test]
fn due_tasks_run_earliest_first() {
    let runtime = TestRuntime::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let late = {
        let order = order.clone();
        runtime.handle().post_delayed(30, move || order.borrow_mut().push("late"))
    };
    let early = {
        let order = order.clone();
        runtime.handle().post_delayed(10, move || order.borrow_mut().push("early"))
    };
    runtime.run_turn_at(40 * NANOS_PER_MILLI);
    assert_eq!(*order.borrow(), vec!["early", "late"]);
    drop((late, early));
}

#[test]
fn frame_callbacks_receive_frame_time_and_can_be_cancelled() {
    let runtime = TestRuntime::new();
    let clock = runtime.runtime().frame_clock();
    let seen = Rc::new(Cell::new(None));
    let registration = {
        let seen = seen.clone();
        clock.with_frame_millis(move |millis| seen.set(Some(millis)))
    };
    assert!(runtime.handle().has_frame_callbacks());
    runtime.run_turn_at(16 * NANOS_PER_MILLI);
    assert_eq!(seen.get(), Some(16));
    drop(registration);

    let cancelled = Rc::new(Cell::new(false));
    let registration = {
        let cancelled = cancelled.clone();
        clock.with_frame_nanos(move |_| cancelled.set(true))
    };
    registration.cancel();
    runtime.run_turn_at(32 * NANOS_PER_MILLI);
    assert!(!cancelled.get());
    assert!(!runtime.runtime().needs_frame());
}

#[test]
fn timeline_never_moves_backwards() {
    let runtime = TestRuntime::new();
    runtime.run_turn_at(100 * NANOS_PER_MILLI);
    runtime.run_turn_at(10 * NANOS_PER_MILLI);
    assert_eq!(runtime.now_millis(), 100);
}

#[test]
fn dead_runtime_registrations_are_inactive() {
    let handle = {
        let runtime = TestRuntime::new();
        runtime.handle()
    };
    assert!(!handle.is_alive());
    let registration = handle.post_delayed(5, || {});
    assert!(!registration.is_active());
    assert!(!handle.frame_clock().with_frame_nanos(|_| {}).is_active());
}

#[test]
fn element_map_is_keyed_by_handle() {
    let mut map: ElementMap<&str> = ElementMap::default();
    let first = ElementId::next();
    let second = ElementId::next();
    assert_ne!(first, second);
    map.insert(first, "grid");
    map.insert(second, "tile");
    assert_eq!(map.get(&first), Some(&"grid"));
    assert_eq!(format!("{}", ElementId(7)), "#7");
}
