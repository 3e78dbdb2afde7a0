use std::cell::RefCell;
use std::rc::Rc;

use focus_core::TestRuntime;
use focus_ui_graphics::Rect;

use super::*;
use crate::animation::Easing;

fn recording_driver(runtime: &TestRuntime, initial: Rect) -> (AnimationDriver<Rect>, Rc<RefCell<Vec<Rect>>>) {
    let writes = Rc::new(RefCell::new(Vec::new()));
    let sink = writes.clone();
    let driver = AnimationDriver::new(initial, runtime.handle(), move |rect: &Rect| {
        sink.borrow_mut().push(*rect);
    });
    (driver, writes)
}

const R0: Rect = Rect::new(0.0, 0.0, 100.0, 50.0);
const R1: Rect = Rect::new(100.0, 0.0, 120.0, 60.0);
const R2: Rect = Rect::new(300.0, 40.0, 80.0, 40.0);

#[test]
fn completed_job_pins_exactly_to_target() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);

    driver.start(R0, R1, AnimationSpec::linear(200));
    assert_eq!(driver.state(), AnimationState::Running);
    runtime.run_turn();
    runtime.advance_millis(250, 16);

    assert_eq!(driver.state(), AnimationState::Idle);
    assert_eq!(driver.last_outcome(), Some(AnimationOutcome::Completed));
    assert_eq!(driver.current(), R1);
    let writes = writes.borrow();
    assert_eq!(writes.last(), Some(&R1));
    for rect in writes.iter() {
        assert!(rect.x >= R0.x && rect.x <= R1.x, "x overshot: {rect:?}");
        assert!(rect.width >= R0.width && rect.width <= R1.width);
    }
}

#[test]
fn halfway_tick_interpolates_linearly() {
    let runtime = TestRuntime::new();
    let (driver, _writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(200));
    runtime.run_turn();
    runtime.advance_millis(100, 50);
    assert_eq!(driver.current(), Rect::new(50.0, 0.0, 110.0, 55.0));
    assert_eq!(driver.target(), Some(R1));
}

#[test]
fn new_start_continues_from_interpolated_value() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(200));
    runtime.run_turn();
    runtime.advance_millis(100, 20);
    let midway = driver.current();
    assert!(midway.x > R0.x && midway.x < R1.x);

    let before_retarget = writes.borrow().len();
    driver.start(R1, R2, AnimationSpec::linear(200));
    assert_eq!(driver.job().map(|job| job.from), Some(midway));
    runtime.run_turn();
    runtime.advance_millis(300, 16);

    assert_eq!(driver.current(), R2);
    let writes = writes.borrow();
    let after = &writes[before_retarget..];
    assert_ne!(after.first(), Some(&midway));
    let mut previous_x = midway.x;
    for rect in after {
        assert!(rect.x >= previous_x, "regressed toward the old origin: {rect:?}");
        previous_x = rect.x;
    }
    assert_eq!(after.last(), Some(&R2));
}

#[test]
fn degenerate_job_schedules_nothing() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R1);
    driver.start(R1, R1, AnimationSpec::default());
    assert_eq!(driver.state(), AnimationState::Idle);
    assert!(!runtime.handle().has_frame_callbacks());
    runtime.advance_millis(300, 16);
    assert!(writes.borrow().is_empty());
    assert_eq!(driver.last_outcome(), Some(AnimationOutcome::Completed));
}

#[test]
fn cancel_leaves_last_applied_value() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(200));
    runtime.run_turn();
    runtime.advance_millis(40, 20);
    let count = writes.borrow().len();
    let last = driver.current();

    driver.cancel();
    runtime.advance_millis(400, 16);

    assert_eq!(driver.state(), AnimationState::Idle);
    assert_eq!(driver.last_outcome(), Some(AnimationOutcome::Cancelled));
    assert_eq!(writes.borrow().len(), count);
    assert_eq!(driver.current(), last);
    assert_ne!(last, R1);
}

#[test]
fn snap_to_applies_once_and_stops_ticking() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(200));
    driver.snap_to(R2);
    runtime.advance_millis(300, 16);
    assert_eq!(*writes.borrow(), vec![R2]);
    assert_eq!(driver.current(), R2);
}

#[test]
fn start_delay_holds_the_origin() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(100).with_delay(50));
    runtime.run_turn();
    runtime.advance_millis(40, 10);
    assert!(writes.borrow().is_empty());
    runtime.advance_millis(120, 10);
    assert_eq!(writes.borrow().last(), Some(&R1));
}

#[test]
fn eased_jobs_stay_within_bounds() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::tween(200, Easing::FastOutSlowIn));
    runtime.run_turn();
    runtime.advance_millis(220, 8);
    for rect in writes.borrow().iter() {
        assert!(rect.x >= R0.x && rect.x <= R1.x);
    }
    assert_eq!(driver.current(), R1);
}

#[test]
fn first_tick_does_not_rewrite_the_origin() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(200));
    runtime.run_turn();
    assert!(writes.borrow().is_empty());
    assert_eq!(driver.current(), R0);
    assert!(driver.is_running());

    runtime.advance_millis(16, 16);
    let writes = writes.borrow();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].x > R0.x);
}

#[test]
fn huge_duration_and_delay_tick_without_overflow() {
    let runtime = TestRuntime::new();
    let (driver, writes) = recording_driver(&runtime, R0);
    driver.start(R0, R1, AnimationSpec::linear(u64::MAX / 1000));
    runtime.run_turn();
    runtime.advance_millis(32, 16);
    assert!(driver.is_running());
    assert!(writes.borrow().iter().all(|rect| rect.x < R1.x));

    driver.start(R1, R2, AnimationSpec::linear(100).with_delay(u64::MAX / 1000));
    runtime.advance_millis(32, 16);
    assert!(driver.is_running());
    assert_eq!(driver.target(), Some(R2));
}
