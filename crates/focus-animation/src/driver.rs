//! Single-job tween driver.
//!
//! An [`AnimationDriver`] owns at most one live [`AnimationJob`]. Every frame
//! tick interpolates the job and hands the value to the driver's sink; a new
//! [`start`](AnimationDriver::start) supersedes whatever is in flight and
//! continues from the value last applied.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use focus_core::{FrameCallbackRegistration, RuntimeHandle, NANOS_PER_MILLI};

use crate::animation::{AnimationSpec, Lerp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
}

/// How the most recent job left the `Running` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationOutcome {
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationJob<T> {
    pub from: T,
    pub to: T,
    /// Fixed by the first frame tick after the job starts.
    pub start_time_nanos: Option<u64>,
    pub spec: AnimationSpec,
}

type Sink<T> = Rc<dyn Fn(&T)>;

struct DriverInner<T> {
    runtime: RuntimeHandle,
    current: T,
    job: Option<AnimationJob<T>>,
    registration: Option<FrameCallbackRegistration>,
    sink: Sink<T>,
    last_outcome: Option<AnimationOutcome>,
}

pub struct AnimationDriver<T: Lerp + Clone + PartialEq + 'static> {
    inner: Rc<RefCell<DriverInner<T>>>,
}

impl<T: Lerp + Clone + PartialEq + 'static> AnimationDriver<T> {
    /// Creates an idle driver resting at `initial`; every interpolated value
    /// is passed to `apply`.
    pub fn new(initial: T, runtime: RuntimeHandle, apply: impl Fn(&T) + 'static) -> Self {
        let inner = DriverInner {
            runtime,
            current: initial,
            job: None,
            registration: None,
            sink: Rc::new(apply),
            last_outcome: None,
        };
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Starts interpolating towards `to`.
    ///
    /// While idle the job starts at `from`. While running, `from` is ignored
    /// and the job starts at the current interpolated value, so rapid
    /// retargeting never snaps back. A job whose start equals its target is
    /// complete immediately and schedules nothing.
    pub fn start(&self, from: T, to: T, spec: AnimationSpec) {
        let should_schedule = {
            let mut inner = self.inner.borrow_mut();
            if let Some(registration) = inner.registration.take() {
                registration.cancel();
            }
            let from = match inner.job.take() {
                Some(_) => inner.current.clone(),
                None => from,
            };
            if from == to {
                inner.current = to;
                inner.last_outcome = Some(AnimationOutcome::Completed);
                false
            } else {
                inner.current = from.clone();
                inner.job = Some(AnimationJob {
                    from,
                    to,
                    start_time_nanos: None,
                    spec,
                });
                true
            }
        };

        if should_schedule {
            Self::schedule_frame(&self.inner);
        }
    }

    /// Stops ticking and leaves the sink at the last applied value.
    pub fn cancel(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some(registration) = inner.registration.take() {
            registration.cancel();
        }
        if inner.job.take().is_some() {
            inner.last_outcome = Some(AnimationOutcome::Cancelled);
        }
    }

    /// Cancels any job and applies `value` immediately.
    pub fn snap_to(&self, value: T) {
        let sink = {
            let mut inner = self.inner.borrow_mut();
            if let Some(registration) = inner.registration.take() {
                registration.cancel();
            }
            if inner.job.take().is_some() {
                inner.last_outcome = Some(AnimationOutcome::Cancelled);
            }
            inner.current = value.clone();
            inner.sink.clone()
        };
        sink(&value);
    }

    pub fn state(&self) -> AnimationState {
        if self.inner.borrow().job.is_some() {
            AnimationState::Running
        } else {
            AnimationState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    /// Value most recently applied (or the resting value when idle).
    pub fn current(&self) -> T {
        self.inner.borrow().current.clone()
    }

    pub fn target(&self) -> Option<T> {
        self.inner.borrow().job.as_ref().map(|job| job.to.clone())
    }

    pub fn job(&self) -> Option<AnimationJob<T>> {
        self.inner.borrow().job.clone()
    }

    pub fn last_outcome(&self) -> Option<AnimationOutcome> {
        self.inner.borrow().last_outcome
    }

    fn schedule_frame(this: &Rc<RefCell<DriverInner<T>>>) {
        let runtime = {
            let inner = this.borrow();
            if inner.registration.is_some() {
                return;
            }
            inner.runtime.clone()
        };
        let weak = Rc::downgrade(this);
        let registration = runtime.frame_clock().with_frame_nanos(move |time| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, time);
            }
        });
        this.borrow_mut().registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<DriverInner<T>>>, frame_time_nanos: u64) {
        let (applied, schedule_next, sink) = {
            let mut inner = this.borrow_mut();
            inner.registration = None;
            let sink = inner.sink.clone();
            let Some(job) = inner.job.as_mut() else {
                return;
            };

            let start_time = *job.start_time_nanos.get_or_insert(frame_time_nanos);
            let elapsed_nanos = frame_time_nanos.saturating_sub(start_time);
            let delay_nanos = job.spec.delay_millis.saturating_mul(NANOS_PER_MILLI);

            if elapsed_nanos < delay_nanos {
                (None, true, sink)
            } else {
                let duration_nanos = job
                    .spec
                    .duration_millis
                    .saturating_mul(NANOS_PER_MILLI)
                    .max(1);
                let linear_progress =
                    ((elapsed_nanos - delay_nanos) as f64 / duration_nanos as f64).clamp(0.0, 1.0)
                        as f32;
                if linear_progress >= 1.0 {
                    // Pin to the exact target instead of the last lerp result.
                    let target = job.to.clone();
                    inner.job = None;
                    inner.current = target.clone();
                    inner.last_outcome = Some(AnimationOutcome::Completed);
                    (Some(target), false, sink)
                } else {
                    let progress = job.spec.easing.transform(linear_progress);
                    let value = job.from.lerp(&job.to, progress);
                    // The first frame lands on `from`, which the sink already shows.
                    let changed = value != inner.current;
                    inner.current = value.clone();
                    (changed.then_some(value), true, sink)
                }
            }
        };

        if let Some(value) = applied {
            sink(&value);
        }
        if schedule_next {
            Self::schedule_frame(this);
        }
    }
}

impl<T: Lerp + Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for AnimationDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AnimationDriver")
            .field("current", &inner.current)
            .field("job", &inner.job)
            .field("last_outcome", &inner.last_outcome)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
