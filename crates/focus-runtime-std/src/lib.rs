//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `focus-core`. Hosts construct a
//! [`StdRuntime`], hand its [`RuntimeHandle`] to the overlay engine and call
//! [`StdRuntime::pump`] from their event loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use focus_core::{Clock, FrameClock, Runtime, RuntimeHandle, RuntimeScheduler};

const NO_WAKEUP: u64 = u64::MAX;

type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records frame and wakeup requests for a polling host loop.
pub struct StdScheduler {
    frame_requested: AtomicBool,
    wakeup_deadline: AtomicU64,
    frame_waker: RwLock<Option<Waker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
            wakeup_deadline: AtomicU64::new(NO_WAKEUP),
            frame_waker: RwLock::new(None),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }

    /// Earliest wakeup deadline requested since the last call, on the
    /// runtime's timeline.
    pub fn take_wakeup_deadline(&self) -> Option<u64> {
        match self.wakeup_deadline.swap(NO_WAKEUP, Ordering::SeqCst) {
            NO_WAKEUP => None,
            deadline => Some(deadline),
        }
    }

    /// Registers a waker that will be invoked whenever new work is scheduled.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    pub fn clear_frame_waker(&self) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .frame_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "frame_requested",
                &self.frame_requested.load(Ordering::SeqCst),
            )
            .field(
                "wakeup_deadline",
                &self.wakeup_deadline.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
        self.wake();
    }

    fn schedule_wakeup(&self, deadline_nanos: u64) {
        self.wakeup_deadline
            .fetch_min(deadline_nanos, Ordering::SeqCst);
        self.wake();
    }
}

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        since.elapsed().as_millis() as u64
    }
}

impl StdClock {
    pub fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}

/// Runtime whose timeline is wall-clock time since construction.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    clock: Arc<StdClock>,
    started: Instant,
    runtime: Runtime,
}

impl StdRuntime {
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        let clock = Arc::new(StdClock);
        Self {
            started: clock.now(),
            scheduler,
            clock,
            runtime,
        }
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_clock(&self) -> FrameClock {
        self.runtime.frame_clock()
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    /// Nanoseconds elapsed on the runtime's timeline.
    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.clock.elapsed(self.started).as_nanos()).unwrap_or(u64::MAX)
    }

    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_frame_waker(waker);
    }

    pub fn clear_frame_waker(&self) {
        self.scheduler.clear_frame_waker();
    }

    /// Runs one event-loop turn at the current wall-clock time: queued
    /// tasks, due delayed tasks, then frame callbacks if a frame was
    /// requested. Returns whether more work is already waiting.
    pub fn pump(&self) -> bool {
        let handle = self.runtime_handle();
        let now = self.elapsed_nanos();
        handle.drain_tasks();
        let ran = handle.run_due_tasks(now);
        handle.drain_tasks();
        if self.take_frame_request() || handle.has_frame_callbacks() {
            handle.drain_frame_callbacks(now);
            handle.drain_tasks();
        }
        if ran > 0 {
            log::trace!("pump at {now}ns ran {ran} delayed task(s)");
        }
        self.runtime.needs_frame() || handle.has_pending_tasks()
    }

    /// Time the host may sleep before the next delayed task is due, or
    /// `None` when nothing is scheduled.
    pub fn time_until_next_deadline(&self) -> Option<Duration> {
        let deadline = self.runtime_handle().next_deadline()?;
        Some(Duration::from_nanos(
            deadline.saturating_sub(self.elapsed_nanos()),
        ))
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        self.runtime_handle()
            .drain_frame_callbacks(frame_time_nanos);
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}
