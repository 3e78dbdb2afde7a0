use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;
use crate::{FrameCallbackId, TaskId, NANOS_PER_MILLI};

type Task = Box<dyn FnOnce() + 'static>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    now_nanos: Cell<u64>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    pending_tasks: RefCell<VecDeque<Task>>,
    delayed_tasks: RefCell<Vec<DelayedTaskEntry>>,
    next_task_id: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            now_nanos: Cell::new(0),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            pending_tasks: RefCell::new(VecDeque::new()),
            delayed_tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn advance_to(&self, time_nanos: u64) {
        // The timeline never runs backwards, even if a host reports a stale timestamp.
        if time_nanos > self.now_nanos.get() {
            self.now_nanos.set(time_nanos);
        }
    }

    fn enqueue_task(&self, task: Task) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn drain_tasks(&self) {
        let tasks: Vec<Task> = {
            let mut pending = self.pending_tasks.borrow_mut();
            pending.drain(..).collect()
        };
        for task in tasks {
            task();
        }
    }

    fn has_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty()
    }

    fn post_delayed(&self, delay_nanos: u64, task: Task) -> TaskId {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        let due_nanos = self.now_nanos.get().saturating_add(delay_nanos);
        self.delayed_tasks.borrow_mut().push(DelayedTaskEntry {
            id,
            due_nanos,
            task,
        });
        self.scheduler.schedule_wakeup(due_nanos);
        id
    }

    fn cancel_delayed(&self, id: TaskId) -> bool {
        let mut delayed = self.delayed_tasks.borrow_mut();
        match delayed.iter().position(|entry| entry.id == id) {
            Some(index) => {
                delayed.remove(index);
                true
            }
            None => false,
        }
    }

    fn run_due_tasks(&self, now_nanos: u64) -> usize {
        self.advance_to(now_nanos);
        let now = self.now_nanos.get();
        let mut due: Vec<DelayedTaskEntry> = {
            let mut delayed = self.delayed_tasks.borrow_mut();
            let (ready, waiting): (Vec<_>, Vec<_>) =
                delayed.drain(..).partition(|entry| entry.due_nanos <= now);
            *delayed = waiting;
            ready
        };
        due.sort_by_key(|entry| (entry.due_nanos, entry.id));
        let count = due.len();
        if count > 0 {
            log::trace!("running {count} delayed task(s) at {now}ns");
        }
        for entry in due {
            (entry.task)();
        }
        count
    }

    fn is_delayed_pending(&self, id: TaskId) -> bool {
        self.delayed_tasks.borrow().iter().any(|entry| entry.id == id)
    }

    fn next_deadline(&self) -> Option<u64> {
        self.delayed_tasks
            .borrow()
            .iter()
            .map(|entry| entry.due_nanos)
            .min()
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty()
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
            callbacks.remove(index);
        }
        if callbacks.is_empty() && !self.has_tasks() {
            self.needs_frame.set(false);
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        self.advance_to(frame_time_nanos);
        let mut callbacks = self.frame_callbacks.borrow_mut();
        let mut pending: Vec<Box<dyn FnOnce(u64) + 'static>> = Vec::with_capacity(callbacks.len());
        while let Some(mut entry) = callbacks.pop_front() {
            if let Some(callback) = entry.callback.take() {
                pending.push(callback);
            }
        }
        drop(callbacks);
        for callback in pending {
            callback(frame_time_nanos);
        }
        if !self.has_tasks() && !self.has_frame_callbacks() {
            self.needs_frame.set(false);
        }
    }
}

/// Owner of the UI-thread work queues.
///
/// Everything runs cooperatively on one thread: turn tasks, one-shot delayed
/// tasks and frame callbacks are drained by the host loop in that order.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }

    pub fn now_nanos(&self) -> u64 {
        self.inner.now_nanos.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(any(test, feature = "test-runtime"))]
#[derive(Default)]
pub struct TestScheduler;

#[cfg(any(test, feature = "test-runtime"))]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {}
}

/// Runtime with a manually advanced timeline, for deterministic tests.
#[cfg(any(test, feature = "test-runtime"))]
pub struct TestRuntime {
    runtime: Runtime,
}

#[cfg(any(test, feature = "test-runtime"))]
impl TestRuntime {
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new(Arc::new(TestScheduler)),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn now_millis(&self) -> u64 {
        self.runtime.now_nanos() / NANOS_PER_MILLI
    }

    /// Runs one event-loop turn at the current time.
    pub fn run_turn(&self) {
        let now = self.runtime.now_nanos();
        self.run_turn_at(now);
    }

    /// Moves the clock to `time_nanos` and runs one turn there.
    pub fn run_turn_at(&self, time_nanos: u64) {
        let handle = self.handle();
        handle.drain_tasks();
        handle.run_due_tasks(time_nanos);
        handle.drain_tasks();
        handle.drain_frame_callbacks(time_nanos);
        handle.drain_tasks();
    }

    /// Advances the clock by `millis` in steps of `step_millis`, running a
    /// turn at every step.
    pub fn advance_millis(&self, millis: u64, step_millis: u64) {
        let step = step_millis.max(1);
        let target = self
            .runtime
            .now_nanos()
            .saturating_add(millis.saturating_mul(NANOS_PER_MILLI));
        loop {
            let now = self.runtime.now_nanos();
            if now >= target {
                break;
            }
            let next = (now + step * NANOS_PER_MILLI).min(target);
            self.run_turn_at(next);
        }
    }
}

#[cfg(any(test, feature = "test-runtime"))]
impl Default for TestRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule();
        }
    }

    pub fn now_nanos(&self) -> u64 {
        self.0
            .upgrade()
            .map(|inner| inner.now_nanos.get())
            .unwrap_or(0)
    }

    /// Queues `task` to run at the end of the current turn.
    pub fn spawn_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.0.upgrade() {
            inner.enqueue_task(task);
        } else {
            task();
        }
    }

    pub fn drain_tasks(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.drain_tasks();
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    /// Schedules `task` once, `delay_millis` after the runtime's current time.
    ///
    /// Dropping the returned registration cancels the task. Returns an
    /// inactive registration, and never runs the task, once the runtime is gone.
    pub fn post_delayed(
        &self,
        delay_millis: u64,
        task: impl FnOnce() + 'static,
    ) -> TaskRegistration {
        match self.0.upgrade() {
            Some(inner) => {
                let id = inner.post_delayed(
                    delay_millis.saturating_mul(NANOS_PER_MILLI),
                    Box::new(task),
                );
                TaskRegistration {
                    runtime: self.clone(),
                    id: Some(id),
                }
            }
            None => TaskRegistration {
                runtime: self.clone(),
                id: None,
            },
        }
    }

    pub(crate) fn cancel_delayed(&self, id: TaskId) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.cancel_delayed(id))
            .unwrap_or(false)
    }

    pub(crate) fn is_delayed_pending(&self, id: TaskId) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.is_delayed_pending(id))
            .unwrap_or(false)
    }

    /// Runs every delayed task due at or before `now_nanos`, earliest first.
    pub fn run_due_tasks(&self, now_nanos: u64) -> usize {
        self.0
            .upgrade()
            .map(|inner| inner.run_due_tasks(now_nanos))
            .unwrap_or(0)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.0.upgrade().and_then(|inner| inner.next_deadline())
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.0
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.0.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.0.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub fn set_needs_frame(&self, value: bool) {
        if let Some(inner) = self.0.upgrade() {
            inner.needs_frame.set(value);
        }
    }
}

pub(crate) struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct DelayedTaskEntry {
    id: TaskId,
    due_nanos: u64,
    task: Task,
}

/// Handle to a one-shot delayed task; cancels the task when dropped.
pub struct TaskRegistration {
    runtime: RuntimeHandle,
    id: Option<TaskId>,
}

impl TaskRegistration {
    /// Whether the task is still waiting to run.
    pub fn is_active(&self) -> bool {
        self.id
            .map(|id| self.runtime.is_delayed_pending(id))
            .unwrap_or(false)
    }

    /// Cancels the task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(mut self) -> bool {
        match self.id.take() {
            Some(id) => self.runtime.cancel_delayed(id),
            None => false,
        }
    }
}

impl Drop for TaskRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_delayed(id);
        }
    }
}
