#![doc = r"Core runtime pieces for the focus overlay engine."]

pub mod collections;
pub mod element;
pub mod frame_clock;
pub mod platform;
pub mod runtime;

pub use element::ElementId;
pub use frame_clock::{FrameCallbackRegistration, FrameClock};
pub use platform::{Clock, RuntimeScheduler};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, TaskRegistration};

#[cfg(any(test, feature = "test-runtime"))]
pub use runtime::{TestRuntime, TestScheduler};

pub(crate) type FrameCallbackId = u64;
pub(crate) type TaskId = u64;

pub const NANOS_PER_MILLI: u64 = 1_000_000;

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
