//! Platform abstraction traits for the runtime.
//!
//! These traits let the runtime delegate frame scheduling and timing to the
//! host event loop without depending directly on `std` time APIs.

/// Wakes the host event loop on behalf of the runtime.
///
/// Implementations must be safe to use from multiple threads; the runtime
/// itself only ever calls them from the UI thread.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run another turn and tick frame callbacks.
    fn schedule_frame(&self);

    /// Request that the host run a turn no later than `deadline_nanos`,
    /// measured on the runtime's own timeline.
    fn schedule_wakeup(&self, _deadline_nanos: u64) {}
}

/// Provides timing information for the runtime.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}
