//! Clock port interface

use std::sync::Arc;
use std::time::Duration as StdDuration;

/// Callback fired on every tick of a repeating schedule
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle to a repeating schedule, consumed by [`Clock::cancel`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TickHandle {
    id: u64,
}

impl TickHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Port for cancelable repeating timers
pub trait Clock: Send + Sync {
    /// Call `on_tick` every `interval`, first after one full interval.
    ///
    /// # Arguments
    /// * `interval` - Period between ticks
    /// * `on_tick` - Callback fired on each tick
    ///
    /// # Returns
    /// A handle to pass to [`cancel`](Self::cancel)
    fn every(&self, interval: StdDuration, on_tick: TickCallback) -> TickHandle;

    /// Stop a schedule. No tick fires after this returns.
    fn cancel(&self, handle: TickHandle);
}
