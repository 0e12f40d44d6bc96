//! Clock driven by explicit `advance` calls

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration as StdDuration;

use crate::application::ports::{Clock, TickCallback, TickHandle};

#[derive(Default)]
struct Schedules {
    next_id: u64,
    active: BTreeMap<u64, TickCallback>,
}

/// Deterministic clock: nothing fires until [`advance`](Self::advance).
///
/// Clones share the same schedules, so a caller can keep one clone and
/// hand the other to a controller.
#[derive(Clone, Default)]
pub struct ManualClock {
    schedules: Arc<StdMutex<Schedules>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn schedules(&self) -> MutexGuard<'_, Schedules> {
        self.schedules.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fire every active schedule `ticks` times, one round per tick.
    /// Schedules canceled during a round stop firing from the next one.
    pub fn advance(&self, ticks: u32) {
        for _ in 0..ticks {
            let round: Vec<TickCallback> = self.schedules().active.values().cloned().collect();
            for on_tick in round {
                on_tick();
            }
        }
    }

    /// Number of schedules not yet canceled
    pub fn active_count(&self) -> usize {
        self.schedules().active.len()
    }
}

impl Clock for ManualClock {
    /// The interval is ignored; every schedule fires once per `advance` round.
    fn every(&self, _interval: StdDuration, on_tick: TickCallback) -> TickHandle {
        let mut schedules = self.schedules();
        let id = schedules.next_id;
        schedules.next_id += 1;
        schedules.active.insert(id, on_tick);
        TickHandle::new(id)
    }

    fn cancel(&self, handle: TickHandle) {
        self.schedules().active.remove(&handle.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn advance_fires_active_schedules() {
        let clock = ManualClock::new();
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);

        let handle = clock.every(
            StdDuration::from_secs(1),
            Arc::new(move || {
                inner.fetch_add(1, Ordering::SeqCst);
            }),
        );
        clock.advance(3);
        assert_eq!(count.load(Ordering::SeqCst), 3);

        clock.cancel(handle);
        clock.advance(3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(clock.active_count(), 0);
    }

    #[test]
    fn clones_share_schedules() {
        let clock = ManualClock::new();
        let other = clock.clone();

        let handle = other.every(StdDuration::from_secs(1), Arc::new(|| {}));
        assert_eq!(clock.active_count(), 1);

        clock.cancel(handle);
        assert_eq!(other.active_count(), 0);
    }
}
