//! Wall-clock ticks on the tokio runtime

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration as StdDuration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::application::ports::{Clock, TickCallback, TickHandle};

/// One spawned interval task per schedule, aborted on cancel.
///
/// `every` must be called from within a tokio runtime.
#[derive(Default)]
pub struct TokioClock {
    next_id: AtomicU64,
    tasks: StdMutex<HashMap<u64, JoinHandle<()>>>,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for TokioClock {
    fn every(&self, interval: StdDuration, on_tick: TickCallback) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, task);
        TickHandle::new(id)
    }

    fn cancel(&self, handle: TickHandle) {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&handle.id());
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, task) in tasks.drain() {
            task.abort();
        }
    }
}
