//! Clock adapters

mod manual;
mod tokio_clock;

pub use manual::ManualClock;
pub use tokio_clock::TokioClock;
