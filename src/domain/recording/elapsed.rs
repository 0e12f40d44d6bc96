//! Elapsed recording time value object

use std::fmt;
use std::time::Duration as StdDuration;

/// Whole seconds of captured audio, as counted by the session tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ElapsedTime {
    seconds: u64,
}

impl ElapsedTime {
    pub const ZERO: Self = Self { seconds: 0 };

    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.seconds)
    }
}

impl fmt::Display for ElapsedTime {
    /// Clock format `H:MM:SS`; hours are not padded
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)
    }
}
