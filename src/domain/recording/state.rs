//! Recording session states

use std::fmt;

/// Lifecycle states of a recording session.
///
/// ```text
///   IDLE -> RECORDING            (start)
///   RECORDING <-> PAUSED         (toggle pause)
///   RECORDING | PAUSED -> FINALIZING -> STOPPED   (stop)
///   RECORDING | PAUSED -> STOPPED                 (cancel)
///   any non-terminal -> FAILED   (device or storage error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Paused,
    Finalizing,
    Stopped,
    Failed,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Finalizing => "finalizing",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// No further transitions are possible; a new session is required
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }

    /// The session owns an open device handle in this state
    pub const fn holds_device(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
