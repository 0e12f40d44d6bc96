//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the microphone, the filesystem and the backend.

pub mod audio;
pub mod backend;
pub mod clock;
pub mod config;
pub mod storage;

// Re-export adapters
pub use audio::CpalDevice;
pub use backend::HttpBackend;
pub use clock::{ManualClock, TokioClock};
pub use config::XdgConfigStore;
pub use storage::FsStorage;
