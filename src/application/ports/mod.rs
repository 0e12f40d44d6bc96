//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_device;
pub mod backend;
pub mod clock;
pub mod config;
pub mod storage;

// Re-export common types
pub use audio_device::{AudioDevice, DeviceError, DeviceHandle, Permission, RecordingPreset};
pub use backend::{BackendError, ConsultationBackend};
pub use clock::{Clock, TickCallback, TickHandle};
pub use config::ConfigStore;
pub use storage::{FileInfo, StorageError, StorageMover};
