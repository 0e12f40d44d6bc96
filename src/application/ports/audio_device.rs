//! Audio device port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Audio device errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to open recording: {0}")]
    OpenFailed(String),

    #[error("Recording failed: {0}")]
    CaptureFailed(String),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),

    #[error("Unknown recording handle: {0}")]
    UnknownHandle(u64),
}

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Capture settings requested when opening a handle.
///
/// Recordings are always stored mono; input channels are averaged down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingPreset {
    /// Sample rate of the finalized file
    pub sample_rate: u32,
}

impl RecordingPreset {
    /// 44.1kHz
    pub const fn high_quality() -> Self {
        Self {
            sample_rate: 44_100,
        }
    }

    pub const fn with_sample_rate(self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }
}

impl Default for RecordingPreset {
    fn default() -> Self {
        Self::high_quality()
    }
}

/// Opaque handle to an open recording.
///
/// Not `Clone`: exactly one owner may drive a recording, and
/// [`AudioDevice::finalize`] consumes the handle.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    id: u64,
}

impl DeviceHandle {
    /// Only device adapters mint handles
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Port for a platform audio recorder
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Ask the platform for microphone access.
    async fn request_permission(&self) -> Result<Permission, DeviceError>;

    /// Prepare a recording with the given preset. Capture does not begin
    /// until [`start`](Self::start).
    async fn open(&self, preset: RecordingPreset) -> Result<DeviceHandle, DeviceError>;

    /// Begin capturing audio.
    async fn start(&self, handle: &DeviceHandle) -> Result<(), DeviceError>;

    /// Suspend capture; audio arriving while paused is discarded.
    async fn pause(&self, handle: &DeviceHandle) -> Result<(), DeviceError>;

    /// Continue a paused capture.
    async fn resume(&self, handle: &DeviceHandle) -> Result<(), DeviceError>;

    /// Report whether capture on `handle` is still running.
    ///
    /// # Returns
    /// `CaptureFailed` once the underlying stream has broken down
    async fn health(&self, _handle: &DeviceHandle) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Stop capturing and write the recording to a durable file.
    ///
    /// # Returns
    /// Location of the produced file, carrying [`native_extension`](Self::native_extension)
    async fn finalize(&self, handle: DeviceHandle) -> Result<PathBuf, DeviceError>;

    /// Extension of the files produced by `finalize`
    fn native_extension(&self) -> &str;
}
