//! Application configuration value object

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::domain::recording::DEFAULT_AUDIO_EXTENSION;

/// Default consultation backend
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Default capture rate of the high-quality preset
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default timeout for backend requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub documents_dir: Option<String>,
    pub audio_extension: Option<String>,
    pub sample_rate: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
            documents_dir: Some(default_documents_dir().to_string_lossy().to_string()),
            audio_extension: Some(DEFAULT_AUDIO_EXTENSION.to_string()),
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend_url: other.backend_url.or(self.backend_url),
            documents_dir: other.documents_dir.or(self.documents_dir),
            audio_extension: other.audio_extension.or(self.audio_extension),
            sample_rate: other.sample_rate.or(self.sample_rate),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    pub fn backend_url_or_default(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// Where finished recordings and downloaded PDFs are stored
    pub fn documents_dir_or_default(&self) -> PathBuf {
        self.documents_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_documents_dir)
    }

    pub fn audio_extension_or_default(&self) -> &str {
        self.audio_extension
            .as_deref()
            .unwrap_or(DEFAULT_AUDIO_EXTENSION)
    }

    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn request_timeout_or_default(&self) -> StdDuration {
        StdDuration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

fn default_documents_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("consult-recorder")
}
