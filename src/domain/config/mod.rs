//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAMPLE_RATE,
};
