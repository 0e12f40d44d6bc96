//! Audio capture adapters
//!
//! Microphone capture with cpal; finished captures are stored as FLAC.

mod cpal_device;
mod flac_encoder;

pub use cpal_device::{CpalDevice, STAGING_EXTENSION};
pub use flac_encoder::{encode_to_flac, EncodingError};
