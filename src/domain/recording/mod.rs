//! Recording domain module

mod artifact;
mod elapsed;
mod state;

pub use artifact::{
    canonical_destination, check_sample_rate, normalize_audio_extension, DEFAULT_AUDIO_EXTENSION,
    SAMPLE_RATE_RANGE,
};
pub use elapsed::ElapsedTime;
pub use state::SessionState;
