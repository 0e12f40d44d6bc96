//! FLAC encoding of captured consultations
//!
//! Lossless, roughly 40-60% of the WAV size for speech. Input is mono
//! 16-bit PCM at the recording preset rate.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

const BITS_PER_SAMPLE: usize = 16;

const CHANNELS: usize = 1;

/// Encode mono PCM samples to a FLAC stream
pub fn encode_to_flac(pcm_samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodingError> {
    if sample_rate == 0 {
        return Err(EncodingError::Config("sample rate must be positive".into()));
    }

    // flacenc works on i32 samples
    let samples: Vec<i32> = pcm_samples.iter().map(|&s| i32::from(s)).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(&samples, CHANNELS, BITS_PER_SAMPLE, sample_rate as usize);

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(sink.into_inner())
}

/// FLAC encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("FLAC config error: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("FLAC write failed: {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_has_flac_header() {
        let silence = vec![0i16; 44_100];
        let flac = encode_to_flac(&silence, 44_100).unwrap();

        assert!(flac.len() > 50);
        assert_eq!(&flac[0..4], b"fLaC");
    }

    #[test]
    fn tone_compresses_below_raw_size() {
        let rate = 22_050;
        let samples: Vec<i16> = (0..rate)
            .map(|i| {
                let t = i as f32 / rate as f32;
                (f32::sin(2.0 * std::f32::consts::PI * 220.0 * t) * 12_000.0) as i16
            })
            .collect();

        let flac = encode_to_flac(&samples, rate as u32).unwrap();
        assert!(flac.len() < samples.len() * 2);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(matches!(
            encode_to_flac(&[0; 16], 0),
            Err(EncodingError::Config(_))
        ));
    }
}
