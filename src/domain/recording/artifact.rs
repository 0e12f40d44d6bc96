//! Naming and format of finished recording files

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::domain::error::InputError;

/// Default extension for stored consultation audio
pub const DEFAULT_AUDIO_EXTENSION: &str = "flac";

/// Sample rates a recording may be stored at, in Hz
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=192_000;

fn is_plain_extension(extension: &str) -> bool {
    !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Normalize a user-supplied extension: leading dot dropped, lowercased.
///
/// # Returns
/// The normalized extension, or `InvalidExtension` unless it is made of
/// ASCII letters and digits only
pub fn normalize_audio_extension(extension: &str) -> Result<String, InputError> {
    let trimmed = extension.trim().trim_start_matches('.');
    if !is_plain_extension(trimmed) {
        return Err(InputError::InvalidExtension(extension.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Check a recording sample rate against [`SAMPLE_RATE_RANGE`]
pub fn check_sample_rate(rate: u32) -> Result<u32, InputError> {
    if SAMPLE_RATE_RANGE.contains(&rate) {
        Ok(rate)
    } else {
        Err(InputError::InvalidSampleRate(rate))
    }
}

/// Destination for a finalized capture: the source file name with its
/// extension replaced, placed inside `dir`.
///
/// Returns `None` when `source` has no file name component or the
/// extension is not plain letters and digits.
pub fn canonical_destination(source: &Path, dir: &Path, extension: &str) -> Option<PathBuf> {
    let extension = extension.trim_start_matches('.');
    if !is_plain_extension(extension) {
        return None;
    }
    let file_name = source.file_name()?;
    let renamed = Path::new(file_name).with_extension(extension);
    Some(dir.join(renamed))
}
