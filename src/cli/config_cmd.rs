//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::{check_sample_rate, normalize_audio_extension};
use crate::infrastructure::audio::STAGING_EXTENSION;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => {
            presenter.output(&store.path().to_string_lossy());
            Ok(())
        }
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;

    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` and store it under `key`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "backend_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(key, "URL must start with http:// or https://"));
            }
            config.backend_url = Some(value.trim_end_matches('/').to_string());
        }
        "documents_dir" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Directory must not be empty"));
            }
            config.documents_dir = Some(value.to_string());
        }
        "audio_extension" => {
            let ext = normalize_audio_extension(value)
                .map_err(|_| invalid(key, "Extension must be letters and digits, e.g. flac"))?;
            if ext == STAGING_EXTENSION {
                return Err(invalid(key, "Extension is reserved for unfinished recordings"));
            }
            config.audio_extension = Some(ext);
        }
        "sample_rate" => {
            let rate: u32 = value
                .parse()
                .map_err(|_| invalid(key, "Value must be a whole number of Hz"))?;
            let rate = check_sample_rate(rate)
                .map_err(|_| invalid(key, "Sample rate must be between 8000 and 192000"))?;
            config.sample_rate = Some(rate);
        }
        "request_timeout_secs" => {
            let secs: u64 = value
                .parse()
                .map_err(|_| invalid(key, "Value must be a whole number of seconds"))?;
            if secs == 0 {
                return Err(invalid(key, "Timeout must be at least 1 second"));
            }
            config.request_timeout_secs = Some(secs);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

/// Run every value set in `config` through the same checks as
/// `config set`, so values from the config file or command-line flags
/// cannot bypass them.
///
/// # Returns
/// The config with values normalized, or the first invalid key
pub fn validate_config(config: &AppConfig) -> Result<AppConfig, ConfigError> {
    let mut checked = AppConfig::empty();
    for key in VALID_CONFIG_KEYS {
        if let Some(value) = read_value(config, key) {
            apply_value(&mut checked, key, &value)?;
        }
    }
    Ok(checked)
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "backend_url" => config.backend_url.clone(),
        "documents_dir" => config.documents_dir.clone(),
        "audio_extension" => config.audio_extension.clone(),
        "sample_rate" => config.sample_rate.map(|r| r.to_string()),
        "request_timeout_secs" => config.request_timeout_secs.map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_requires_scheme() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "backend_url", "10.0.0.2:5000").is_err());

        apply_value(&mut config, "backend_url", "http://10.0.0.2:5000/").unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://10.0.0.2:5000"));
    }

    #[test]
    fn audio_extension_is_normalized() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "audio_extension", ".WAV").unwrap();
        assert_eq!(config.audio_extension.as_deref(), Some("wav"));

        assert!(apply_value(&mut config, "audio_extension", "fl/ac").is_err());
        assert!(apply_value(&mut config, "audio_extension", ".Partial").is_err());
    }

    #[test]
    fn validate_config_normalizes_set_values() {
        let config = AppConfig {
            audio_extension: Some(".M4A".to_string()),
            sample_rate: Some(16_000),
            ..AppConfig::empty()
        };
        let checked = validate_config(&config).unwrap();
        assert_eq!(checked.audio_extension.as_deref(), Some("m4a"));
        assert_eq!(checked.sample_rate, Some(16_000));
        assert_eq!(checked.backend_url, None);

        assert_eq!(validate_config(&AppConfig::defaults()).unwrap(), AppConfig::defaults());
    }

    #[test]
    fn validate_config_rejects_bad_values() {
        let slash = AppConfig {
            audio_extension: Some("x/y".to_string()),
            ..AppConfig::empty()
        };
        assert!(matches!(
            validate_config(&slash),
            Err(ConfigError::ValidationError { key, .. }) if key == "audio_extension"
        ));

        let silent = AppConfig {
            sample_rate: Some(0),
            ..AppConfig::empty()
        };
        assert!(matches!(
            validate_config(&silent),
            Err(ConfigError::ValidationError { key, .. }) if key == "sample_rate"
        ));
    }

    #[test]
    fn sample_rate_range() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "sample_rate", "4000").is_err());
        assert!(apply_value(&mut config, "sample_rate", "fast").is_err());

        apply_value(&mut config, "sample_rate", "48000").unwrap();
        assert_eq!(read_value(&config, "sample_rate").as_deref(), Some("48000"));
    }

    #[test]
    fn timeout_must_be_positive() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "request_timeout_secs", "0").is_err());

        apply_value(&mut config, "request_timeout_secs", "10").unwrap();
        assert_eq!(config.request_timeout_secs, Some(10));
    }

    #[test]
    fn unknown_key_lists_valid_keys() {
        let err = check_key("api_key").unwrap_err();
        assert!(err.to_string().contains("backend_url"));
    }
}
