//! Settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StoreBackend;

    #[test]
    fn test_parse_partial_file() {
        let settings = parse_settings(
            r#"
            [poller]
            delay_ms = 250
            synchronous_first_poll = true

            [store]
            backend = "http"
            endpoint = "http://datastore.internal:8432"
            dataset = "staging-config"
            "#,
        )
        .unwrap();

        assert_eq!(settings.poller.delay_ms, 250);
        assert_eq!(settings.poller.initial_delay_ms, 1000);
        assert!(settings.poller.synchronous_first_poll);
        assert_eq!(settings.store.backend, StoreBackend::Http);
        assert_eq!(settings.store.dataset, "staging-config");
        assert_eq!(settings.store.timeout_secs, 10);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_settings("[poller]\ndelay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_settings("[poller]\ndelay_ms = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: poller.delay_ms: must be greater than zero"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
