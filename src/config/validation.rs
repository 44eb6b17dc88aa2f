//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, timeouts > 0)
//! - Validate addresses and URLs before anything binds or connects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{Settings, StoreBackend};

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check `settings` for values that parse but cannot work.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.poller.delay_ms == 0 {
        errors.push(ValidationError::new("poller.delay_ms", "must be greater than zero"));
    }

    if settings.store.backend == StoreBackend::Http {
        if let Err(e) = settings.store.endpoint.parse::<Url>() {
            errors.push(ValidationError::new("store.endpoint", format!("invalid URL: {}", e)));
        }
        if settings.store.dataset.trim().is_empty() {
            errors.push(ValidationError::new("store.dataset", "must not be empty"));
        }
        if settings.store.timeout_secs == 0 {
            errors.push(ValidationError::new("store.timeout_secs", "must be greater than zero"));
        }
    }

    if matches!(&settings.store.entity_kind, Some(kind) if kind.trim().is_empty()) {
        errors.push(ValidationError::new("store.entity_kind", "must not be blank when set"));
    }
    if matches!(&settings.store.entity_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("store.entity_key", "must not be blank when set"));
    }

    if settings.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "http.bind_address",
            format!("invalid socket address '{}'", settings.http.bind_address),
        ));
    }
    if settings.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be greater than zero"));
    }

    if settings.admin.enabled && settings.admin.api_key.is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must not be empty when admin is enabled"));
    }

    if !LOG_LEVELS.contains(&settings.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", settings.observability.log_level),
        ));
    }
    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", settings.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_settings(&Settings::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = Settings::default();
        settings.poller.delay_ms = 0;
        settings.http.bind_address = "nowhere".to_string();
        settings.observability.log_level = "loud".to_string();

        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["poller.delay_ms", "http.bind_address", "observability.log_level"]);
    }

    #[test]
    fn test_http_store_checked_only_when_selected() {
        let mut settings = Settings::default();
        settings.store.endpoint = "::not a url::".to_string();
        assert!(validate_settings(&settings).is_ok());

        settings.store.backend = StoreBackend::Http;
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors[0].field, "store.endpoint");
    }

    #[test]
    fn test_blank_entity_override_rejected() {
        let mut settings = Settings::default();
        settings.store.entity_kind = Some("Cfg".to_string());
        assert!(validate_settings(&settings).is_ok());

        settings.store.entity_key = Some("  ".to_string());
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors[0].field, "store.entity_key");
    }
}
