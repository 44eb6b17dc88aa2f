//! Settings schema definitions.
//!
//! These are the process's own static settings, read once at startup from a
//! TOML file. The dynamic values served to consumers live in the registry.

use serde::{Deserialize, Serialize};

/// Root settings for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Polling schedule.
    pub poller: PollerSettings,

    /// Remote entity store.
    pub store: StoreSettings,

    /// Demo HTTP listener.
    pub http: HttpSettings,

    #[serde(default)]
    pub admin: AdminSettings,

    /// Logging and metrics.
    pub observability: ObservabilitySettings,
}

/// Polling schedule settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Delay before the first background poll, in milliseconds.
    pub initial_delay_ms: u64,

    /// Delay between the end of one poll and the start of the next, in milliseconds.
    pub delay_ms: u64,

    /// Run the first poll inline in `start()` and fail startup if it fails.
    pub synchronous_first_poll: bool,

    /// Keep properties that disappear from the source instead of dropping them.
    pub ignore_deletes_from_source: bool,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            delay_ms: 5000,
            synchronous_first_poll: false,
            ignore_deletes_from_source: false,
        }
    }
}

/// Which entity store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON over HTTP.
    Http,
    /// In-process map, for local development.
    Memory,
}

/// Remote entity store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,

    /// Base URL of the store API (e.g., "http://localhost:8432").
    pub endpoint: String,

    /// Dataset (project) holding the configuration entity.
    pub dataset: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Entity kind to read, overriding the built-in default.
    pub entity_kind: Option<String>,

    /// Entity key to read, overriding the built-in default.
    pub entity_key: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            endpoint: "http://localhost:8432".to_string(),
            dataset: "remote-config".to_string(),
            timeout_secs: 10,
            entity_kind: None,
            entity_key: None,
        }
    }
}

/// Demo HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Admin API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Mount the admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
