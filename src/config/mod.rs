//! Service settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → handed to poller, store client, HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Settings are static; runtime-tunable values belong in the registry
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{
    AdminSettings, HttpSettings, ObservabilitySettings, PollerSettings, Settings, StoreBackend,
    StoreSettings,
};
