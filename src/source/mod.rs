//! Remote configuration sources.
//!
//! # Data Flow
//! ```text
//! DatastoreSource::fetch_all()
//!     → identity read from the registry (kind, key)
//!     → EntityStore::lookup (http.rs or memory.rs)
//!     → coerce.rs per property
//!     → ValueSet, or SourceError on transport failure
//! ```
//!
//! # Design Decisions
//! - A missing entity is an empty ValueSet, not an error
//! - Unsupported property values are dropped individually
//! - Store errors never escape as panics; the poller decides what to do

pub mod coerce;
pub mod datastore;
pub mod http;
pub mod memory;
pub mod store;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::schema::{StoreBackend, StoreSettings};
use crate::registry::ValueSet;

pub use datastore::{DatastoreSource, ENTITY_KEY_PROPERTY, ENTITY_KIND_PROPERTY};
pub use http::HttpEntityStore;
pub use memory::InMemoryStore;
pub use store::EntityStore;
pub use types::{
    Entity, EntityIdentity, LookupResult, RawProperty, RawValue, SourceError, StoreError,
};

/// Outcome of one poll: a complete value set or the cause of failure.
pub type PollOutcome = Result<ValueSet, SourceError>;

/// Something the poller can fetch a complete value set from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch_all(&self) -> PollOutcome;
}

/// Build the entity store selected by `settings`.
pub fn build_store(settings: &StoreSettings) -> Result<Arc<dyn EntityStore>, StoreError> {
    match settings.backend {
        StoreBackend::Http => Ok(Arc::new(HttpEntityStore::new(settings)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory entity store; configuration will not survive restarts");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
