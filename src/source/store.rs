//! Entity store seam.

use async_trait::async_trait;

use crate::source::types::{Entity, EntityIdentity, LookupResult, StoreResult};

/// A key/value store holding configuration entities.
///
/// Implementations report transport and decode problems as `StoreError`;
/// the absence of an entity is a `LookupResult`, not an error.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch the single entity named by `identity`.
    async fn lookup(&self, identity: &EntityIdentity) -> StoreResult<LookupResult>;

    /// Create or replace `entity` under its key.
    async fn upsert(&self, entity: Entity) -> StoreResult<()>;
}
