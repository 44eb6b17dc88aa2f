//! Configuration source backed by a single store entity.

use std::sync::Arc;

use async_trait::async_trait;

use crate::registry::{ConfigRegistry, DynamicStringProperty, TypedValue, ValueSet};
use crate::source::coerce::{coerce, to_raw_property};
use crate::source::store::EntityStore;
use crate::source::types::{
    Entity, EntityIdentity, LookupResult, SourceError, StoreError, StoreResult, DEFAULT_ENTITY_KEY,
    DEFAULT_ENTITY_KIND,
};
use crate::source::{ConfigSource, PollOutcome};

/// Registry property overriding the entity kind.
pub const ENTITY_KIND_PROPERTY: &str = "remote_config.source.entity_kind";

/// Registry property overriding the entity key.
pub const ENTITY_KEY_PROPERTY: &str = "remote_config.source.entity_key";

/// Loads configuration from one entity in an `EntityStore`.
///
/// Each property of the entity becomes one configuration value. The entity's
/// identity is itself read from the registry on every poll, so publishing a
/// new kind or key redirects the following poll, never the one in flight.
pub struct DatastoreSource {
    store: Arc<dyn EntityStore>,
    entity_kind: DynamicStringProperty,
    entity_key: DynamicStringProperty,
}

impl DatastoreSource {
    pub fn new(store: Arc<dyn EntityStore>, registry: &Arc<ConfigRegistry>) -> Self {
        Self {
            store,
            entity_kind: registry.string_property(ENTITY_KIND_PROPERTY, DEFAULT_ENTITY_KIND),
            entity_key: registry.string_property(ENTITY_KEY_PROPERTY, DEFAULT_ENTITY_KEY),
        }
    }

    /// The entity the next poll will read.
    pub fn identity(&self) -> EntityIdentity {
        EntityIdentity::new(self.entity_kind.get(), self.entity_key.get())
    }

    /// Fetch and coerce every property of the entity named by `identity`.
    pub async fn fetch_entity(&self, identity: &EntityIdentity) -> PollOutcome {
        if !identity.is_valid() {
            tracing::warn!(
                kind = %identity.kind,
                key = %identity.key,
                "Configuration entity identity is incomplete, treating as not found"
            );
            return Ok(ValueSet::new());
        }

        tracing::debug!(
            kind = %identity.kind,
            key = %identity.key,
            "Looking up configuration entity"
        );

        let result = self
            .store
            .lookup(identity)
            .await
            .map_err(|source| SourceError::Lookup {
                identity: identity.clone(),
                source,
            })?;

        let entity = match result {
            LookupResult::Found(entity) => entity,
            LookupResult::NotFound => {
                tracing::warn!(
                    kind = %identity.kind,
                    key = %identity.key,
                    "Could not find configuration entity"
                );
                return Ok(ValueSet::new());
            }
            LookupResult::Missing => {
                tracing::warn!(
                    kind = %identity.kind,
                    key = %identity.key,
                    "Configuration entity lookup succeeded, but no entity returned"
                );
                return Ok(ValueSet::new());
            }
        };

        let mut dropped = 0usize;
        let values: ValueSet = entity
            .properties
            .iter()
            .filter_map(|property| match coerce(property) {
                Some(value) => Some((property.name.as_str(), value)),
                None => {
                    dropped += 1;
                    tracing::debug!(property = %property.name, "Skipping property with unsupported value");
                    None
                }
            })
            .collect();

        tracing::info!(
            kind = %identity.kind,
            key = %identity.key,
            properties = values.len(),
            dropped,
            "Loaded configuration entity"
        );
        Ok(values)
    }

    /// Merge `properties` into the current source entity and write it back.
    ///
    /// Creates the entity when it does not exist yet. Returns the identity
    /// written to. Non-finite doubles are rejected before the store is touched,
    /// since they would read back as absent.
    pub async fn write_back(&self, properties: &[(&str, TypedValue)]) -> StoreResult<EntityIdentity> {
        for (name, value) in properties {
            if let TypedValue::Double(v) = value {
                if !v.is_finite() {
                    return Err(StoreError::InvalidValue {
                        name: name.to_string(),
                        reason: format!("non-finite double {}", v),
                    });
                }
            }
        }

        let identity = self.identity();

        let mut entity = match self.store.lookup(&identity).await? {
            LookupResult::Found(entity) => entity,
            LookupResult::NotFound | LookupResult::Missing => Entity::empty(identity.clone()),
        };
        for (name, value) in properties {
            entity.set_property(to_raw_property(name, value));
        }

        self.store.upsert(entity).await?;
        tracing::info!(
            kind = %identity.kind,
            key = %identity.key,
            properties = properties.len(),
            "Wrote configuration entity"
        );
        Ok(identity)
    }
}

#[async_trait]
impl ConfigSource for DatastoreSource {
    async fn fetch_all(&self) -> PollOutcome {
        let identity = self.identity();
        self.fetch_entity(&identity).await
    }
}
