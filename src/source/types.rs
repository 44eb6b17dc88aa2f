//! Entity store types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default kind of the configuration entity.
pub const DEFAULT_ENTITY_KIND: &str = "ConfigProperties";

/// Default key of the configuration entity.
pub const DEFAULT_ENTITY_KEY: &str = "latest";

/// Which remote entity acts as the configuration source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityIdentity {
    pub kind: String,
    pub key: String,
}

impl EntityIdentity {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// An identity with an empty kind or key cannot name an entity.
    pub fn is_valid(&self) -> bool {
        !self.kind.trim().is_empty() && !self.key.trim().is_empty()
    }
}

impl Default for EntityIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_KIND, DEFAULT_ENTITY_KEY)
    }
}

impl std::fmt::Display for EntityIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

/// A property value as the store represents it.
///
/// Several slots may be populated at once by some backends; coercion picks
/// one by a fixed priority order. Slots this crate does not know about are
/// ignored on decode, which leaves the value with no usable slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_microseconds_value: Option<i64>,
    /// Reference to another entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value: Option<EntityIdentity>,
}

/// One named field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
}

impl RawProperty {
    pub fn new(name: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// A record in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub key: EntityIdentity,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

impl Entity {
    /// An entity with no properties.
    pub fn empty(key: EntityIdentity) -> Self {
        Self {
            key,
            properties: Vec::new(),
        }
    }

    /// Replace every property called `property.name` with `property`.
    pub fn set_property(&mut self, property: RawProperty) {
        self.properties.retain(|p| p.name != property.name);
        self.properties.push(property);
    }
}

/// Result of a single-entity lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// No entity exists under the identity.
    NotFound,
    /// The store reported a result but returned no entity body.
    Missing,
    Found(Entity),
}

/// Errors raised by entity store clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered with an unexpected status.
    #[error("Store returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A value that the store cannot represent faithfully.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Errors surfaced by a configuration source poll.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Lookup of {identity} failed: {source}")]
    Lookup {
        identity: EntityIdentity,
        #[source]
        source: StoreError,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
