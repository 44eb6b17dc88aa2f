//! In-memory configuration registry.
//!
//! # Data Flow
//! ```text
//! poller publishes ValueSet
//!     → ArcSwap store (atomic, wholesale)
//!     → version bump on the watch channel
//!
//! DynamicProperty::get()
//!     → ArcSwap load (lock-free)
//!     → typed lookup, default on miss or type mismatch
//! ```
//!
//! # Design Decisions
//! - The current ValueSet is never mutated in place, only replaced
//! - Publishers are serialized; readers never take a lock
//! - Accessors hold the registry, never a ValueSet
//! - Dynamic defaults are a process-local layer under the published set

pub mod property;
pub mod value;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::watch;

pub use property::{
    DynamicBooleanProperty, DynamicDoubleProperty, DynamicLongProperty, DynamicProperty,
    DynamicStringProperty, DynamicTimestampProperty,
};
pub use value::{PropertyValue, Timestamp, TypedValue, ValueSet};

static GLOBAL: OnceLock<Arc<ConfigRegistry>> = OnceLock::new();

/// Holds the currently published configuration values.
pub struct ConfigRegistry {
    current: ArcSwap<ValueSet>,
    publish_lock: Mutex<()>,
    version: watch::Sender<u64>,
    defaults: DashMap<String, TypedValue>,
}

impl ConfigRegistry {
    /// Create a registry with an empty value set.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(ValueSet::new()),
            publish_lock: Mutex::new(()),
            version,
            defaults: DashMap::new(),
        }
    }

    /// Process-wide registry for callers that do not wire one explicitly.
    pub fn global() -> Arc<ConfigRegistry> {
        GLOBAL.get_or_init(|| Arc::new(ConfigRegistry::new())).clone()
    }

    /// Replace the current value set. Returns the new version.
    pub fn publish(&self, values: ValueSet) -> u64 {
        self.update(|_| values)
    }

    /// Build the next value set from the current one and publish it.
    ///
    /// `f` runs under the publish lock, so the set it sees is the one it replaces.
    pub fn update<F>(&self, f: F) -> u64
    where
        F: FnOnce(&ValueSet) -> ValueSet,
    {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let next = f(&self.current.load());
        let properties = next.len();
        self.current.store(Arc::new(next));

        let version = *self.version.borrow() + 1;
        self.version.send_replace(version);

        tracing::debug!(version, properties, "Published configuration");
        version
    }

    /// Read `name` as `T`.
    ///
    /// Falls back to the dynamic default for `name`, then to `default`, when
    /// the published set has no value of type `T` under that name.
    pub fn read<T: PropertyValue>(&self, name: &str, default: T) -> T {
        if let Some(value) = self.current.load().get(name).and_then(T::from_typed) {
            return value;
        }
        self.defaults
            .get(name)
            .and_then(|entry| T::from_typed(entry.value()))
            .unwrap_or(default)
    }

    /// The value set current at the time of the call.
    pub fn snapshot(&self) -> Arc<ValueSet> {
        self.current.load_full()
    }

    /// Number of publications so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that observes every publication's version.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Create an accessor handle for `name`.
    pub fn property<T: PropertyValue>(self: &Arc<Self>, name: &str, default: T) -> DynamicProperty<T> {
        DynamicProperty::new(self.clone(), name, default)
    }

    pub fn string_property(self: &Arc<Self>, name: &str, default: &str) -> DynamicStringProperty {
        self.property(name, default.to_string())
    }

    pub fn long_property(self: &Arc<Self>, name: &str, default: i64) -> DynamicLongProperty {
        self.property(name, default)
    }

    pub fn double_property(self: &Arc<Self>, name: &str, default: f64) -> DynamicDoubleProperty {
        self.property(name, default)
    }

    pub fn boolean_property(self: &Arc<Self>, name: &str, default: bool) -> DynamicBooleanProperty {
        self.property(name, default)
    }

    pub fn timestamp_property(self: &Arc<Self>, name: &str, default: Timestamp) -> DynamicTimestampProperty {
        self.property(name, default)
    }

    /// Set a process-local fallback for `name`.
    ///
    /// Published values always win over it; it applies to every accessor of
    /// a matching type whether created before or after the call.
    pub fn set_default(&self, name: &str, value: impl Into<TypedValue>) {
        self.defaults.insert(name.to_string(), value.into());
    }

    pub fn remove_default(&self, name: &str) -> Option<TypedValue> {
        self.defaults.remove(name).map(|(_, value)| value)
    }

    /// Current dynamic defaults, by name.
    pub fn defaults(&self) -> BTreeMap<String, TypedValue> {
        self.defaults
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("version", &self.version())
            .field("properties", &self.current.load().len())
            .finish()
    }
}
