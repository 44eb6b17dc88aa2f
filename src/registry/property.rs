//! Typed accessor handles.

use std::sync::Arc;

use crate::registry::value::{PropertyValue, Timestamp};
use crate::registry::ConfigRegistry;

/// A named, typed view onto the registry.
///
/// Obtained once and read many times. Every `get` goes back to the registry,
/// so a handle always reflects the latest published value set.
#[derive(Clone)]
pub struct DynamicProperty<T> {
    registry: Arc<ConfigRegistry>,
    name: String,
    default: T,
}

pub type DynamicStringProperty = DynamicProperty<String>;
pub type DynamicLongProperty = DynamicProperty<i64>;
pub type DynamicDoubleProperty = DynamicProperty<f64>;
pub type DynamicBooleanProperty = DynamicProperty<bool>;
pub type DynamicTimestampProperty = DynamicProperty<Timestamp>;

impl<T: PropertyValue> DynamicProperty<T> {
    pub(crate) fn new(registry: Arc<ConfigRegistry>, name: &str, default: T) -> Self {
        Self {
            registry,
            name: name.to_string(),
            default,
        }
    }

    /// Current value, or the default when unset or of another type.
    pub fn get(&self) -> T {
        self.registry.read(&self.name, self.default.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the current value set holds a value of this handle's type.
    pub fn is_set(&self) -> bool {
        self.registry
            .snapshot()
            .get(&self.name)
            .and_then(T::from_typed)
            .is_some()
    }
}

impl<T: PropertyValue + std::fmt::Debug> std::fmt::Debug for DynamicProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicProperty")
            .field("name", &self.name)
            .field("value", &self.get())
            .field("default", &self.default)
            .finish()
    }
}
