//! Dynamic configuration polled from a remote entity store.

pub mod config;
pub mod registry;
pub mod source;
pub mod poller;
pub mod http;
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::Settings;
pub use poller::PollingScheduler;
pub use registry::{ConfigRegistry, DynamicProperty, TypedValue, ValueSet};
pub use source::{DatastoreSource, EntityIdentity, EntityStore};
