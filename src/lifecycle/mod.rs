//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load settings → Build store → Start poller → Bind HTTP listener
//!
//! Shutdown:
//!     Signal received → HTTP drains → Poller stopped → Store released
//! ```
//!
//! # Design Decisions
//! - The poller stops before the store is dropped, so no fetch runs
//!   against a torn-down client

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
