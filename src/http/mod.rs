//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → handlers.rs (demo reads via accessor handles, write-back to the store)
//!     → admin/ (poller status, property dump, manual refresh)
//! ```

pub mod handlers;
pub mod server;

pub use handlers::DemoProperties;
pub use server::{AppState, HttpServer};
