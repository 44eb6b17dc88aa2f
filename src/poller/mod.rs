//! Configuration polling subsystem.
//!
//! # Data Flow
//! ```text
//! start()
//!     → [optional] inline first poll, failure fails start()
//!     → background task: sleep(delay) | stop signal
//!     → ConfigSource::fetch_all()
//!     → success: registry publish + checkpoint
//!     → failure: log, registry untouched
//!     → re-arm timer after completion (fixed delay)
//! ```
//!
//! # Design Decisions
//! - At most one fetch in flight, enforced by a poll lock
//! - A failed poll never clears or crashes anything
//! - Results arriving after stop() are dropped

pub mod scheduler;
pub mod types;

pub use scheduler::PollingScheduler;
pub use types::{PollStatus, SchedulerError, SchedulerState};
