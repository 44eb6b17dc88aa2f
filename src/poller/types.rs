//! Scheduler state, status snapshot and errors.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::source::SourceError;

/// Where the scheduler is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// A fetch is in flight.
    Polling,
    /// `stop()` was called; no further polls run and late results are dropped.
    Stopped,
}

/// Point-in-time view of the scheduler, served by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct PollStatus {
    pub state: SchedulerState,
    /// Completion time of the last successful poll, unix milliseconds.
    pub last_success_unix_ms: Option<u64>,
    pub last_error: Option<String>,
    pub successes: u64,
    pub failures: u64,
    /// Polls that completed after `stop()` and were not published.
    pub discarded: u64,
    /// Registry version after the last publication.
    pub version: u64,
}

impl PollStatus {
    pub(crate) fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            last_success_unix_ms: None,
            last_error: None,
            successes: 0,
            failures: 0,
            discarded: 0,
            version: 0,
        }
    }

    pub(crate) fn record_success(&mut self, version: u64) {
        self.successes += 1;
        self.version = version;
        self.last_success_unix_ms = Some(unix_ms(SystemTime::now()));
    }

    pub(crate) fn record_failure(&mut self, error: &SourceError) {
        self.failures += 1;
        self.last_error = Some(error.to_string());
    }
}

fn unix_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Errors returned by the polling scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The blocking first poll failed, so no configuration is available.
    #[error("Initial configuration load failed: {0}")]
    Bootstrap(#[source] SourceError),

    /// A poll failed; the previous configuration is still published.
    #[error("Poll failed: {0}")]
    Poll(#[source] SourceError),

    #[error("Scheduler already started")]
    AlreadyStarted,

    #[error("Scheduler stopped")]
    Stopped,
}
