//! Fixed-delay polling scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::schema::PollerSettings;
use crate::observability::metrics;
use crate::poller::types::{PollStatus, SchedulerError, SchedulerState};
use crate::registry::ConfigRegistry;
use crate::source::ConfigSource;

/// Shared between the scheduler handle and its background task.
struct Shared {
    status: Mutex<PollStatus>,
    /// Held for the whole fetch-and-publish cycle so polls never overlap.
    poll_lock: tokio::sync::Mutex<()>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, PollStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One fetch-and-publish cycle, cloned into the background task.
#[derive(Clone)]
struct Poller {
    source: Arc<dyn ConfigSource>,
    registry: Arc<ConfigRegistry>,
    shared: Arc<Shared>,
    ignore_deletes: bool,
}

impl Poller {
    /// Fetch once and publish on success. Returns the new registry version.
    async fn poll_once(&self) -> Result<u64, SchedulerError> {
        let _cycle = self.shared.poll_lock.lock().await;

        {
            let mut status = self.shared.status();
            if status.state == SchedulerState::Stopped {
                return Err(SchedulerError::Stopped);
            }
            status.state = SchedulerState::Polling;
        }

        let started = Instant::now();
        let outcome = self.source.fetch_all().await;

        let mut status = self.shared.status();
        if status.state == SchedulerState::Stopped {
            status.discarded += 1;
            tracing::debug!("Scheduler stopped during poll, discarding result");
            metrics::record_poll("discarded", started);
            return Err(SchedulerError::Stopped);
        }
        status.state = SchedulerState::Idle;

        match outcome {
            Ok(values) => {
                let properties = values.len();
                let version = if self.ignore_deletes {
                    self.registry.update(|current| current.merged_with(&values))
                } else {
                    self.registry.publish(values)
                };
                status.record_success(version);

                metrics::record_poll("success", started);
                metrics::record_properties(self.registry.snapshot().len());
                tracing::info!(version, properties, "Successfully loaded new configuration");
                Ok(version)
            }
            Err(e) => {
                status.record_failure(&e);

                metrics::record_poll("failure", started);
                tracing::warn!(
                    error = %e,
                    failures = status.failures,
                    "Configuration poll failed, keeping current configuration"
                );
                Err(SchedulerError::Poll(e))
            }
        }
    }

    async fn run(self, initial_delay: Duration, delay: Duration, mut stop: watch::Receiver<bool>) {
        tracing::info!(
            initial_delay_ms = initial_delay.as_millis() as u64,
            delay_ms = delay.as_millis() as u64,
            "Configuration poller starting"
        );

        let mut next = initial_delay;
        loop {
            if *stop.borrow_and_update() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(next) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            if let Err(SchedulerError::Stopped) = self.poll_once().await {
                break;
            }
            next = delay;
        }

        tracing::info!("Configuration poller stopped");
    }
}

/// Polls a `ConfigSource` on a fixed delay and publishes into a registry.
///
/// The next poll is armed only after the previous one completes, so a slow
/// fetch delays the schedule instead of overlapping with the next one.
pub struct PollingScheduler {
    settings: PollerSettings,
    poller: Poller,
    started: AtomicBool,
    stop_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingScheduler {
    pub fn new(
        settings: PollerSettings,
        source: Arc<dyn ConfigSource>,
        registry: Arc<ConfigRegistry>,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let poller = Poller {
            source,
            registry,
            shared: Arc::new(Shared {
                status: Mutex::new(PollStatus::new()),
                poll_lock: tokio::sync::Mutex::new(()),
            }),
            ignore_deletes: settings.ignore_deletes_from_source,
        };

        Self {
            settings,
            poller,
            started: AtomicBool::new(false),
            stop_tx,
            task: Mutex::new(None),
        }
    }

    /// Begin polling.
    ///
    /// With `synchronous_first_poll` the first fetch runs before this returns
    /// and its failure fails the call; the background schedule then begins one
    /// `delay` later. Otherwise the first poll runs after `initial_delay`.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.poller.shared.status().state == SchedulerState::Stopped {
            return Err(SchedulerError::Stopped);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let delay = Duration::from_millis(self.settings.delay_ms);
        let mut initial_delay = Duration::from_millis(self.settings.initial_delay_ms);

        if self.settings.synchronous_first_poll {
            tracing::info!("Loading initial configuration");
            match self.poller.poll_once().await {
                Ok(_) => {}
                Err(SchedulerError::Poll(e)) => {
                    self.started.store(false, Ordering::SeqCst);
                    return Err(SchedulerError::Bootstrap(e));
                }
                Err(e) => {
                    self.started.store(false, Ordering::SeqCst);
                    return Err(e);
                }
            }
            initial_delay = delay;
        }

        let stop_rx = self.stop_tx.subscribe();
        let handle = tokio::spawn(self.poller.clone().run(initial_delay, delay, stop_rx));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    /// Run one poll now, outside the timer. Serialized with scheduled polls.
    pub async fn poll_now(&self) -> Result<u64, SchedulerError> {
        self.poller.poll_once().await
    }

    /// Cancel the pending timer and wait for the background task to exit.
    ///
    /// A poll in flight is allowed to finish but its result is not published.
    pub async fn stop(&self) {
        {
            let mut status = self.poller.shared.status();
            if status.state == SchedulerState::Stopped {
                return;
            }
            status.state = SchedulerState::Stopped;
        }
        self.stop_tx.send_replace(true);

        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Configuration poller task failed");
            }
        }
    }

    pub fn status(&self) -> PollStatus {
        self.poller.shared.status().clone()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TypedValue, ValueSet};
    use crate::source::{EntityIdentity, PollOutcome, SourceError, StoreError};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays queued outcomes, then keeps returning the last one.
    struct Scripted {
        outcomes: Mutex<VecDeque<PollOutcome>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<PollOutcome>) -> Arc<Self> {
            Arc::new(Self { outcomes: Mutex::new(outcomes.into()) })
        }
    }

    #[async_trait]
    impl ConfigSource for Scripted {
        async fn fetch_all(&self) -> PollOutcome {
            let mut outcomes = self.outcomes.lock().unwrap();
            match outcomes.pop_front() {
                Some(outcome) => outcome,
                None => Ok(ValueSet::new()),
            }
        }
    }

    fn failure() -> PollOutcome {
        Err(SourceError::Lookup {
            identity: EntityIdentity::default(),
            source: StoreError::Transport("connection refused".into()),
        })
    }

    fn values(name: &str, value: i64) -> PollOutcome {
        Ok(vec![(name, TypedValue::Integer(value))].into_iter().collect())
    }

    fn settings(synchronous: bool) -> PollerSettings {
        PollerSettings {
            initial_delay_ms: 60_000,
            delay_ms: 60_000,
            synchronous_first_poll: synchronous,
            ignore_deletes_from_source: false,
        }
    }

    #[tokio::test]
    async fn test_synchronous_start_publishes() {
        let registry = Arc::new(ConfigRegistry::new());
        let scheduler = PollingScheduler::new(settings(true), Scripted::new(vec![values("a", 1)]), registry.clone());

        scheduler.start().await.unwrap();
        assert_eq!(registry.read("a", 0i64), 1);
        assert_eq!(scheduler.status().successes, 1);
        assert_eq!(scheduler.status().state, SchedulerState::Idle);

        scheduler.stop().await;
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn test_synchronous_start_failure_is_fatal() {
        let registry = Arc::new(ConfigRegistry::new());
        let scheduler = PollingScheduler::new(settings(true), Scripted::new(vec![failure()]), registry.clone());

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, SchedulerError::Bootstrap(_)));
        assert_eq!(registry.version(), 0);
    }

    #[tokio::test]
    async fn test_background_start_does_not_block() {
        let registry = Arc::new(ConfigRegistry::new());
        let scheduler = PollingScheduler::new(settings(false), Scripted::new(vec![failure()]), registry.clone());

        scheduler.start().await.unwrap();
        assert_eq!(registry.version(), 0);
        assert!(matches!(scheduler.start().await, Err(SchedulerError::AlreadyStarted)));
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_failure_preserves_previous() {
        let registry = Arc::new(ConfigRegistry::new());
        let scheduler = PollingScheduler::new(
            settings(false),
            Scripted::new(vec![values("a", 1), failure()]),
            registry.clone(),
        );

        scheduler.poll_now().await.unwrap();
        let before = registry.snapshot();

        assert!(matches!(scheduler.poll_now().await, Err(SchedulerError::Poll(_))));
        assert_eq!(*registry.snapshot(), *before);
        assert_eq!(registry.version(), 1);

        let status = scheduler.status();
        assert_eq!(status.failures, 1);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_ignore_deletes_merges() {
        let registry = Arc::new(ConfigRegistry::new());
        let mut settings = settings(false);
        settings.ignore_deletes_from_source = true;
        let scheduler = PollingScheduler::new(
            settings,
            Scripted::new(vec![values("a", 1), values("b", 2)]),
            registry.clone(),
        );

        scheduler.poll_now().await.unwrap();
        scheduler.poll_now().await.unwrap();
        assert_eq!(registry.read("a", 0i64), 1);
        assert_eq!(registry.read("b", 0i64), 2);
    }

    #[tokio::test]
    async fn test_poll_after_stop_rejected() {
        let registry = Arc::new(ConfigRegistry::new());
        let scheduler = PollingScheduler::new(settings(false), Scripted::new(vec![values("a", 1)]), registry.clone());

        scheduler.stop().await;
        assert!(matches!(scheduler.poll_now().await, Err(SchedulerError::Stopped)));
        assert!(matches!(scheduler.start().await, Err(SchedulerError::Stopped)));
        assert_eq!(registry.version(), 0);
    }
}
