//! Periodic behavior synchronization.
//!
//! Runs a background Tokio task that asks its [`SyncTarget`] to sync on a fixed
//! interval. The task only holds a weak reference to the target: once the
//! target is dropped the loop exits on its next tick.
//!
//! Lifecycle rules:
//! - Explicit `start`/`stop`, restartable after stop
//! - Join handle kept for the spawned task
//! - Cancellation token checked between ticks
//! - A failed tick is logged and never stops the loop

use std::sync::Weak;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use wayfare_domain::{Result, WayfareError};

/// Something that can push its state to a remote collector
#[async_trait]
pub trait SyncTarget: Send + Sync {
    async fn sync(&self) -> Result<()>;
}

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// No Tokio runtime to spawn on
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    /// Operation timed out
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for WayfareError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                WayfareError::InvalidInput(err.to_string())
            }
            SchedulerError::NoRuntime(_) => WayfareError::Unavailable(err.to_string()),
            SchedulerError::Timeout { .. } | SchedulerError::TaskJoinFailed(_) => {
                WayfareError::Internal(err.to_string())
            }
        }
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Configuration for sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Sync interval
    pub interval: Duration,
    /// How long `stop` waits for the task to finish
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(wayfare_domain::constants::DEFAULT_SYNC_INTERVAL_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Sync scheduler for periodic snapshot transmission
pub struct SyncScheduler {
    target: Weak<dyn SyncTarget>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    #[must_use]
    pub fn new(target: Weak<dyn SyncTarget>, config: SyncSchedulerConfig) -> Self {
        Self {
            target,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that syncs every `interval`. The first sync
    /// happens one full interval after start.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is already running or there is no
    /// Tokio runtime.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| SchedulerError::NoRuntime(err.to_string()))?;

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let target = Weak::clone(&self.target);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        self.task_handle = Some(runtime.spawn(async move {
            Self::sync_loop(target, interval, cancel).await;
        }));

        info!(interval_secs = interval.as_secs(), "Behavior sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler, awaiting the background task.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is not running or the task does not
    /// finish within `join_timeout`; in the latter case the task is aborted.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation_token.cancel();

        if let Some(mut handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, &mut handle).await {
                Ok(joined) => {
                    joined.map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
                }
                Err(_) => {
                    warn!(?join_timeout, "Sync task did not finish in time; aborting");
                    handle.abort();
                    return Err(SchedulerError::Timeout { duration: join_timeout });
                }
            }
        }

        info!("Behavior sync scheduler stopped");
        Ok(())
    }

    /// A scheduler is running if it has a task handle that hasn't finished.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn sync_loop(target: Weak<dyn SyncTarget>, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("Sync target dropped; exiting sync loop");
                        break;
                    };

                    let started = Instant::now();
                    let outcome = tokio::select! {
                        () = cancel.cancelled() => {
                            debug!("Sync loop cancelled during an in-flight sync");
                            break;
                        }
                        outcome = target.sync() => outcome,
                    };
                    match outcome {
                        Ok(()) => debug!(
                            duration_ms = started.elapsed().as_millis() as u64,
                            "Periodic behavior sync completed"
                        ),
                        Err(err) => warn!(
                            error = %err,
                            error_type = err.label(),
                            "Periodic behavior sync failed; will retry next tick"
                        ),
                    }
                }
            }
        }
    }
}

/// Ensure the background task is cancelled when the scheduler is dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if self.task_handle.is_some() && !self.cancellation_token.is_cancelled() {
            debug!("SyncScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct CountingTarget {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SyncTarget for CountingTarget {
        async fn sync(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WayfareError::Network("collector unreachable".into()))
            } else {
                Ok(())
            }
        }
    }

    fn scheduler_for(target: &Arc<CountingTarget>) -> SyncScheduler {
        let weak: Weak<CountingTarget> = Arc::downgrade(target);
        SyncScheduler::new(
            weak,
            SyncSchedulerConfig { interval: Duration::from_secs(30), ..Default::default() },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_lifecycle() {
        let target = Arc::new(CountingTarget { calls: AtomicUsize::new(0), fail: false });
        let mut scheduler = scheduler_for(&target);

        assert!(!scheduler.is_running());
        scheduler.start().unwrap();
        assert!(scheduler.is_running());

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_fails() {
        let target = Arc::new(CountingTarget { calls: AtomicUsize::new(0), fail: false });
        let mut scheduler = scheduler_for(&target);

        scheduler.start().unwrap();
        assert!(matches!(scheduler.start(), Err(SchedulerError::AlreadyRunning)));
        scheduler.stop().await.unwrap();
        assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_interval_and_survives_failures() {
        let target = Arc::new(CountingTarget { calls: AtomicUsize::new(0), fail: true });
        let mut scheduler = scheduler_for(&target);
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 3);
        assert!(scheduler.is_running());

        scheduler.stop().await.unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 3);
    }

    struct StalledTarget {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SyncTarget for StalledTarget {
        async fn sync(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_in_flight_sync() {
        let target = Arc::new(StalledTarget { calls: AtomicUsize::new(0) });
        let weak: Weak<StalledTarget> = Arc::downgrade(&target);
        let mut scheduler = SyncScheduler::new(
            weak,
            SyncSchedulerConfig { interval: Duration::from_secs(30), ..Default::default() },
        );
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 1);

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
        assert_eq!(Arc::strong_count(&target), 1, "sync loop released the target");
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_target_dropped() {
        let target = Arc::new(CountingTarget { calls: AtomicUsize::new(0), fail: false });
        let mut scheduler = scheduler_for(&target);
        scheduler.start().unwrap();

        drop(target);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!scheduler.is_running());
    }
}
