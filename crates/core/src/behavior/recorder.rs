//! Behavior recorder - core business logic
//!
//! Accumulates one user's interaction history, re-analyzes it on feature and
//! navigation events, publishes the analysis to subscribers and periodically
//! pushes a snapshot to the remote collector.
//!
//! All tracking calls mutate state synchronously under a short lock. Network
//! work (sync, load) happens outside the lock: events recorded while a sync is
//! in flight are picked up by the next one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use wayfare_domain::{
    BehaviorSnapshot, ClickEvent, ClickInput, PatternAnalysis, PreferencesUpdate, Result,
    SyncConfig, UserBehavior, WayfareError,
};

use super::events::{BehaviorEvent, ObserverRegistry, SubscriptionId};
use super::ports::{BehaviorCollector, Clock};
use super::scheduler::{SyncScheduler, SyncSchedulerConfig, SyncTarget};
use crate::analysis::PatternAnalyzer;

/// Collaborators injected into a recorder
#[derive(Clone)]
pub struct RecorderDeps {
    pub collector: Arc<dyn BehaviorCollector>,
    pub clock: Arc<dyn Clock>,
    pub analyzer: PatternAnalyzer,
}

struct RecorderState {
    behavior: UserBehavior,
    dwell_starts: HashMap<String, DateTime<Utc>>,
    latest_analysis: Option<PatternAnalysis>,
}

struct RecorderInner {
    session_id: Uuid,
    user_id: String,
    state: Mutex<RecorderState>,
    observers: ObserverRegistry,
    deps: RecorderDeps,
    request_timeout: Duration,
    scheduler: tokio::sync::Mutex<Option<SyncScheduler>>,
    destroyed: AtomicBool,
}

/// Handle to the active behavior recorder for one user
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct BehaviorRecorder {
    inner: Arc<RecorderInner>,
}

impl BehaviorRecorder {
    /// Create a recorder for `user_id`, record a session start and begin
    /// periodic synchronization (when enabled).
    ///
    /// # Errors
    ///
    /// Returns `WayfareError::InvalidInput` for an empty user id and
    /// `WayfareError::Unavailable` when called outside a Tokio runtime.
    #[instrument(skip(deps, sync))]
    pub async fn start(user_id: &str, deps: RecorderDeps, sync: &SyncConfig) -> Result<Self> {
        if user_id.trim().is_empty() {
            return Err(WayfareError::InvalidInput("user id must not be empty".into()));
        }

        let now = deps.clock.now();
        let mut behavior = UserBehavior::new(user_id, now);
        behavior.record_session_start(now);

        let inner = Arc::new(RecorderInner {
            session_id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            state: Mutex::new(RecorderState {
                behavior,
                dwell_starts: HashMap::new(),
                latest_analysis: None,
            }),
            observers: ObserverRegistry::new(),
            deps,
            request_timeout: sync.request_timeout(),
            scheduler: tokio::sync::Mutex::new(None),
            destroyed: AtomicBool::new(false),
        });

        if sync.enabled {
            let weak: Weak<RecorderInner> = Arc::downgrade(&inner);
            let mut scheduler = SyncScheduler::new(
                weak,
                SyncSchedulerConfig { interval: sync.interval(), ..SyncSchedulerConfig::default() },
            );
            scheduler.start()?;
            *inner.scheduler.lock().await = Some(scheduler);
        }

        info!(
            user_id = %inner.user_id,
            session_id = %inner.session_id,
            periodic_sync = sync.enabled,
            "Behavior recorder initialized"
        );

        Ok(Self { inner })
    }

    /// User this recorder was started for
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Identifier of this recording session, unique per `start`
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Count one invocation of `feature_id` and re-analyze.
    pub fn track_feature_usage(&self, feature_id: &str) {
        if feature_id.is_empty() {
            debug!("Ignoring feature usage with empty id");
            return;
        }
        let now = self.inner.deps.clock.now();
        let analysis = {
            let mut state = self.inner.state.lock();
            state.behavior.record_feature(feature_id, now);
            self.inner.reanalyze(&mut state, now)
        };
        self.inner.observers.notify(BehaviorEvent::PatternsUpdated, &analysis);
    }

    /// Record a click. Clicks do not trigger re-analysis.
    pub fn track_click(&self, click: ClickInput) {
        if click.element_id.is_empty() {
            debug!("Ignoring click with empty element id");
            return;
        }
        let now = self.inner.deps.clock.now();
        self.inner.state.lock().behavior.record_click(ClickEvent::stamped(click, now));
    }

    /// Record a navigation to `path` and re-analyze.
    pub fn track_navigation(&self, path: &str) {
        if path.is_empty() {
            debug!("Ignoring navigation with empty path");
            return;
        }
        let now = self.inner.deps.clock.now();
        let analysis = {
            let mut state = self.inner.state.lock();
            state.behavior.record_navigation(path, now);
            self.inner.reanalyze(&mut state, now)
        };
        self.inner.observers.notify(BehaviorEvent::PatternsUpdated, &analysis);
    }

    /// Mark the start of a dwell on `element_id`; a second start overwrites
    /// the first.
    pub fn start_dwell(&self, element_id: &str) {
        if element_id.is_empty() {
            return;
        }
        let now = self.inner.deps.clock.now();
        let mut state = self.inner.state.lock();
        state.dwell_starts.insert(element_id.to_string(), now);
        state.behavior.touch(now);
    }

    /// Close a dwell on `element_id`. Without a matching start this is a
    /// no-op.
    pub fn end_dwell(&self, element_id: &str) {
        let now = self.inner.deps.clock.now();
        let mut state = self.inner.state.lock();
        let Some(started) = state.dwell_starts.remove(element_id) else {
            debug!(element_id, "Dwell end without start ignored");
            return;
        };
        let elapsed_ms = u64::try_from((now - started).num_milliseconds()).unwrap_or(0);
        state.behavior.add_dwell(element_id, elapsed_ms, now);
    }

    /// Merge preferences and push a snapshot right away.
    ///
    /// A failed push is logged, never returned.
    pub async fn update_preferences(&self, update: PreferencesUpdate) {
        {
            let mut state = self.inner.state.lock();
            state.behavior.preferences.merge(update);
            let now = self.inner.deps.clock.now();
            state.behavior.touch(now);
        }
        self.inner.sync_logged("preferences_update").await;
    }

    /// Replace feature usage, dwell times, navigation paths and preferences
    /// with the collector's stored copy.
    ///
    /// Returns whether anything was restored. Failures and malformed
    /// responses leave memory untouched and are logged.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn load_from_backend(&self) -> bool {
        let fetch = self.inner.deps.collector.fetch(&self.inner.user_id);
        let outcome = match tokio::time::timeout(self.inner.request_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(WayfareError::Network(format!(
                "load timed out after {:?}",
                self.inner.request_timeout
            ))),
        };

        match outcome {
            Ok(Some(stored)) => {
                self.inner.state.lock().behavior.restore(stored);
                info!("Behavior restored from collector");
                true
            }
            Ok(None) => {
                debug!("Collector has no stored behavior");
                false
            }
            Err(err) => {
                warn!(error = %err, error_type = err.label(), "Failed to load behavior; keeping in-memory state");
                false
            }
        }
    }

    /// Push a snapshot now, reporting the outcome.
    pub async fn sync_now(&self) -> Result<()> {
        self.inner.sync().await
    }

    /// Register a handler for `event`.
    pub fn subscribe<F>(&self, event: BehaviorEvent, handler: F) -> SubscriptionId
    where
        F: Fn(&PatternAnalysis) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(event, handler)
    }

    /// Remove a handler; unknown ids are ignored.
    pub fn unsubscribe(&self, event: BehaviorEvent, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(event, id)
    }

    /// Clone of the current behavior record.
    #[must_use]
    pub fn snapshot(&self) -> UserBehavior {
        self.inner.state.lock().behavior.clone()
    }

    /// Analysis published by the most recent re-analysis, if any.
    #[must_use]
    pub fn latest_analysis(&self) -> Option<PatternAnalysis> {
        self.inner.state.lock().latest_analysis.clone()
    }

    /// Analyze current state without publishing.
    #[must_use]
    pub fn analyze(&self) -> PatternAnalysis {
        let now = self.inner.deps.clock.now();
        let state = self.inner.state.lock();
        self.inner.deps.analyzer.analyze(&state.behavior, now)
    }

    pub async fn is_syncing_periodically(&self) -> bool {
        self.inner.scheduler.lock().await.as_ref().is_some_and(SyncScheduler::is_running)
    }

    /// Whether `destroy` has been called
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    /// Stop periodic sync and push one final snapshot.
    ///
    /// The timer is stopped before this returns; the final sync is awaited
    /// and its failure only logged. Calling `destroy` again does nothing.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            debug!("Recorder already destroyed");
            return;
        }

        if let Some(mut scheduler) = self.inner.scheduler.lock().await.take() {
            if let Err(err) = scheduler.stop().await {
                warn!(error = %err, "Failed to stop behavior sync scheduler cleanly");
            }
        }

        self.inner.sync_logged("teardown").await;
        info!(session_id = %self.inner.session_id, "Behavior recorder destroyed");
    }
}

impl std::fmt::Debug for BehaviorRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRecorder")
            .field("user_id", &self.inner.user_id)
            .field("session_id", &self.inner.session_id)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

impl RecorderInner {
    fn reanalyze(&self, state: &mut RecorderState, now: DateTime<Utc>) -> PatternAnalysis {
        let analysis = self.deps.analyzer.analyze(&state.behavior, now);
        state.behavior.preferences.frequent_features = analysis.preferred_features.clone();
        state.latest_analysis = Some(analysis.clone());
        analysis
    }

    async fn sync_logged(&self, trigger: &'static str) {
        match self.sync().await {
            Ok(()) => debug!(trigger, "Behavior sync completed"),
            Err(err) => warn!(
                trigger,
                user_id = %self.user_id,
                error = %err,
                error_type = err.label(),
                "Behavior sync failed"
            ),
        }
    }
}

#[async_trait]
impl SyncTarget for RecorderInner {
    async fn sync(&self) -> Result<()> {
        let snapshot = BehaviorSnapshot::capture(&self.state.lock().behavior);
        match tokio::time::timeout(self.request_timeout, self.deps.collector.push(&snapshot)).await
        {
            Ok(result) => result,
            Err(_) => Err(WayfareError::Network(format!(
                "sync timed out after {:?}",
                self.request_timeout
            ))),
        }
    }
}
