//! Behavior tracking service
//!
//! Owns at most one active [`BehaviorRecorder`]. The service is created once by
//! the host application and passed to whatever needs the recorder; there is no
//! process-global recorder.

use std::sync::Arc;

use tracing::info;
use wayfare_domain::{Result, SyncConfig};

use super::ports::{BehaviorCollector, Clock, SystemClock};
use super::recorder::{BehaviorRecorder, RecorderDeps};
use crate::analysis::PatternAnalyzer;

/// Behavior tracking service
pub struct BehaviorTrackingService {
    deps: RecorderDeps,
    sync: SyncConfig,
    active: Option<BehaviorRecorder>,
}

impl BehaviorTrackingService {
    /// Create a service using the system clock and default analyzer
    pub fn new(collector: Arc<dyn BehaviorCollector>, sync: SyncConfig) -> Self {
        Self {
            deps: RecorderDeps {
                collector,
                clock: Arc::new(SystemClock),
                analyzer: PatternAnalyzer::default(),
            },
            sync,
            active: None,
        }
    }

    /// Replace the clock used by recorders created from now on
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.deps.clock = clock;
        self
    }

    /// Replace the analyzer used by recorders created from now on
    pub fn with_analyzer(mut self, analyzer: PatternAnalyzer) -> Self {
        self.deps.analyzer = analyzer;
        self
    }

    /// Start recording for `user_id`.
    ///
    /// Any previously active recorder, for this or another user, is destroyed
    /// first (its final sync is awaited). Nothing is carried over.
    ///
    /// # Errors
    ///
    /// Propagates recorder start-up errors (empty user id, no runtime).
    pub async fn initialize(&mut self, user_id: &str) -> Result<BehaviorRecorder> {
        if let Some(previous) = self.active.take() {
            info!(
                previous_user = previous.user_id(),
                next_user = user_id,
                "Replacing active behavior recorder"
            );
            previous.destroy().await;
        }

        let recorder = BehaviorRecorder::start(user_id, self.deps.clone(), &self.sync).await?;
        self.active = Some(recorder.clone());
        Ok(recorder)
    }

    /// Destroy the active recorder, if any.
    pub async fn shutdown(&mut self) {
        if let Some(recorder) = self.active.take() {
            recorder.destroy().await;
        }
    }

    /// Recorder started by the last successful `initialize`
    #[must_use]
    pub fn active(&self) -> Option<&BehaviorRecorder> {
        self.active.as_ref()
    }
}
