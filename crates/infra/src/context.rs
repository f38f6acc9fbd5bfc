//! Application context - dependency injection container
//!
//! Wires configuration, the HTTP collector and the tracking service together
//! for a host application.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};
use wayfare_core::{
    AppliedLayout, BehaviorRecorder, BehaviorTrackingService, LayoutAdapter, PatternAnalyzer,
    SubscriptionId,
};
use wayfare_domain::{Config, Result, WayfareError};

use crate::collector::HttpBehaviorCollector;
use crate::observability::{init_tracing, SyncMetrics};

/// Adapter fed by the active recorder
struct AttachedAdapter {
    adapter: LayoutAdapter,
    subscription: SubscriptionId,
}

/// Holds the services of one running application
///
/// The context owns at most one [`LayoutAdapter`]. It stays subscribed to
/// whichever recorder is active: starting a new session moves the
/// subscription to the new recorder.
pub struct WayfareContext {
    pub config: Config,
    pub metrics: Arc<SyncMetrics>,
    pub collector: Arc<HttpBehaviorCollector>,
    tracking: BehaviorTrackingService,
    adapter: Option<AttachedAdapter>,
}

impl WayfareContext {
    /// Load configuration (explicit path or probed), install tracing and
    /// build the context.
    ///
    /// # Errors
    /// Propagates configuration and collector construction errors.
    pub fn bootstrap(config_path: Option<PathBuf>) -> Result<Self> {
        let config = crate::config::load(config_path)?;
        init_tracing(&config.logging);
        Self::new(config)
    }

    /// Build the context from an already loaded configuration.
    ///
    /// # Errors
    /// Returns `WayfareError::Config` for invalid configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(SyncMetrics::new());
        let collector = Arc::new(
            HttpBehaviorCollector::from_config(&config.collector)?.with_metrics(Arc::clone(&metrics)),
        );
        let analyzer = PatternAnalyzer::from_config(&config.analysis)?;
        let tracking = BehaviorTrackingService::new(collector.clone(), config.sync.clone())
            .with_analyzer(analyzer);

        info!(collector = %collector.base_url(), "Wayfare context ready");

        Ok(Self { config, metrics, collector, tracking, adapter: None })
    }

    /// Start recording for `user_id` and restore the collector's stored copy.
    ///
    /// Replaces any active session. An existing layout adapter is detached
    /// from the previous recorder and attached to the new one.
    ///
    /// # Errors
    /// Propagates recorder start-up errors; a failed restore is only logged.
    pub async fn start_session(&mut self, user_id: &str) -> Result<BehaviorRecorder> {
        if let (Some(attached), Some(previous)) = (&self.adapter, self.tracking.active()) {
            attached.adapter.detach(previous, attached.subscription);
        }

        let recorder = self.tracking.initialize(user_id).await?;
        if let Some(attached) = self.adapter.as_mut() {
            attached.subscription = attached.adapter.attach(&recorder);
            debug!(user_id, "Layout adapter moved to new session");
        }

        recorder.load_from_backend().await;
        Ok(recorder)
    }

    /// Layout adapter fed by the active recorder.
    ///
    /// The first call creates the adapter showing `initial`; later calls
    /// return the same adapter and ignore `initial`.
    ///
    /// # Errors
    /// Returns `WayfareError::Unavailable` without an active session or
    /// outside a Tokio runtime.
    pub fn layout_adapter(&mut self, initial: AppliedLayout) -> Result<LayoutAdapter> {
        if let Some(attached) = &self.adapter {
            return Ok(attached.adapter.clone());
        }

        let recorder = self
            .tracking
            .active()
            .ok_or_else(|| WayfareError::Unavailable("no active behavior session".into()))?;

        let adapter = LayoutAdapter::new(initial, self.config.layout)?;
        let subscription = adapter.attach(recorder);
        self.adapter = Some(AttachedAdapter { adapter: adapter.clone(), subscription });
        Ok(adapter)
    }

    /// Recorder of the current session, if one was started
    #[must_use]
    pub fn active_session(&self) -> Option<&BehaviorRecorder> {
        self.tracking.active()
    }

    /// Stop the layout adapter and destroy the active recorder (final sync
    /// awaited).
    pub async fn shutdown(&mut self) {
        if let Some(attached) = self.adapter.take() {
            if let Some(recorder) = self.tracking.active() {
                attached.adapter.detach(recorder, attached.subscription);
            }
            attached.adapter.shutdown();
        }
        self.tracking.shutdown().await;
        info!(metrics = ?self.metrics.snapshot(), "Wayfare context shut down");
    }
}
