//! Port interfaces for behavior recording
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wayfare_domain::{BehaviorSnapshot, Result, StoredBehavior};

/// Trait for the remote behavior collector
#[async_trait]
pub trait BehaviorCollector: Send + Sync {
    /// Transmit a serialized behavior snapshot
    async fn push(&self, snapshot: &BehaviorSnapshot) -> Result<()>;

    /// Fetch the previously stored snapshot for `user_id`
    ///
    /// Returns `Ok(None)` when the collector has nothing stored.
    async fn fetch(&self, user_id: &str) -> Result<Option<StoredBehavior>>;
}

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
