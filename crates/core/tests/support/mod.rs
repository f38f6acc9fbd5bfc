//! Shared test helpers for `wayfare-core` integration tests.
//!
//! Lightweight in-memory stand-ins for the collector and clock ports so the
//! tests can focus on recorder behavior instead of boilerplate.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use wayfare_core::behavior::RecorderDeps;
use wayfare_core::{BehaviorCollector, Clock, PatternAnalyzer};
use wayfare_domain::{BehaviorSnapshot, Result, StoredBehavior, SyncConfig, WayfareError};

/// Collector that records every push and serves a canned stored snapshot
#[derive(Default)]
pub struct MockCollector {
    pushes: Mutex<Vec<BehaviorSnapshot>>,
    stored: Mutex<Option<StoredBehavior>>,
    fail_push: Mutex<bool>,
    fail_fetch: Mutex<bool>,
    fetches: AtomicUsize,
}

impl MockCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_stored(stored: StoredBehavior) -> Arc<Self> {
        let collector = Self::default();
        *collector.stored.lock() = Some(stored);
        Arc::new(collector)
    }

    pub fn set_push_failure(&self, fail: bool) {
        *self.fail_push.lock() = fail;
    }

    pub fn set_fetch_failure(&self, fail: bool) {
        *self.fail_fetch.lock() = fail;
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn last_push(&self) -> Option<BehaviorSnapshot> {
        self.pushes.lock().last().cloned()
    }
}

#[async_trait]
impl BehaviorCollector for MockCollector {
    async fn push(&self, snapshot: &BehaviorSnapshot) -> Result<()> {
        if *self.fail_push.lock() {
            return Err(WayfareError::Network("collector unreachable".into()));
        }
        self.pushes.lock().push(snapshot.clone());
        Ok(())
    }

    async fn fetch(&self, _user_id: &str) -> Result<Option<StoredBehavior>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if *self.fail_fetch.lock() {
            return Err(WayfareError::Serialization("malformed body".into()));
        }
        Ok(self.stored.lock().clone())
    }
}

/// Clock advanced by hand
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock starting at 2024-05-06 10:00:00 UTC (a Monday morning).
    pub fn new() -> Arc<Self> {
        Self::at(Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0).unwrap())
    }

    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self { now: Mutex::new(now) })
    }

    pub fn advance_ms(&self, ms: i64) {
        *self.now.lock() += Duration::milliseconds(ms);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

pub fn deps(collector: Arc<MockCollector>, clock: Arc<ManualClock>) -> RecorderDeps {
    RecorderDeps { collector, clock, analyzer: PatternAnalyzer::default() }
}

/// Sync settings with the periodic timer switched off
pub fn manual_sync() -> SyncConfig {
    SyncConfig { enabled: false, ..SyncConfig::default() }
}
