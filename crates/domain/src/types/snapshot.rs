//! Wire formats exchanged with the remote behavior collector
//!
//! The in-memory record keeps hash maps; the transport boundary uses ordered
//! maps so request bodies are stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::behavior::{Preferences, UserBehavior};
use crate::constants::SYNC_NAVIGATION_PATHS;

/// Body of an outbound sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSnapshot {
    pub user_id: String,
    pub feature_usage: BTreeMap<String, u64>,
    #[cfg_attr(feature = "ts-gen", ts(type = "string[]"))]
    pub session_times: Vec<DateTime<Utc>>,
    pub navigation_paths: Vec<String>,
    pub dwell_times: BTreeMap<String, u64>,
    #[cfg_attr(feature = "ts-gen", ts(type = "string"))]
    pub last_active: DateTime<Utc>,
    pub preferences: Preferences,
}

impl BehaviorSnapshot {
    /// Serialize a behavior record for transmission.
    ///
    /// Only the most recent navigation paths are sent; the record itself is
    /// not modified.
    #[must_use]
    pub fn capture(behavior: &UserBehavior) -> Self {
        let paths = &behavior.navigation_paths;
        let start = paths.len().saturating_sub(SYNC_NAVIGATION_PATHS);

        Self {
            user_id: behavior.user_id().to_string(),
            feature_usage: behavior
                .feature_usage
                .iter()
                .map(|(feature, count)| (feature.clone(), *count))
                .collect(),
            session_times: behavior.session_times.clone(),
            navigation_paths: paths[start..].to_vec(),
            dwell_times: behavior
                .dwell_times
                .iter()
                .map(|(element, ms)| (element.clone(), *ms))
                .collect(),
            last_active: behavior.last_active,
            preferences: behavior.preferences.clone(),
        }
    }
}

/// Body of an inbound load; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredBehavior {
    pub feature_usage: Option<BTreeMap<String, u64>>,
    pub dwell_times: Option<BTreeMap<String, u64>>,
    pub navigation_paths: Option<Vec<String>>,
    pub preferences: Option<Preferences>,
}
