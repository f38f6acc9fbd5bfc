//! Per-user interaction behavior
//!
//! `UserBehavior` is the single in-memory record of one user's session. It
//! enforces its own bounds on every mutation so that callers cannot observe a
//! history longer than the constants in [`crate::constants`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::layout::{Density, SidebarPosition};
use super::snapshot::StoredBehavior;
use crate::constants::{
    DEFAULT_TIMEZONE, DEFAULT_WORKING_HOURS_END, DEFAULT_WORKING_HOURS_START, MAX_CLICK_PATTERNS,
    MAX_NAVIGATION_PATHS,
};

/// Screen coordinates of a click
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
pub struct ClickPosition {
    pub x: f64,
    pub y: f64,
}

/// Click as reported by the UI, before the recorder stamps it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInput {
    pub element_id: String,
    pub element_type: String,
    pub position: ClickPosition,
    #[serde(default)]
    pub context: String,
}

/// Recorded click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub element_id: String,
    pub element_type: String,
    #[cfg_attr(feature = "ts-gen", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    pub position: ClickPosition,
    pub context: String,
}

impl ClickEvent {
    /// Stamp a UI click with the time it was recorded.
    pub fn stamped(input: ClickInput, timestamp: DateTime<Utc>) -> Self {
        Self {
            element_id: input.element_id,
            element_type: input.element_type,
            timestamp,
            position: input.position,
            context: input.context,
        }
    }
}

/// Working-hours window, local hours `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
pub struct WorkingHours {
    pub start: u8,
    pub end: u8,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self { start: DEFAULT_WORKING_HOURS_START, end: DEFAULT_WORKING_HOURS_END }
    }
}

/// Explicit and derived layout preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub preferred_density: Density,
    pub preferred_sidebar_position: SidebarPosition,
    /// Cached top features from the latest analysis
    pub frequent_features: Vec<String>,
    pub working_hours: WorkingHours,
    /// IANA timezone name used for hour-of-day bucketing
    pub timezone: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_density: Density::default(),
            preferred_sidebar_position: SidebarPosition::default(),
            frequent_features: Vec::new(),
            working_hours: WorkingHours::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Preferences {
    /// Shallow merge: fields present in `update` replace the current values.
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(density) = update.preferred_density {
            self.preferred_density = density;
        }
        if let Some(position) = update.preferred_sidebar_position {
            self.preferred_sidebar_position = position;
        }
        if let Some(features) = update.frequent_features {
            self.frequent_features = features;
        }
        if let Some(hours) = update.working_hours {
            self.working_hours = hours;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
    }
}

/// Partial preferences for [`Preferences::merge`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesUpdate {
    pub preferred_density: Option<Density>,
    pub preferred_sidebar_position: Option<SidebarPosition>,
    pub frequent_features: Option<Vec<String>>,
    pub working_hours: Option<WorkingHours>,
    pub timezone: Option<String>,
}

/// Interaction history of one user for the lifetime of a session
#[derive(Debug, Clone, PartialEq)]
pub struct UserBehavior {
    user_id: String,
    pub feature_usage: HashMap<String, u64>,
    pub session_times: Vec<DateTime<Utc>>,
    pub click_patterns: Vec<ClickEvent>,
    pub navigation_paths: Vec<String>,
    pub dwell_times: HashMap<String, u64>,
    pub last_active: DateTime<Utc>,
    pub preferences: Preferences,
}

impl UserBehavior {
    /// Create an empty record; `now` becomes the initial `last_active`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            feature_usage: HashMap::new(),
            session_times: Vec::new(),
            click_patterns: Vec::new(),
            navigation_paths: Vec::new(),
            dwell_times: HashMap::new(),
            last_active: now,
            preferences: Preferences::default(),
        }
    }

    /// User the record belongs to
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Advance `last_active`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_active {
            self.last_active = now;
        }
    }

    pub fn record_session_start(&mut self, now: DateTime<Utc>) {
        self.session_times.push(now);
        self.touch(now);
    }

    /// Increment the usage counter for `feature_id`, returning the new count.
    pub fn record_feature(&mut self, feature_id: &str, now: DateTime<Utc>) -> u64 {
        let count = self.feature_usage.entry(feature_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let updated = *count;
        self.touch(now);
        updated
    }

    pub fn record_click(&mut self, event: ClickEvent) {
        let stamp = event.timestamp;
        self.click_patterns.push(event);
        truncate_front(&mut self.click_patterns, MAX_CLICK_PATTERNS);
        self.touch(stamp);
    }

    pub fn record_navigation(&mut self, path: &str, now: DateTime<Utc>) {
        self.navigation_paths.push(path.to_string());
        truncate_front(&mut self.navigation_paths, MAX_NAVIGATION_PATHS);
        self.touch(now);
    }

    /// Add `elapsed_ms` to the cumulative dwell time of `element_id`.
    pub fn add_dwell(&mut self, element_id: &str, elapsed_ms: u64, now: DateTime<Utc>) {
        let total = self.dwell_times.entry(element_id.to_string()).or_insert(0);
        *total = total.saturating_add(elapsed_ms);
        self.touch(now);
    }

    pub fn total_feature_usage(&self) -> u64 {
        self.feature_usage.values().fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Replace the fields present in a stored snapshot.
    ///
    /// Timestamps and click patterns are never restored.
    pub fn restore(&mut self, stored: StoredBehavior) {
        if let Some(feature_usage) = stored.feature_usage {
            self.feature_usage = feature_usage.into_iter().collect();
        }
        if let Some(dwell_times) = stored.dwell_times {
            self.dwell_times = dwell_times.into_iter().collect();
        }
        if let Some(mut paths) = stored.navigation_paths {
            truncate_front(&mut paths, MAX_NAVIGATION_PATHS);
            self.navigation_paths = paths;
        }
        if let Some(preferences) = stored.preferences {
            self.preferences = preferences;
        }
    }
}

/// Drop the oldest entries so that at most `bound` remain.
fn truncate_front<T>(items: &mut Vec<T>, bound: usize) {
    if items.len() > bound {
        let excess = items.len() - bound;
        items.drain(..excess);
    }
}
