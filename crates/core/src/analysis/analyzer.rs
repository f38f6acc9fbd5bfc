//! Pattern analyzer
//!
//! A pure function of a [`UserBehavior`] and the current instant. Hour-of-day
//! values are taken in the user's timezone (`preferences.timezone`), falling
//! back to the analyzer's default zone when that name is not a known IANA
//! zone.

use ahash::AHashMap as HashMap; // Fast non-cryptographic hasher
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use wayfare_domain::constants::{
    COMPACT_USAGE_THRESHOLD, DARK_START_HOUR, HOURS_PER_DAY, LOW_LIGHT_END_HOUR,
    LOW_LIGHT_START_HOUR, PRIMARY_WIDGET_COUNT, SPACIOUS_USAGE_THRESHOLD, TOP_PATTERN_COUNT,
};
use wayfare_domain::{
    AnalysisConfig, ColorScheme, Density, LayoutSuggestion, PatternAnalysis, Result,
    UserBehavior, WayfareError,
};

/// Derives [`PatternAnalysis`] values from behavior records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternAnalyzer {
    default_timezone: Tz,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl PatternAnalyzer {
    /// Analyzer resolving unknown user timezones to `default_timezone`
    #[must_use]
    pub fn new(default_timezone: Tz) -> Self {
        Self { default_timezone }
    }

    /// Build an analyzer from configuration.
    ///
    /// # Errors
    /// Returns `WayfareError::Config` when the default timezone is unknown.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let timezone = config.default_timezone.parse::<Tz>().map_err(|_| {
            WayfareError::Config(format!(
                "unknown default timezone: {}",
                config.default_timezone
            ))
        })?;
        Ok(Self::new(timezone))
    }

    /// Analyze a behavior record as of `now`.
    #[must_use]
    pub fn analyze(&self, behavior: &UserBehavior, now: DateTime<Utc>) -> PatternAnalysis {
        let timezone = self.timezone_for(&behavior.preferences.timezone);

        let frequent_paths = rank_by_frequency(
            count_occurrences(behavior.navigation_paths.iter().map(String::as_str)),
            TOP_PATTERN_COUNT,
        );
        let peak_usage_times = peak_usage_hours(&behavior.session_times, timezone);
        let preferred_features = rank_by_frequency(
            behavior.feature_usage.iter().map(|(feature, count)| (feature.as_str(), *count)).collect(),
            TOP_PATTERN_COUNT,
        );

        let local_hour = now.with_timezone(&timezone).hour();
        let suggested_layout = LayoutSuggestion {
            sidebar_position: behavior.preferences.preferred_sidebar_position,
            primary_widgets: preferred_features.iter().take(PRIMARY_WIDGET_COUNT).cloned().collect(),
            color_scheme: color_scheme_for_hour(local_hour),
            density: density_for_usage(behavior.total_feature_usage()),
        };

        PatternAnalysis { frequent_paths, peak_usage_times, preferred_features, suggested_layout }
    }

    fn timezone_for(&self, name: &str) -> Tz {
        name.parse::<Tz>().unwrap_or(self.default_timezone)
    }
}

/// Color scheme for a local hour-of-day.
///
/// `[22, 24) ∪ [0, 5)` is low-light, `[18, 22)` is dark, everything else is
/// auto.
pub fn color_scheme_for_hour(hour: u32) -> ColorScheme {
    if hour >= LOW_LIGHT_START_HOUR || hour < LOW_LIGHT_END_HOUR {
        ColorScheme::LowLight
    } else if hour >= DARK_START_HOUR {
        ColorScheme::Dark
    } else {
        ColorScheme::Auto
    }
}

/// Density for a total feature-usage count.
///
/// Strictly above 100 is compact, strictly below 20 is spacious; both
/// boundaries themselves are comfortable.
pub fn density_for_usage(total: u64) -> Density {
    if total > COMPACT_USAGE_THRESHOLD {
        Density::Compact
    } else if total < SPACIOUS_USAGE_THRESHOLD {
        Density::Spacious
    } else {
        Density::Comfortable
    }
}

/// Hours whose session count is strictly above the mean over all 24 hours.
pub fn peak_usage_hours(session_times: &[DateTime<Utc>], timezone: Tz) -> Vec<u32> {
    let mut buckets = [0u64; HOURS_PER_DAY];
    for time in session_times {
        let hour = time.with_timezone(&timezone).hour() as usize;
        buckets[hour] += 1;
    }

    let mean = session_times.len() as f64 / HOURS_PER_DAY as f64;
    (0u32..)
        .zip(buckets.iter())
        .filter(|(_, count)| **count as f64 > mean)
        .map(|(hour, _)| hour)
        .collect()
}

fn count_occurrences<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Sort by descending count and keep the first `limit` keys.
///
/// Equal counts are ordered by key so repeated analyses agree.
fn rank_by_frequency(mut counts: Vec<(&str, u64)>, limit: usize) -> Vec<String> {
    counts.sort_by(|(a_key, a_count), (b_key, b_count)| {
        b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
    });
    counts.into_iter().take(limit).map(|(key, _)| key.to_string()).collect()
}
