//! Application constants
//!
//! Centralized location for the fixed bounds and thresholds of behavior
//! tracking and pattern analysis. None of these are configurable.

// History bounds
pub const MAX_CLICK_PATTERNS: usize = 1000;
pub const MAX_NAVIGATION_PATHS: usize = 500;
/// Navigation paths included in a single sync transmission.
pub const SYNC_NAVIGATION_PATHS: usize = 100;

// Analysis output sizes
pub const TOP_PATTERN_COUNT: usize = 10;
pub const PRIMARY_WIDGET_COUNT: usize = 5;

// Density thresholds on total feature usage (strict inequalities)
pub const COMPACT_USAGE_THRESHOLD: u64 = 100;
pub const SPACIOUS_USAGE_THRESHOLD: u64 = 20;

// Color scheme windows, local hour-of-day, half-open ranges
pub const LOW_LIGHT_START_HOUR: u32 = 22;
pub const LOW_LIGHT_END_HOUR: u32 = 5;
pub const DARK_START_HOUR: u32 = 18;

pub const HOURS_PER_DAY: usize = 24;

// Reference timings
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TRANSITION_DELAY_MS: u64 = 300;
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3000;

// Default working hours
pub const DEFAULT_WORKING_HOURS_START: u8 = 9;
pub const DEFAULT_WORKING_HOURS_END: u8 = 17;

pub const DEFAULT_TIMEZONE: &str = "UTC";
