//! Pattern analysis: derive aggregate statistics and a layout suggestion from
//! a behavior record.

mod analyzer;

pub use analyzer::{color_scheme_for_hour, density_for_usage, peak_usage_hours, PatternAnalyzer};
