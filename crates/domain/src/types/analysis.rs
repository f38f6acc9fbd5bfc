//! Analyzer outputs

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::layout::{ColorScheme, Density, SidebarPosition};

/// Non-binding layout recommendation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct LayoutSuggestion {
    pub sidebar_position: SidebarPosition,
    pub primary_widgets: Vec<String>,
    pub color_scheme: ColorScheme,
    pub density: Density,
}

/// Aggregate statistics derived from a behavior snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub frequent_paths: Vec<String>,
    /// Local hours (0-23), ascending
    pub peak_usage_times: Vec<u32>,
    pub preferred_features: Vec<String>,
    pub suggested_layout: LayoutSuggestion,
}
