//! Layout vocabulary shared by the analyzer and the layout adapter

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// Spacing density of the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Comfortable,
    Spacious,
}

impl_domain_status_conversions!(Density {
    Compact => "compact",
    Comfortable => "comfortable",
    Spacious => "spacious",
});

/// Side of the screen the sidebar is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    #[default]
    Left,
    Right,
}

impl_domain_status_conversions!(SidebarPosition {
    Left => "left",
    Right => "right",
});

/// Suggested color scheme
///
/// `Auto` means "no opinion": consumers leave their current theme alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    Auto,
    Dark,
    LowLight,
}

impl_domain_status_conversions!(ColorScheme {
    Auto => "auto",
    Dark => "dark",
    LowLight => "low-light",
});
