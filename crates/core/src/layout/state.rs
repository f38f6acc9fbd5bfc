//! Layout state owned by the adapter

use wayfare_domain::{ColorScheme, Density, LayoutSuggestion, SidebarPosition};

/// Layout currently shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedLayout {
    pub sidebar_position: SidebarPosition,
    pub density: Density,
    pub primary_widgets: Vec<String>,
    /// User-controlled; automatic adaptation never changes it
    pub collapsed: bool,
}

impl AppliedLayout {
    /// Whether any automatically adapted field differs from `suggestion`.
    ///
    /// `collapsed` and the color scheme are not compared.
    #[must_use]
    pub fn differs_from(&self, suggestion: &LayoutSuggestion) -> bool {
        self.sidebar_position != suggestion.sidebar_position
            || self.density != suggestion.density
            || self.primary_widgets != suggestion.primary_widgets
    }

    pub(crate) fn adopt(&mut self, suggestion: &LayoutSuggestion) {
        self.sidebar_position = suggestion.sidebar_position;
        self.density = suggestion.density;
        self.primary_widgets.clone_from(&suggestion.primary_widgets);
    }
}

/// Active theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Follow the operating system
    #[default]
    System,
    Dark,
    LowLight,
}

impl ThemeMode {
    /// Theme a color-scheme suggestion switches to; `Auto` switches nothing.
    #[must_use]
    pub fn from_suggestion(scheme: ColorScheme) -> Option<Self> {
        match scheme {
            ColorScheme::Auto => None,
            ColorScheme::Dark => Some(Self::Dark),
            ColorScheme::LowLight => Some(Self::LowLight),
        }
    }
}

/// Adaptation state machine: `Idle -> Pending -> Applying -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdaptationPhase {
    #[default]
    Idle,
    /// Transition delay running for the newest differing suggestion
    Pending,
    /// Suggested fields being written
    Applying,
}

/// Observable view of the adapter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutView {
    pub layout: AppliedLayout,
    pub theme: ThemeMode,
    pub phase: AdaptationPhase,
    pub notice_visible: bool,
    /// Number of transitions applied so far
    pub adaptations: u64,
}
