//! Domain types and models

pub mod analysis;
pub mod behavior;
pub mod layout;
pub mod snapshot;

pub use analysis::{LayoutSuggestion, PatternAnalysis};
pub use behavior::{
    ClickEvent, ClickInput, ClickPosition, Preferences, PreferencesUpdate, UserBehavior,
    WorkingHours,
};
pub use layout::{ColorScheme, Density, SidebarPosition};
pub use snapshot::{BehaviorSnapshot, StoredBehavior};
