//! Layout adaptation: apply layout suggestions to the visible UI state.

mod adapter;
mod state;

pub use adapter::LayoutAdapter;
pub use state::{AdaptationPhase, AppliedLayout, LayoutView, ThemeMode};
