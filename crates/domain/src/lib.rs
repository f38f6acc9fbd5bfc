//! # Wayfare Domain
//!
//! Business domain types for behavior-driven layout adaptation.
//!
//! This crate contains:
//! - Behavior records (`UserBehavior`, `ClickEvent`, `Preferences`)
//! - Analysis outputs (`PatternAnalysis`, `LayoutSuggestion`)
//! - Wire snapshots exchanged with the remote collector
//! - Configuration structures, constants and the domain error type
//!
//! ## Architecture
//! - No dependencies on other Wayfare crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
