//! # Wayfare Core
//!
//! Behavior-driven layout adaptation - no infrastructure dependencies.
//!
//! This crate contains:
//! - The behavior recorder and its periodic sync scheduler
//! - The pattern analyzer (behavior -> layout suggestion)
//! - The layout adapter state machine
//! - Port interfaces (traits) for the remote collector and the clock
//!
//! ## Architecture Principles
//! - Only depends on `wayfare-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod analysis;
pub mod behavior;
pub mod layout;

pub use analysis::PatternAnalyzer;
pub use behavior::events::{BehaviorEvent, SubscriptionId};
pub use behavior::ports::{BehaviorCollector, Clock, SystemClock};
pub use behavior::scheduler::{SchedulerError, SyncScheduler, SyncSchedulerConfig, SyncTarget};
pub use behavior::{BehaviorRecorder, BehaviorTrackingService};
pub use layout::{AdaptationPhase, AppliedLayout, LayoutAdapter, LayoutView, ThemeMode};
