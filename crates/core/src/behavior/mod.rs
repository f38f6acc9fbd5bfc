//! Behavior recording: per-user interaction history, periodic sync and
//! analysis notifications.

pub mod events;
pub mod ports;
pub mod recorder;
pub mod scheduler;
pub mod service;

pub use recorder::{BehaviorRecorder, RecorderDeps};
pub use service::BehaviorTrackingService;
