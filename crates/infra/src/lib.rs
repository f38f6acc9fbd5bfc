//! # Wayfare Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP behavior collector (`POST /behavior`, `GET /behavior/{user}`)
//! - An HTTP client with a bounded retry budget
//! - The configuration file loader
//! - Tracing setup and sync metrics
//!
//! ## Architecture
//! - Implements traits defined in `wayfare-core`
//! - Contains all "impure" code (network, filesystem, global subscriber)

pub mod collector;
pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use collector::{
    AccessTokenProvider, CollectorError, CollectorErrorCategory, HttpBehaviorCollector,
    StaticTokenProvider,
};
pub use context::WayfareContext;
pub use errors::InfraError;
pub use http::{HttpClient, RetryPolicy};
pub use observability::{init_tracing, SyncMetrics, SyncMetricsSnapshot};
