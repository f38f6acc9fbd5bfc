//! Remote behavior collector adapter

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::HttpBehaviorCollector;
pub use errors::{CollectorError, CollectorErrorCategory, CollectorResult};
