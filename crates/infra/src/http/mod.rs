//! HTTP plumbing shared by remote adapters

mod client;

pub use client::{HttpClient, RetryPolicy};
