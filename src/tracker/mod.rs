//! Issue tracker enrichment
//!
//! - `client`: REST client with retry/backoff and the `IssueSource` seam
//! - `document`: rich-text description flattening

pub mod client;
pub mod document;

pub use client::{IssueSource, TrackerClient, TrackerRetryPolicy, TrackerSettings};
pub use document::extract_text;
