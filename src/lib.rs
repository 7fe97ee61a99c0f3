//! porotos - LLM classifier for quarterly TMO tickets
//!
//! Reads ticket keys from a loosely formatted table, optionally enriches
//! each ticket from Jira, asks an LLM to classify it and normalizes the
//! reply into a fixed taxonomy.
//!
//! ## Quick Start
//!
//! ```ignore
//! use porotos::ai::{ProviderConfig, ProviderKind, create_gateway};
//! use porotos::classify::{Classifier, RetryPolicy};
//! use porotos::pipeline::Pipeline;
//!
//! let gateway = create_gateway(ProviderConfig::new(ProviderKind::Groq, key))?;
//! let pipeline = Pipeline::new(Classifier::new(gateway, RetryPolicy::default()));
//! let report = pipeline.run(&refs).await;
//! ```
//!
//! ## Modules
//!
//! - [`ingest`]: ticket key and title extraction from input tables
//! - [`tracker`]: Jira client and rich-text flattening
//! - [`ai`]: LLM gateways, prompt, reply parsing
//! - [`classify`]: retry loop and taxonomy normalization
//! - [`pipeline`]: sequential batch orchestration and progress events
//! - [`output`]: result table and run summary
//! - [`config`]: layered configuration

pub mod ai;
pub mod classify;
pub mod cli;
pub mod config;
pub mod constants;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod tracker;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, LlmError, PorotoError, Result};
pub use types::{ClassificationResult, Ticket, TicketKey, TicketRef};

pub use classify::Classifier;
pub use pipeline::{BatchReport, Pipeline};
