//! Batch pipeline
//!
//! - `orchestrator`: sequential enrichment + classification over a batch
//! - `progress`: broadcast progress events for renderers

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{BatchReport, ClassifiedTicket, NO_TICKET_INFO, Pipeline, TicketState};
pub use progress::{ProgressEvent, ProgressTracker, TicketProgress};
