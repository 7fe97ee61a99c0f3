//! Batch orchestrator
//!
//! Tickets run strictly one after another, in input order. Per ticket:
//! `Queued → Enriched (optional) → Classified | Failed`. A failing ticket
//! becomes an ERROR row; the batch always runs to the end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::progress::{ProgressEvent, ProgressTracker, TicketProgress};
use crate::classify::Classifier;
use crate::constants::pipeline::SNAPSHOT_EVERY;
use crate::tracker::IssueSource;
use crate::types::{ClassificationResult, Ticket, TicketKey, TicketRef};

/// Justification for tickets with no title from any source
pub const NO_TICKET_INFO: &str = "No se pudo obtener info del ticket (sin Jira ni titulo en CSV)";

/// Lifecycle of one ticket inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Queued,
    Enriched,
    Classified,
    Failed,
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Enriched => write!(f, "enriched"),
            Self::Classified => write!(f, "classified"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Output row of one ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTicket {
    pub key: TicketKey,
    /// Title the model saw, empty when none was found
    pub title: String,
    /// `Classified` or `Failed`
    pub state: TicketState,
    /// Whether tracker data was used
    pub enriched: bool,
    pub result: ClassificationResult,
}

/// Everything a finished batch produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<ClassifiedTicket>,
    /// Tickets whose tracker lookup failed or found nothing
    pub tracker_errors: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .filter(|t| t.state == TicketState::Failed)
            .count()
    }
}

/// Drives enrichment and classification over a batch of ticket refs
pub struct Pipeline {
    classifier: Classifier,
    tracker: Option<Arc<dyn IssueSource>>,
    progress: ProgressTracker,
}

impl Pipeline {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            tracker: None,
            progress: ProgressTracker::new(),
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn IssueSource>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    pub fn has_tracker(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Fetch `key` once before the batch. Not found or an error turns
    /// enrichment off for the run. Returns whether the tracker stays on.
    pub async fn preflight_tracker(&mut self, key: &TicketKey) -> bool {
        let Some(tracker) = &self.tracker else {
            return false;
        };

        let reason = match tracker.fetch(key.as_str()).await {
            Ok(Some(_)) => {
                info!(key = %key, "Tracker reachable");
                return true;
            }
            Ok(None) => format!("tracker did not find {}, check credentials", key),
            Err(e) => format!("tracker unavailable ({})", e),
        };

        warn!(key = %key, reason = %reason, "Disabling enrichment, using input titles");
        self.tracker = None;
        self.progress.emit(ProgressEvent::TrackerDisabled { reason });
        false
    }

    /// Classify every ref in order
    pub async fn run(&self, refs: &[TicketRef]) -> BatchReport {
        let total = refs.len();
        let start = Instant::now();
        let mut results: Vec<ClassifiedTicket> = Vec::with_capacity(total);
        let mut tracker_errors = 0;

        info!(total, provider = %self.classifier.provider_name(), "Starting batch");
        self.progress.emit(ProgressEvent::Started {
            total,
            provider: self.classifier.provider_name(),
        });

        for (index, reference) in refs.iter().enumerate() {
            let (ticket, state, tracker_failed) = self.enrich(reference).await;
            if tracker_failed {
                tracker_errors += 1;
            }

            let classified = self.classify(ticket, state).await;
            debug!(key = %classified.key, state = %classified.state, "Ticket done");
            results.push(classified);

            let done = index + 1;
            self.progress.emit(ProgressEvent::TicketDone(TicketProgress::new(
                done,
                total,
                start.elapsed(),
                reference.key.as_str(),
            )));

            if done % SNAPSHOT_EVERY == 0 || done == total {
                self.progress.emit(ProgressEvent::Snapshot {
                    results: results.clone(),
                });
            }
        }

        let report = BatchReport {
            results,
            tracker_errors,
            elapsed: start.elapsed(),
        };

        info!(
            total,
            errors = report.error_count(),
            tracker_errors,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Batch finished"
        );
        self.progress.emit(ProgressEvent::Finished {
            total,
            errors: report.error_count(),
            tracker_errors,
            elapsed: report.elapsed,
        });

        report
    }

    /// Build the ticket, from the tracker when possible. The flag reports
    /// a failed or empty tracker lookup.
    async fn enrich(&self, reference: &TicketRef) -> (Ticket, TicketState, bool) {
        let Some(tracker) = &self.tracker else {
            return (Ticket::from_ref(reference), TicketState::Queued, false);
        };

        match tracker.fetch(reference.key.as_str()).await {
            Ok(Some(details)) => {
                debug!(
                    key = %reference.key,
                    status = %details.status,
                    issue_type = %details.issue_type,
                    "Enriched from tracker"
                );
                (
                    Ticket::enriched(reference, details),
                    TicketState::Enriched,
                    false,
                )
            }
            Ok(None) => {
                warn!(key = %reference.key, "Issue not found in tracker");
                (Ticket::from_ref(reference), TicketState::Queued, true)
            }
            Err(e) => {
                warn!(key = %reference.key, error = %e, "Tracker lookup failed");
                (Ticket::from_ref(reference), TicketState::Queued, true)
            }
        }
    }

    async fn classify(&self, ticket: Ticket, state: TicketState) -> ClassifiedTicket {
        let enriched = state == TicketState::Enriched;

        let result = if ticket.has_title() {
            self.classifier.classify(&ticket).await
        } else {
            warn!(key = %ticket.key(), "No title available, skipping model call");
            ClassificationResult::error(NO_TICKET_INFO)
        };

        let state = if result.is_error() {
            TicketState::Failed
        } else {
            TicketState::Classified
        };

        ClassifiedTicket {
            key: ticket.key().clone(),
            title: ticket.title().to_string(),
            state,
            enriched,
            result,
        }
    }
}
