//! Batch progress events
//!
//! The orchestrator emits events through a broadcast channel; the CLI (or a
//! test) subscribes and renders them. Nothing here feeds back into the
//! classification itself.

use std::time::Duration;

use tokio::sync::broadcast;

use super::orchestrator::ClassifiedTicket;

/// Progress event types
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Batch started
    Started { total: usize, provider: String },
    /// Enrichment turned off for the rest of the run
    TrackerDisabled { reason: String },
    /// One ticket finished
    TicketDone(TicketProgress),
    /// Accumulated results so far, every few tickets and after the last one
    Snapshot { results: Vec<ClassifiedTicket> },
    /// Batch finished
    Finished {
        total: usize,
        errors: usize,
        tracker_errors: usize,
        elapsed: Duration,
    },
}

/// Counters after one ticket
#[derive(Debug, Clone, PartialEq)]
pub struct TicketProgress {
    pub done: usize,
    pub total: usize,
    pub last_key: String,
    /// Running average seconds per ticket
    pub avg_secs: f64,
    /// Estimated seconds left at the running average
    pub eta_secs: f64,
}

impl TicketProgress {
    pub fn new(done: usize, total: usize, elapsed: Duration, last_key: impl Into<String>) -> Self {
        let avg_secs = if done > 0 {
            elapsed.as_secs_f64() / done as f64
        } else {
            0.0
        };

        Self {
            done,
            total,
            last_key: last_key.into(),
            avg_secs,
            eta_secs: avg_secs * total.saturating_sub(done) as f64,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// Broadcast handle for progress events
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    sender: broadcast::Sender<ProgressEvent>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Send an event; silently dropped when nobody listens
    #[inline]
    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_progress_eta() {
        let progress = TicketProgress::new(4, 10, Duration::from_secs(8), "SMPR-4");
        assert_eq!(progress.avg_secs, 2.0);
        assert_eq!(progress.eta_secs, 12.0);
        assert_eq!(progress.fraction(), 0.4);
    }

    #[test]
    fn test_ticket_progress_done() {
        let progress = TicketProgress::new(3, 3, Duration::from_secs(3), "SMPR-3");
        assert_eq!(progress.eta_secs, 0.0);
        assert_eq!(progress.fraction(), 1.0);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers() {
        let tracker = ProgressTracker::new();
        tracker.emit(ProgressEvent::TrackerDisabled {
            reason: "test".to_string(),
        });

        let mut rx = tracker.subscribe();
        tracker.emit(ProgressEvent::Started {
            total: 1,
            provider: "mock / m".to_string(),
        });
        assert!(matches!(rx.recv().await.unwrap(), ProgressEvent::Started { total: 1, .. }));
    }
}
