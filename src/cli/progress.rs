//! Console progress renderer
//!
//! Subscribes to the pipeline's broadcast channel and redraws a single
//! status line per ticket.

use std::time::Duration;

use console::style;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::pipeline::{ProgressEvent, ProgressTracker, TicketProgress};

pub struct ConsoleRenderer {
    receiver: broadcast::Receiver<ProgressEvent>,
    show_bar: bool,
}

impl ConsoleRenderer {
    pub fn new(tracker: &ProgressTracker) -> Self {
        Self {
            receiver: tracker.subscribe(),
            show_bar: true,
        }
    }

    pub fn with_bar(mut self, show: bool) -> Self {
        self.show_bar = show;
        self
    }

    /// Render until the batch finishes or the tracker is dropped
    pub fn spawn(mut self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.receiver.recv().await {
                    Ok(ProgressEvent::Finished { .. }) => break,
                    Ok(event) => self.handle(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Progress renderer skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            if self.show_bar {
                println!();
            }
        })
    }

    fn handle(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total, provider } => {
                if self.show_bar {
                    println!(
                        "Clasificando {} tickets con {}",
                        style(total).bold(),
                        style(provider).cyan()
                    );
                }
            }
            ProgressEvent::TrackerDisabled { reason } => {
                if self.show_bar {
                    println!(
                        "\r\x1B[K{} Jira deshabilitado: {}",
                        style("⚠").yellow(),
                        reason
                    );
                }
            }
            ProgressEvent::TicketDone(progress) => {
                if self.show_bar {
                    print!("\r\x1B[K{}", render_line(&progress));
                }
            }
            ProgressEvent::Snapshot { results } => {
                let errors = results.iter().filter(|r| r.result.is_error()).count();
                debug!(rows = results.len(), errors, "Partial results");
            }
            ProgressEvent::Finished { .. } => {}
        }
    }
}

/// `[████░░] 3/10 SMPR-12 · 2.1s/ticket · ETA 15s`
pub fn render_line(progress: &TicketProgress) -> String {
    format!(
        "{} {}/{} {} · {:.1}s/ticket · ETA {}",
        render_progress_bar(progress.fraction(), 30),
        progress.done,
        progress.total,
        progress.last_key,
        progress.avg_secs,
        format_duration(Duration::from_secs_f64(progress.eta_secs.max(0.0)))
    )
}

/// Render a simple progress bar
fn render_progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
