//! Ticket ("poroto") types
//!
//! A `TicketRef` is what the input table yields; a `Ticket` is what the
//! classifier consumes once enrichment (if any) is done.

use serde::{Deserialize, Serialize};

use super::TicketKey;
use crate::constants::limits::MAX_DESCRIPTION_CHARS;

/// Key plus the best-effort title guess scraped from the input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRef {
    pub key: TicketKey,
    /// Empty when no cell looked like a title
    pub title: String,
}

impl TicketRef {
    pub fn new(key: impl Into<TicketKey>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// Issue metadata returned by the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub key: String,
    pub title: String,
    /// Plain text, at most `MAX_DESCRIPTION_CHARS` characters
    pub description: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub status: String,
    pub issue_type: String,
}

/// Ticket as handed to the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: TicketKey,
    title: String,
    description: String,
    labels: Vec<String>,
    components: Vec<String>,
}

impl Ticket {
    /// Ticket built from the input table alone
    pub fn from_ref(reference: &TicketRef) -> Self {
        Self {
            key: reference.key.clone(),
            title: reference.title.trim().to_string(),
            description: String::new(),
            labels: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Ticket built from tracker data, keeping the scraped title when the
    /// tracker has none
    pub fn enriched(reference: &TicketRef, details: IssueDetails) -> Self {
        let title = if details.title.trim().is_empty() {
            reference.title.trim().to_string()
        } else {
            details.title.trim().to_string()
        };

        Self {
            key: reference.key.clone(),
            title,
            description: truncate_chars(&details.description, MAX_DESCRIPTION_CHARS),
            labels: details.labels,
            components: details.components,
        }
    }

    pub fn key(&self) -> &TicketKey {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("conciliación", 11), "conciliació");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_enriched_prefers_tracker_title() {
        let reference = TicketRef::new("SMPR-1", "Scraped title here");
        let details = IssueDetails {
            key: "SMPR-1".into(),
            title: "Tracker title".into(),
            description: "x".repeat(MAX_DESCRIPTION_CHARS + 10),
            labels: vec!["tmo".into()],
            ..Default::default()
        };

        let ticket = Ticket::enriched(&reference, details);
        assert_eq!(ticket.title(), "Tracker title");
        assert_eq!(ticket.description().chars().count(), MAX_DESCRIPTION_CHARS);
        assert_eq!(ticket.labels(), ["tmo".to_string()]);
    }

    #[test]
    fn test_enriched_falls_back_to_scraped_title() {
        let reference = TicketRef::new("SMPR-2", "Scraped title here");
        let ticket = Ticket::enriched(&reference, IssueDetails::default());
        assert_eq!(ticket.title(), "Scraped title here");
    }

    #[test]
    fn test_from_ref_without_title() {
        let ticket = Ticket::from_ref(&TicketRef::new("SMPR-3", "  "));
        assert!(!ticket.has_title());
        assert!(ticket.description().is_empty());
    }
}
