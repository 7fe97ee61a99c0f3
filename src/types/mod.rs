pub mod classification;
pub mod error;
pub mod ticket;

pub use classification::{ClassificationResult, OUTPUT_FIELDS};
pub use error::{ErrorCategory, ErrorClassifier, LlmError, PorotoError, Result};
pub use ticket::{IssueDetails, Ticket, TicketRef, truncate_chars};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type-safe wrapper for tracker keys (`SMPR-1234`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

impl TicketKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TicketKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TicketKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TicketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod newtype_tests {
    use super::*;

    #[test]
    fn test_ticket_key() {
        let key = TicketKey::new("SMPR-123");
        assert_eq!(key.as_str(), "SMPR-123");
        assert_eq!(format!("{}", key), "SMPR-123");
        assert_eq!(TicketKey::from("SMPR-123"), key);
    }
}
