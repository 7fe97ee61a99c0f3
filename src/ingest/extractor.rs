//! Ticket Key Extraction
//!
//! Best-effort scrape of `(key, title)` pairs out of whatever table the
//! user exported. Rows without a recognizable key are dropped silently.
//!
//! ## Strategy
//!
//! 1. Sniff the delimiter: first of `;`, `,`, `\t` present in the head of
//!    the content (list order breaks ties, `;` when none is present)
//! 2. Treat row 0 as a header unless one of its cells contains `PREFIX-`
//! 3. Per row: first cell matching `PREFIX-<digits>` is the key
//! 4. Title: first other cell that is non-empty, not a URL, does not
//!    mention the prefix and is longer than five characters

use regex::Regex;
use tracing::debug;

use crate::constants::limits::{DELIMITER_SNIFF_CHARS, MIN_TITLE_CHARS};
use crate::types::{PorotoError, Result, TicketRef};

const CANDIDATE_DELIMITERS: [u8; 3] = [b';', b',', b'\t'];
const UTF8_BOM: char = '\u{feff}';

/// Pick the delimiter for `content`
pub fn detect_delimiter(content: &str) -> u8 {
    let head: String = content.chars().take(DELIMITER_SNIFF_CHARS).collect();
    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .find(|d| head.contains(char::from(*d)))
        .unwrap_or(b';')
}

/// Extracts ticket keys and title guesses from tabular rows
#[derive(Debug, Clone)]
pub struct KeyExtractor {
    prefix: String,
    marker: String,
    pattern: Regex,
}

impl KeyExtractor {
    pub fn new(prefix: &str) -> Result<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(PorotoError::Config("Ticket prefix must not be empty".to_string()));
        }

        let pattern = Regex::new(&format!(r"{}-\d+", regex::escape(prefix)))
            .map_err(|e| PorotoError::Config(format!("Invalid ticket prefix '{}': {}", prefix, e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            marker: format!("{}-", prefix),
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse raw delimited content and extract ticket refs
    pub fn extract_from_str(&self, content: &str) -> Result<Vec<TicketRef>> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let delimiter = detect_delimiter(content);
        debug!(delimiter = %char::from(delimiter).escape_default(), "Detected input delimiter");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(self.extract_rows(&rows))
    }

    /// Extract ticket refs from already-split rows, preserving order and duplicates
    pub fn extract_rows<R: AsRef<[String]>>(&self, rows: &[R]) -> Vec<TicketRef> {
        let Some(first) = rows.first() else {
            return Vec::new();
        };

        let start = if self.has_header(first.as_ref()) { 1 } else { 0 };

        let refs: Vec<TicketRef> = rows[start..]
            .iter()
            .filter_map(|row| self.extract_row(row.as_ref()))
            .collect();

        debug!(rows = rows.len(), tickets = refs.len(), "Extracted ticket keys");
        refs
    }

    fn has_header(&self, first_row: &[String]) -> bool {
        !first_row.iter().any(|cell| cell.contains(&self.marker))
    }

    fn extract_row(&self, row: &[String]) -> Option<TicketRef> {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return None;
        }

        let (key_idx, key) = row
            .iter()
            .enumerate()
            .find_map(|(idx, cell)| self.pattern.find(cell.trim()).map(|m| (idx, m.as_str())))?;

        let title = row
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != key_idx)
            .map(|(_, cell)| cell.trim())
            .find(|value| self.looks_like_title(value))
            .unwrap_or_default();

        Some(TicketRef::new(key, title))
    }

    fn looks_like_title(&self, value: &str) -> bool {
        !value.is_empty()
            && !value.starts_with("http")
            && !value.contains(&self.marker)
            && value.chars().count() > MIN_TITLE_CHARS
    }
}
