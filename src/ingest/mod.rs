//! Input table ingestion

pub mod extractor;

pub use extractor::{KeyExtractor, detect_delimiter};

use std::path::Path;

use crate::types::{Result, TicketRef};

/// Read an input table from disk and extract its ticket refs
pub fn read_ticket_refs(path: &Path, extractor: &KeyExtractor) -> Result<Vec<TicketRef>> {
    let content = std::fs::read_to_string(path)?;
    extractor.extract_from_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_ticket_refs_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("porotos.csv");
        std::fs::write(
            &path,
            "clave\tresumen\nSMPR-1001\t[Carry Over] Banorte dictamen tecnico\nSMPR-1002\t\n",
        )
        .unwrap();

        let extractor = KeyExtractor::new("SMPR").unwrap();
        let refs = read_ticket_refs(&path, &extractor).unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].key.as_str(), "SMPR-1001");
        assert_eq!(refs[0].title, "[Carry Over] Banorte dictamen tecnico");
        assert!(refs[1].title.is_empty());
    }

    #[test]
    fn test_read_ticket_refs_missing_file() {
        let extractor = KeyExtractor::new("SMPR").unwrap();
        let err = read_ticket_refs(Path::new("/nonexistent/porotos.csv"), &extractor).unwrap_err();
        assert!(matches!(err, crate::types::PorotoError::Io(_)));
    }
}
