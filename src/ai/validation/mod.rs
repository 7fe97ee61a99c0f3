//! Model reply validation
//!
//! Turns the raw text payload of a completion call into a JSON object
//! carrying the classification fields.
//!
//! - Markdown fences and surrounding chatter are tolerated
//! - The classification key `ANTIGUEDAD` must be present; anything else
//!   is `MalformedOutput` and the classifier retries it

mod json_repair;

pub use json_repair::{JsonRepairer, extract_object_from_reply};

use serde_json::{Map, Value};

use crate::types::{PorotoError, Result};

/// Key whose absence makes a reply unusable
pub const REQUIRED_FIELD: &str = "ANTIGUEDAD";

/// Parse the reply and check the required key
pub fn parse_classification_reply(raw: &str) -> Result<Map<String, Value>> {
    let object = extract_object_from_reply(raw)?;

    if !object.contains_key(REQUIRED_FIELD) {
        return Err(PorotoError::MalformedOutput(format!(
            "Missing {}",
            REQUIRED_FIELD
        )));
    }

    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_with_required_field() {
        let object = parse_classification_reply(
            r#"{"ANTIGUEDAD":"Nuevo","SCOPE":"Desarrollo"}"#,
        )
        .unwrap();
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_reply_missing_required_field() {
        let err = parse_classification_reply(r#"{"SCOPE":"Desarrollo"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Malformed model output: Missing ANTIGUEDAD");
    }
}
