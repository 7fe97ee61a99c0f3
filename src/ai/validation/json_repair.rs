//! Model reply repair
//!
//! Handles the usual ways a chat model wraps or mangles a JSON object:
//! - Markdown code fence wrapping (```json ... ```)
//! - Trailing commas
//! - Object embedded in explanatory text

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{PorotoError, Result};

/// Parse a model reply into a JSON object
pub fn extract_object_from_reply(content: &str) -> Result<Map<String, Value>> {
    JsonRepairer::new().parse_object(content)
}

/// Reply cleanup and repair strategies
#[derive(Debug, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a JSON object, repairing the reply if the direct parse fails.
    /// Anything other than an object is malformed output.
    pub fn parse_object(&self, raw: &str) -> Result<Map<String, Value>> {
        let (value, was_repaired) = self.parse_or_repair(raw)?;
        if was_repaired {
            warn!("Model reply needed repair before parsing");
        }

        match value {
            Value::Object(map) => Ok(map),
            other => Err(PorotoError::MalformedOutput(format!(
                "Expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns (Value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = self.preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Initial JSON parse failed, attempting repair");

        let without_commas = self.fix_trailing_commas(&cleaned);
        if let Ok(value) = serde_json::from_str::<Value>(&without_commas) {
            return Ok((value, true));
        }

        if let Some(extracted) = self.extract_object_from_mixed(&without_commas)
            && let Ok(value) = serde_json::from_str::<Value>(&extracted)
        {
            return Ok((value, true));
        }

        Err(PorotoError::MalformedOutput(format!(
            "Reply is not valid JSON: {}",
            cleaned.chars().take(200).collect::<String>()
        )))
    }

    fn preprocess(&self, raw: &str) -> String {
        let trimmed = raw.trim().trim_start_matches('\u{feff}');
        self.strip_code_fences(trimmed).trim().to_string()
    }

    /// Drop an opening fence line and a closing fence
    fn strip_code_fences(&self, s: &str) -> String {
        let mut result = s;

        if result.starts_with("```") {
            result = match result.find('\n') {
                Some(first_newline) => &result[first_newline + 1..],
                None => result.trim_start_matches('`'),
            };
        }

        if let Some(stripped) = result.trim_end().strip_suffix("```") {
            result = stripped;
        }

        result.to_string()
    }

    /// Remove commas directly before `]` or `}` outside strings
    fn fix_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape = false;

        for (i, &ch) in chars.iter().enumerate() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                    if matches!(next, Some(']') | Some('}')) {
                        continue;
                    }
                }
                _ => {}
            }

            result.push(ch);
        }

        result
    }

    /// First balanced `{...}` in the text
    fn extract_object_from_mixed(&self, s: &str) -> Option<String> {
        let start = s.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }

        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let repairer = JsonRepairer::new();
        let (_, repaired) = repairer
            .parse_or_repair(r#"{"ANTIGUEDAD": "Nuevo"}"#)
            .unwrap();
        assert!(!repaired);
    }

    #[test]
    fn test_strip_code_fences() {
        let input = "```json\n{\"ANTIGUEDAD\": \"N/A\"}\n```";
        let map = extract_object_from_reply(input).unwrap();
        assert_eq!(map["ANTIGUEDAD"], "N/A");
    }

    #[test]
    fn test_strip_bare_fences() {
        let input = "```\n{\"ANTIGUEDAD\": \"Nuevo\"}```";
        let map = extract_object_from_reply(input).unwrap();
        assert_eq!(map["ANTIGUEDAD"], "Nuevo");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let repairer = JsonRepairer::new();
        let input = r#"{"ANTIGUEDAD": "Nuevo", "SCOPE": "Desarrollo",}"#;
        let (value, repaired) = repairer.parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["SCOPE"], "Desarrollo");
    }

    #[test]
    fn test_comma_inside_string_is_kept() {
        let input = r#"{"JUSTIFICACION": "MLA, MLB,}", "ANTIGUEDAD": "Nuevo",}"#;
        let map = extract_object_from_reply(input).unwrap();
        assert_eq!(map["JUSTIFICACION"], "MLA, MLB,}");
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = "Claro, aquí va:\n{\"ANTIGUEDAD\": \"Carry Over\"}\nSaludos";
        let map = extract_object_from_reply(input).unwrap();
        assert_eq!(map["ANTIGUEDAD"], "Carry Over");
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = extract_object_from_reply(r#"["Nuevo"]"#).unwrap_err();
        assert!(matches!(err, PorotoError::MalformedOutput(_)));

        let err = extract_object_from_reply("no json here").unwrap_err();
        assert!(matches!(err, PorotoError::MalformedOutput(_)));
    }
}
