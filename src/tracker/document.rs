//! Rich-text document flattening
//!
//! Tracker descriptions arrive as a tree of nodes: text leaves
//! (`{"type": "text", "text": ...}`), containers with a `content` array,
//! and bare arrays. Flattening keeps document order and joins the
//! non-empty fragments with single spaces.
//!
//! Traversal uses an explicit stack so deeply nested documents cannot
//! exhaust the call stack.

use serde_json::Value;

/// Flatten a document (or any fragment of one) into plain text
pub fn extract_text(node: Option<&Value>) -> String {
    let Some(root) = node else {
        return String::new();
    };

    let mut fragments: Vec<&str> = Vec::new();
    let mut stack: Vec<&Value> = vec![root];

    while let Some(current) = stack.pop() {
        match current {
            Value::String(text) => push_fragment(&mut fragments, text),
            Value::Object(map) => {
                if map.get("type").and_then(Value::as_str) == Some("text")
                    && let Some(text) = map.get("text").and_then(Value::as_str)
                {
                    push_fragment(&mut fragments, text);
                }
                if let Some(Value::Array(children)) = map.get("content") {
                    stack.extend(children.iter().rev());
                }
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }

    fragments.join(" ")
}

fn push_fragment<'a>(fragments: &mut Vec<&'a str>, text: &'a str) {
    if !text.is_empty() {
        fragments.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn test_nested_containers() {
        let doc = json!({
            "content": [
                {"type": "text", "text": "A"},
                {"content": [{"type": "text", "text": "B"}]}
            ]
        });
        assert_eq!(extract_text(Some(&doc)), "A B");
    }

    #[test]
    fn test_absent_and_null() {
        assert_eq!(extract_text(None), "");
        assert_eq!(extract_text(Some(&Value::Null)), "");
    }

    #[test]
    fn test_plain_string_and_list() {
        assert_eq!(extract_text(Some(&json!("plain"))), "plain");
        assert_eq!(
            extract_text(Some(&json!([{"type": "text", "text": "x"}, "y"]))),
            "x y"
        );
    }

    #[test]
    fn test_skips_empty_fragments_and_non_text_nodes() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": ""},
                    {"type": "text", "text": "Conciliación"},
                    {"type": "hardBreak"},
                    {"type": "mention", "attrs": {"text": "@someone"}},
                    {"type": "text", "text": "MLB"}
                ]},
                {"type": "paragraph", "content": []},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "item"}]}
                    ]}
                ]}
            ]
        });
        assert_eq!(extract_text(Some(&doc)), "Conciliación MLB item");
    }

    #[test]
    fn test_deep_nesting() {
        let mut doc = json!({"type": "text", "text": "leaf"});
        for _ in 0..1_000 {
            let mut container = Map::new();
            container.insert("content".to_string(), Value::Array(vec![doc]));
            doc = Value::Object(container);
        }
        assert_eq!(extract_text(Some(&doc)), "leaf");
    }
}
