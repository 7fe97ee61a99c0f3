//! Gemini generateContent dialect
//!
//! Separate `system_instruction` and `contents`, JSON MIME type requested,
//! API key passed as a query parameter.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::GenerationParams;

pub(super) fn endpoint(api_base: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", api_base, model)
}

pub(super) fn build_request(
    client: &reqwest::Client,
    api_base: &str,
    model: &str,
    api_key: &SecretString,
    system_prompt: &str,
    user_message: &str,
    params: &GenerationParams,
) -> reqwest::RequestBuilder {
    let body = GenerateContentRequest {
        system_instruction: Content::text(system_prompt),
        contents: vec![Content::text(user_message)],
        generation_config: GenerationConfig {
            temperature: params.temperature,
            response_mime_type: "application/json".to_string(),
        },
    };

    client
        .post(endpoint(api_base, model))
        .query(&[("key", api_key.expose_secret())])
        .json(&body)
}

/// Pull the first candidate's first text part out of the response envelope
pub(super) fn extract_text(body: &str) -> Result<String, String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse generateContent response: {}", e))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| "No text in generateContent response".to_string())
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"ANTIGUEDAD\":\"N/A\"}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"ANTIGUEDAD":"N/A"}"#);
    }

    #[test]
    fn test_extract_text_blocked_candidate() {
        assert!(extract_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).is_err());
        assert!(extract_text(r#"{}"#).is_err());
    }

    #[test]
    fn test_request_shape() {
        let client = reqwest::Client::new();
        let request = build_request(
            &client,
            "https://gemini.example.com/v1beta",
            "gemini-2.0-flash",
            &SecretString::from("k".to_string()),
            "sys",
            "user",
            &GenerationParams {
                temperature: 0.1,
                max_tokens: 300,
            },
        )
        .build()
        .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://gemini.example.com/v1beta/models/gemini-2.0-flash:generateContent?key=k"
        );

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "user");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }
}
