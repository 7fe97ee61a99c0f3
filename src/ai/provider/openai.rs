//! OpenAI-compatible Chat Completions dialect
//!
//! Shared by OpenAI and Groq: `messages` with system/user roles,
//! JSON-object response format, bounded `max_tokens`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::GenerationParams;

pub(super) fn endpoint(api_base: &str) -> String {
    format!("{}/chat/completions", api_base)
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
    let body = ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_message.to_string(),
            },
        ],
        temperature: params.temperature,
        max_tokens: Some(params.max_tokens),
        response_format: Some(ResponseFormat {
            format_type: "json_object".to_string(),
        }),
    };

    client
        .post(endpoint(api_base))
        .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
        .header("Content-Type", "application/json")
        .json(&body)
}

/// Pull the single completion text out of the response envelope
pub(super) fn extract_text(body: &str) -> Result<String, String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse chat completion response: {}", e))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| "No content in chat completion response".to_string())
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
