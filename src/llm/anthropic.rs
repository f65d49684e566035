use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{send_error, LlmResponse, TextGenerator};
use crate::error::{FailureKind, GenerationError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: &str, url: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            url: url.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, GenerationError> {
        let request = ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("Anthropic API", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| send_error("Anthropic API", e))?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_response(body: &str) -> Result<LlmResponse, GenerationError> {
    let api_response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::unavailable(
            FailureKind::Transport,
            format!("failed to parse Anthropic API response: {}", e),
        )
    })?;

    let text = api_response
        .content
        .iter()
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    Ok(LlmResponse {
        text,
        input_tokens: api_response.usage.input_tokens,
        output_tokens: api_response.usage.output_tokens,
        cost: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"Part one. "},{"type":"tool_use"},{"type":"text","text":"Part two."}],
            "usage":{"input_tokens":40,"output_tokens":9}}"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.text, "Part one. Part two.");
        assert_eq!(response.input_tokens, 40);
        assert_eq!(response.output_tokens, 9);
    }

    #[test]
    fn test_parse_missing_usage_is_error() {
        assert!(parse_response(r#"{"content":[]}"#).is_err());
    }
}
