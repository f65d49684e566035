use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{send_error, LlmResponse, TextGenerator};
use crate::error::{FailureKind, GenerationError};

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

// OpenAI-compatible chat completions format (Groq, OpenRouter, OpenAI)
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    cost: Option<f64>,
}

impl LlmClient {
    pub fn new(api_key: &str, base_url: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, GenerationError> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("LLM API", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| send_error("LLM API", e))?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_response(body: &str) -> Result<LlmResponse, GenerationError> {
    let api_response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::unavailable(
            FailureKind::Transport,
            format!("failed to parse LLM API response: {}", e),
        )
    })?;

    let text = api_response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .unwrap_or("")
        .to_string();

    let (input_tokens, output_tokens, cost) = api_response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens, u.cost.unwrap_or(0.0)))
        .unwrap_or((0, 0, 0.0));

    Ok(LlmResponse {
        text,
        input_tokens,
        output_tokens,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_prompt_as_single_user_message() {
        let client = LlmClient::new("key", "http://localhost", "llama3-8b-8192", 512);
        let json = serde_json::to_value(client.build_request("Write about agents")).unwrap();
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Write about agents");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_response_with_usage() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"An article."}}],
            "usage":{"prompt_tokens":12,"completion_tokens":3,"cost":0.0021}}"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.text, "An article.");
        assert_eq!(response.input_tokens, 12);
        assert_eq!(response.output_tokens, 3);
        assert!((response.cost - 0.0021).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_response_without_usage_or_content() {
        let response = parse_response(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(response.text, "");
        assert_eq!(response.input_tokens, 0);
    }

    #[test]
    fn test_parse_response_rejects_non_json() {
        assert!(matches!(
            parse_response("<html>"),
            Err(GenerationError::Unavailable { .. })
        ));
    }
}
