//! `OpenAI` GPT provider implementation.

use serde::{Deserialize, Serialize};

use super::{LlmProvider, MAX_OUTPUT_TOKENS, error_from_body};
use crate::AiError;

/// Model used when `AI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

/// Returns the content of the first choice.
fn extract_text(body: &str) -> Result<String, AiError> {
    let response: OpenAiResponse = serde_json::from_str(body)?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No choices in OpenAI response".to_string(),
        })?;

    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, AiError> {
        let request = OpenAiRequest {
            model: &self.model,
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: system_prompt,
                },
                OpenAiMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        extract_text(&body)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_choice() {
        let text = extract_text(
            r#"{"choices": [
                {"message": {"role": "assistant", "content": "Freeze payouts in Gaya."}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(text, "Freeze payouts in Gaya.");
    }

    #[test]
    fn empty_choices_is_provider_error() {
        let err = extract_text(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, AiError::Provider { .. }));
    }
}
