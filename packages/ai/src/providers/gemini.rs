//! Google Gemini provider implementation.
//!
//! Talks to the Generative Language API `generateContent` endpoint with an
//! API key passed as a query parameter.

use serde::{Deserialize, Serialize};

use super::{LlmProvider, MAX_OUTPUT_TOKENS, error_from_body};
use crate::AiError;

/// Model used when `AI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
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
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, AiError> {
    let response: GeminiResponse = serde_json::from_str(body)?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No candidates in Gemini response".to_string(),
        })?;

    Ok(candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, AiError> {
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system_prompt,
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let resp = self
            .client
            .post(format!("{BASE_URL}/{}:generateContent", self.model))
            .query(&[("key", &self.api_key)])
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
        "gemini"
    }
}
