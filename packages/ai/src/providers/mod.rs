//! LLM provider abstraction and implementations.
//!
//! Supports Google Gemini, Anthropic Claude, and `OpenAI` via a common trait.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::AiError;

/// Maximum number of tokens requested for a single completion.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single-turn prompt and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider answers
    /// with an error.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, AiError>;

    /// Short provider name for log lines.
    fn name(&self) -> &'static str;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `GEMINI_API_KEY` set -> Google Gemini
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 3. `OPENAI_API_KEY` set -> `OpenAI`
///
/// `AI_MODEL` overrides the provider's default model.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());
    let model = std::env::var("AI_MODEL").ok();

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = require_env("GEMINI_API_KEY")?;
            let model = model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
            Ok(Box::new(gemini::GeminiProvider::new(api_key, model)))
        }
        "anthropic" | "claude" => {
            let api_key = require_env("ANTHROPIC_API_KEY")?;
            let model = model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let api_key = require_env("OPENAI_API_KEY")?;
            let model = model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
            Ok(Box::new(openai::OpenAiProvider::new(api_key, model)))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini', 'anthropic', or 'openai'."),
        }),
    }
}

fn require_env(name: &str) -> Result<String, AiError> {
    std::env::var(name).map_err(|_| AiError::Config {
        message: format!("{name} environment variable not set"),
    })
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider_from_env`].
fn detect_provider() -> String {
    if std::env::var("GEMINI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini".to_string();
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: GEMINI_API_KEY, \
         ANTHROPIC_API_KEY, or OPENAI_API_KEY. You can also set AI_PROVIDER explicitly."
    );

    // Fall back to gemini; produces a clear error about the missing key
    "gemini".to_string()
}

/// Builds a provider error from a non-success response body, preferring the
/// provider's own `error.message` field when it has one.
pub(crate) fn error_from_body(status: reqwest::StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));

    AiError::Provider { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_extracted() {
        let err = error_from_body(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 400, "message": "API key not valid"}}"#,
        );
        assert!(
            matches!(err, AiError::Provider { ref message } if message == "API key not valid")
        );
    }

    #[test]
    fn unstructured_error_body_keeps_status() {
        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(
            matches!(err, AiError::Provider { ref message } if message.contains("502") && message.contains("upstream down"))
        );
    }
}
