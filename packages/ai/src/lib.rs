#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generative-AI strategy summaries for the audit dashboard.
//!
//! Supports Google Gemini, Anthropic Claude and `OpenAI` through a common
//! [`providers::LlmProvider`] trait. The [`insight`] module turns the
//! highest-risk filtered records into a prompt and always hands back
//! displayable text: provider failures degrade to a fixed advisory instead
//! of surfacing as errors.

pub mod insight;
pub mod providers;

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
