#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the remote fraud-risk inference server.
//!
//! The model runs outside this toolchain. This crate uploads the raw dataset
//! as multipart form data and decodes whatever `{ data?, logs? }` document
//! the server answers with. Retrying is left to the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_aadhaar_audit_models::DistrictRecord;

/// Default base URL of the local inference server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Path of the analysis endpoint, relative to the base URL.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Path of the connectivity probe, relative to the base URL.
pub const TEST_PATH: &str = "/api/test";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Maximum length of a response body kept in an error.
const BODY_PREVIEW_LEN: usize = 500;

/// Errors that can occur while talking to the inference server.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Response of the analysis endpoint.
///
/// Both fields are optional; a server may report logs without data or the
/// other way round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Scored district records, replacing the current store when present.
    #[serde(default)]
    pub data: Option<Vec<DistrictRecord>>,
    /// Progress or diagnostic lines emitted by the model pipeline.
    #[serde(default)]
    pub logs: Option<Vec<String>>,
}

/// Response of the connectivity probe.
#[derive(Debug, Clone, Deserialize)]
struct ProbeResponse {
    message: String,
}

/// Connection settings for the inference server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl InferenceConfig {
    /// Reads `INFERENCE_URL` and `INFERENCE_TIMEOUT_SECS`, falling back to
    /// the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("INFERENCE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("INFERENCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(
                Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                Duration::from_secs,
            );

        Self { base_url, timeout }
    }
}

/// HTTP client for the inference server.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    config: InferenceConfig,
    client: reqwest::Client,
}

impl InferenceClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Config`] if the HTTP client cannot be built.
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    /// Creates a client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Config`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, InferenceError> {
        Self::new(InferenceConfig::from_env())
    }

    /// The analysis endpoint URL.
    #[must_use]
    pub fn analyze_url(&self) -> String {
        format!("{}{ANALYZE_PATH}", self.config.base_url)
    }

    /// Uploads a raw dataset file and returns the server's analysis.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Http`] on connection failure or timeout,
    /// [`InferenceError::Status`] on a non-success status, and
    /// [`InferenceError::Json`] if the body is not an analysis document.
    pub async fn analyze(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<InferenceResponse, InferenceError> {
        let url = self.analyze_url();
        log::info!(
            "Uploading {file_name} ({} bytes) to {url}",
            bytes.len()
        );

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        let body = read_success_body(resp).await?;
        let response = parse_response(&body)?;

        log::info!(
            "Inference finished: {} records, {} log lines",
            response.data.as_ref().map_or(0, Vec::len),
            response.logs.as_ref().map_or(0, Vec::len),
        );

        Ok(response)
    }

    /// Probes the server's test route and returns its greeting.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::analyze`].
    pub async fn check_connection(&self) -> Result<String, InferenceError> {
        let url = format!("{}{TEST_PATH}", self.config.base_url);
        log::debug!("Probing inference server at {url}");

        let resp = self.client.get(&url).send().await?;
        let body = read_success_body(resp).await?;
        let probe: ProbeResponse = serde_json::from_str(&body)?;

        Ok(probe.message)
    }
}

/// Reads a response body, turning non-success statuses into errors.
async fn read_success_body(resp: reqwest::Response) -> Result<String, InferenceError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        log::warn!("Inference server returned HTTP {status}");
        return Err(InferenceError::Status {
            status: status.as_u16(),
            body: preview(&body),
        });
    }

    Ok(body)
}

/// Decodes an analysis document.
///
/// # Errors
///
/// Returns [`InferenceError::Json`] if `body` is not a JSON object of the
/// expected shape.
pub fn parse_response(body: &str) -> Result<InferenceResponse, InferenceError> {
    Ok(serde_json::from_str(body)?)
}

fn preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LEN {
        return body.to_string();
    }

    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
