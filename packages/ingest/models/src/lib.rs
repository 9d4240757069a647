#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV ingestion configuration and result types.

use serde::{Deserialize, Serialize};
use vigil_aadhaar_audit_models::DistrictRecord;

/// Default first-field literal marking injected noise rows.
pub const DEFAULT_NOISE_SENTINEL: &str = "NOISE";

/// Default first-field literal marking a repeated header row.
pub const DEFAULT_HEADER_SENTINEL: &str = "region";

/// Number of positional columns every accepted row must carry.
pub const REQUIRED_FIELDS: usize = 5;

/// Configuration for parsing an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    /// Rows whose first field equals this value are dropped as noise.
    pub noise_sentinel: String,
    /// Rows whose first field equals this value are dropped as a repeated
    /// header.
    pub header_sentinel: String,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            noise_sentinel: DEFAULT_NOISE_SENTINEL.to_string(),
            header_sentinel: DEFAULT_HEADER_SENTINEL.to_string(),
            delimiter: b',',
        }
    }
}

impl IngestConfig {
    /// Builds a config from the environment.
    ///
    /// `VIGIL_NOISE_SENTINEL` and `VIGIL_HEADER_SENTINEL` override the
    /// defaults; the delimiter is always a comma.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            noise_sentinel: std::env::var("VIGIL_NOISE_SENTINEL")
                .unwrap_or(defaults.noise_sentinel),
            header_sentinel: std::env::var("VIGIL_HEADER_SENTINEL")
                .unwrap_or(defaults.header_sentinel),
            delimiter: defaults.delimiter,
        }
    }
}

/// Why a row was left out of an ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than [`REQUIRED_FIELDS`] fields.
    TooFewFields,
    /// First field matched the noise sentinel.
    Noise,
    /// First field matched the header sentinel.
    RepeatedHeader,
    /// Region or district name was blank.
    MissingName,
    /// The row could not be decoded (e.g. invalid UTF-8).
    Malformed,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Accepted records in file order.
    pub records: Vec<DistrictRecord>,
    /// Number of data rows that were skipped.
    pub skipped_rows: usize,
}
