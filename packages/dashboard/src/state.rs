//! The dashboard state value and its derived views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_aadhaar_analytics::{available_regions, filter_and_aggregate, summarize_by_region};
use vigil_aadhaar_audit_models::{AggregateView, DistrictRecord, FilterParams, RegionSummary};
use vigil_aadhaar_ingest::mock::mock_records;

/// Maximum number of activity log lines kept; older lines are dropped.
pub const MAX_LOG_ENTRIES: usize = 200;

/// Where the current record store came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataSource {
    /// Built-in demonstration data.
    Mock,
    /// A CSV file parsed locally.
    Csv {
        /// Uploaded file name.
        file_name: String,
    },
    /// Results returned by the inference server.
    Remote {
        /// File that was sent for analysis.
        file_name: String,
    },
}

/// Progress of an upload to the inference server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadStatus {
    /// Nothing sent yet.
    Idle,
    /// Waiting for the server's answer.
    Uploading,
    /// The server answered successfully.
    Complete,
    /// The upload failed; the store is unchanged.
    Failed,
}

/// Progress of the AI strategy summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "camelCase")]
pub enum InsightState {
    /// No summary for the current view.
    Idle,
    /// A request is in flight.
    Generating,
    /// Text to display verbatim.
    Ready(String),
}

/// A timestamped line in the dashboard's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the line was recorded.
    pub timestamp: DateTime<Utc>,
    /// Log text.
    pub message: String,
}

impl LogEntry {
    /// Creates a log entry.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Complete state of the dashboard.
///
/// Values are never mutated in place by consumers; every change goes through
/// [`crate::reduce`], which returns a new value. The record store is always
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// The record store.
    pub records: Vec<DistrictRecord>,
    /// Origin of `records`.
    pub source: DataSource,
    /// Active table filter.
    pub filter: FilterParams,
    /// Region currently highlighted on the map.
    pub hovered_region: Option<String>,
    /// AI strategy summary for the current view.
    pub insight: InsightState,
    /// Inference upload progress.
    pub upload: UploadStatus,
    /// Activity log, oldest first, at most [`MAX_LOG_ENTRIES`] lines.
    pub logs: Vec<LogEntry>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::with_records(mock_records(), DataSource::Mock)
    }
}

impl DashboardState {
    /// Creates a fresh state around the given store with default filters.
    #[must_use]
    pub fn with_records(records: Vec<DistrictRecord>, source: DataSource) -> Self {
        Self {
            records,
            source,
            filter: FilterParams::default(),
            hovered_region: None,
            insight: InsightState::Idle,
            upload: UploadStatus::Idle,
            logs: Vec::new(),
        }
    }

    /// The filtered, ranked table with its rollups.
    #[must_use]
    pub fn view(&self, subsidy_per_child: f64) -> AggregateView {
        filter_and_aggregate(&self.records, &self.filter, subsidy_per_child)
    }

    /// Per-region rollup of the whole store, independent of the filter.
    #[must_use]
    pub fn region_summaries(&self) -> BTreeMap<String, RegionSummary> {
        summarize_by_region(&self.records)
    }

    /// Region names for the region selector.
    #[must_use]
    pub fn regions(&self) -> Vec<String> {
        available_regions(&self.records)
    }

    /// Summary of the hovered region, if it is still present in the store.
    #[must_use]
    pub fn hovered_summary(&self) -> Option<(String, RegionSummary)> {
        let region = self.hovered_region.as_ref()?;
        self.region_summaries()
            .remove(region)
            .map(|summary| (region.clone(), summary))
    }
}
