//! Dashboard events and the reducer that applies them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_aadhaar_audit_models::{DistrictRecord, RegionFilter};
use vigil_aadhaar_ingest::mock::mock_records;

use crate::state::{
    DashboardState, DataSource, InsightState, LogEntry, MAX_LOG_ENTRIES, UploadStatus,
};

/// Everything that can happen to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardEvent {
    // ── Filters ───────────────────────────────────────
    /// Search box text changed.
    SearchChanged {
        /// New search text.
        search: String,
    },
    /// A region was picked in the selector.
    RegionSelected {
        /// New region filter.
        region: RegionFilter,
    },
    /// Risk threshold slider moved.
    ThresholdChanged {
        /// New threshold; clamped into `[0, 1]`.
        threshold: f64,
    },
    /// The pointer entered or left a region on the map.
    RegionHovered {
        /// Hovered region, `None` when the pointer left.
        region: Option<String>,
    },

    // ── Local CSV upload ─────────────────────────────
    /// A CSV file was parsed with at least one valid row.
    CsvLoaded {
        /// Uploaded file name.
        file_name: String,
        /// Parsed records.
        records: Vec<DistrictRecord>,
        /// Rows rejected during parsing.
        skipped_rows: usize,
    },
    /// A CSV file could not be used.
    CsvRejected {
        /// Uploaded file name.
        file_name: String,
        /// Why it was rejected.
        reason: String,
    },

    // ── Remote inference ─────────────────────────────
    /// A file was sent to the inference server.
    UploadStarted {
        /// File being analysed.
        file_name: String,
    },
    /// The inference server answered.
    InferenceCompleted {
        /// File that was analysed.
        file_name: String,
        /// Scored records, if the server sent any.
        data: Option<Vec<DistrictRecord>>,
        /// Server log lines.
        logs: Vec<String>,
    },
    /// The inference server could not be reached or refused the upload.
    InferenceFailed {
        /// Error description.
        message: String,
    },

    // ── AI insight ───────────────────────────────────
    /// A strategy summary was requested.
    InsightRequested,
    /// A strategy summary (or the fallback advisory) arrived.
    InsightReady {
        /// Text to display verbatim.
        text: String,
    },

    /// Restore the built-in dataset.
    ResetToMock,
}

/// Applies `event` to `state` and returns the next state.
///
/// `now` stamps any log lines the event produces, keeping the reducer free
/// of ambient inputs.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn reduce(state: &DashboardState, event: DashboardEvent, now: DateTime<Utc>) -> DashboardState {
    let mut next = state.clone();

    match event {
        DashboardEvent::SearchChanged { search } => {
            if next.filter.search != search {
                next.filter.search = search;
                next.insight = InsightState::Idle;
            }
        }
        DashboardEvent::RegionSelected { region } => {
            if next.filter.region != region {
                next.filter.region = region;
                next.insight = InsightState::Idle;
            }
        }
        DashboardEvent::ThresholdChanged { threshold } => {
            let threshold = threshold.clamp(0.0, 1.0);
            if threshold.is_nan() {
                log::warn!("Ignoring NaN risk threshold");
            } else if (next.filter.threshold - threshold).abs() > f64::EPSILON {
                next.filter.threshold = threshold;
                next.insight = InsightState::Idle;
            }
        }
        DashboardEvent::RegionHovered { region } => {
            next.hovered_region = region;
        }
        DashboardEvent::CsvLoaded {
            file_name,
            records,
            skipped_rows,
        } => {
            if records.is_empty() {
                // Ingestion guarantees at least one row; never blank the store.
                next.logs.push(LogEntry::new(
                    now,
                    format!("{file_name}: no valid rows, keeping current dataset"),
                ));
            } else {
                next.logs.push(LogEntry::new(
                    now,
                    format!(
                        "Loaded {} records from {file_name} ({skipped_rows} rows skipped)",
                        records.len()
                    ),
                ));
                replace_store(&mut next, records, DataSource::Csv { file_name });
            }
        }
        DashboardEvent::CsvRejected { file_name, reason } => {
            next.logs.push(LogEntry::new(
                now,
                format!("Rejected {file_name}: {reason}"),
            ));
        }
        DashboardEvent::UploadStarted { file_name } => {
            next.upload = UploadStatus::Uploading;
            next.logs = vec![LogEntry::new(
                now,
                format!("Uploading {file_name} to inference server..."),
            )];
        }
        DashboardEvent::InferenceCompleted {
            file_name,
            data,
            logs,
        } => {
            next.logs
                .extend(logs.into_iter().map(|line| LogEntry::new(now, line)));
            match data {
                Some(records) if !records.is_empty() => {
                    next.logs.push(LogEntry::new(
                        now,
                        format!("Analysis complete: {} districts scored", records.len()),
                    ));
                    replace_store(&mut next, records, DataSource::Remote { file_name });
                }
                _ => {
                    next.logs.push(LogEntry::new(
                        now,
                        "Analysis complete: no data returned, keeping current dataset",
                    ));
                }
            }
            next.upload = UploadStatus::Complete;
        }
        DashboardEvent::InferenceFailed { message } => {
            next.logs.push(LogEntry::new(
                now,
                format!("Connection failed: {message}"),
            ));
            next.upload = UploadStatus::Failed;
        }
        DashboardEvent::InsightRequested => {
            next.insight = InsightState::Generating;
        }
        DashboardEvent::InsightReady { text } => {
            // A filter or store change while generating makes the reply stale.
            if next.insight == InsightState::Generating {
                next.insight = InsightState::Ready(text);
            } else {
                log::debug!("Dropping insight for a view that has since changed");
            }
        }
        DashboardEvent::ResetToMock => {
            next.logs.push(LogEntry::new(now, "Restored demonstration dataset"));
            replace_store(&mut next, mock_records(), DataSource::Mock);
            next.upload = UploadStatus::Idle;
        }
    }

    if next.logs.len() > MAX_LOG_ENTRIES {
        let excess = next.logs.len() - MAX_LOG_ENTRIES;
        next.logs.drain(..excess);
    }

    next
}

/// Swaps in a new record store.
///
/// A selected region or hover that no longer exists is dropped, and any
/// insight about the old data is discarded.
fn replace_store(state: &mut DashboardState, records: Vec<DistrictRecord>, source: DataSource) {
    let has_region = |name: &str| records.iter().any(|r| r.region == name);

    if let RegionFilter::Region(name) = &state.filter.region
        && !has_region(name)
    {
        state.filter.region = RegionFilter::All;
    }
    if let Some(name) = &state.hovered_region
        && !has_region(name)
    {
        state.hovered_region = None;
    }

    state.records = records;
    state.source = source;
    state.insight = InsightState::Idle;
}
