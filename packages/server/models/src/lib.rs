#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the audit dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the dashboard state so the API contract can carry derived fields
//! (severity labels, record counts) without storing them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use vigil_aadhaar_audit_models::{
    AggregateView, DistrictRecord, FilterParams, RegionFilter, RegionSummary, Severity,
};
use vigil_aadhaar_dashboard::{DashboardState, DataSource, InsightState, LogEntry, UploadStatus};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Plain message response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Message text.
    pub message: String,
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error description.
    pub error: String,
}

/// A district record with its record-level severity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecord {
    /// Region (state) name.
    pub region: String,
    /// District name.
    pub district: String,
    /// Fraud probability in `[0, 1]`.
    pub risk_score: f64,
    /// Number of flagged enrolments.
    pub flagged_count: u64,
    /// Number of suspicious locations.
    pub suspicious_locations: u64,
    /// Label from the record severity ladder.
    pub severity: Severity,
}

impl From<DistrictRecord> for ApiRecord {
    fn from(record: DistrictRecord) -> Self {
        let severity = record.severity();
        Self {
            region: record.region,
            district: record.district,
            risk_score: record.risk_score,
            flagged_count: record.flagged_count,
            suspicious_locations: record.suspicious_locations,
            severity,
        }
    }
}

/// The filtered table with its rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiView {
    /// Matching records, highest risk first.
    pub filtered_records: Vec<ApiRecord>,
    /// Sum of flagged counts over `filtered_records`.
    pub total_flagged: u64,
    /// `total_flagged` times the per-child subsidy.
    pub estimated_impact: f64,
    /// Number of matching records.
    pub matched_region_count: usize,
    /// Sum of suspicious locations over `filtered_records`.
    pub total_suspicious_locations: u64,
}

impl From<AggregateView> for ApiView {
    fn from(view: AggregateView) -> Self {
        Self {
            filtered_records: view
                .filtered_records
                .into_iter()
                .map(ApiRecord::from)
                .collect(),
            total_flagged: view.total_flagged,
            estimated_impact: view.estimated_impact,
            matched_region_count: view.matched_region_count,
            total_suspicious_locations: view.total_suspicious_locations,
        }
    }
}

/// Rollup of one region with its region-level severity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegion {
    /// Region name.
    pub region: String,
    /// Sum of flagged counts.
    pub total_flagged: u64,
    /// Mean risk score.
    pub average_risk: f64,
    /// Number of records.
    pub record_count: usize,
    /// Label from the region severity ladder.
    pub severity: Severity,
}

impl ApiRegion {
    /// Builds the API form of a region summary.
    #[must_use]
    pub fn new(region: String, summary: &RegionSummary) -> Self {
        Self {
            region,
            total_flagged: summary.total_flagged,
            average_risk: summary.average_risk,
            record_count: summary.record_count,
            severity: summary.severity(),
        }
    }
}

/// Response of the regions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegions {
    /// Every region, in ascending name order.
    pub regions: Vec<ApiRegion>,
    /// Regions with the most flagged enrolments.
    pub top_offenders: Vec<ApiRegion>,
    /// Summary of the region under the pointer, if any.
    pub hovered: Option<ApiRegion>,
}

impl ApiRegions {
    /// Builds the response from the full summary map and a ranked subset.
    #[must_use]
    pub fn new(
        summaries: BTreeMap<String, RegionSummary>,
        top_offenders: Vec<(String, RegionSummary)>,
        hovered: Option<(String, RegionSummary)>,
    ) -> Self {
        Self {
            regions: summaries
                .into_iter()
                .map(|(region, summary)| ApiRegion::new(region, &summary))
                .collect(),
            top_offenders: top_offenders
                .into_iter()
                .map(|(region, summary)| ApiRegion::new(region, &summary))
                .collect(),
            hovered: hovered.map(|(region, summary)| ApiRegion::new(region, &summary)),
        }
    }
}

/// Snapshot of the dashboard state, without the record store itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiState {
    /// Origin of the record store.
    pub source: DataSource,
    /// Number of records in the store.
    pub record_count: usize,
    /// Region names for the selector.
    pub regions: Vec<String>,
    /// Active filter.
    pub filter: FilterParams,
    /// Region under the pointer.
    pub hovered_region: Option<String>,
    /// AI strategy summary progress.
    pub insight: InsightState,
    /// Inference upload progress.
    pub upload: UploadStatus,
    /// Activity log, oldest first.
    pub logs: Vec<LogEntry>,
}

impl From<&DashboardState> for ApiState {
    fn from(state: &DashboardState) -> Self {
        Self {
            source: state.source.clone(),
            record_count: state.records.len(),
            regions: state.regions(),
            filter: state.filter.clone(),
            hovered_region: state.hovered_region.clone(),
            insight: state.insight.clone(),
            upload: state.upload,
            logs: state.logs.clone(),
        }
    }
}

/// Body of the filters endpoint. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilterUpdate {
    /// New search text.
    #[serde(default)]
    pub search: Option<String>,
    /// New region filter; `"ALL"` clears it.
    #[serde(default)]
    pub region: Option<RegionFilter>,
    /// New risk threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// New hovered region; `null` clears the hover.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub hovered_region: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters for the upload and analyze endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQueryParams {
    /// Name of the uploaded file.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "upload.csv".to_string()
}

/// Response of the insight endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInsight {
    /// Strategy text, shown verbatim.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_severity_label() {
        let json =
            serde_json::to_value(ApiRecord::from(DistrictRecord::new("A", "X", 0.95, 1, 0)))
                .unwrap();
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["riskScore"], 0.95);
    }

    #[test]
    fn region_uses_region_ladder() {
        let summary = RegionSummary {
            total_flagged: 10,
            average_risk: 0.85,
            record_count: 2,
        };
        // 0.85 is only "high" on the record ladder.
        assert_eq!(
            ApiRegion::new("A".to_string(), &summary).severity,
            Severity::Critical
        );
    }

    #[test]
    fn filter_update_distinguishes_null_from_absent() {
        let absent: ApiFilterUpdate = serde_json::from_str(r#"{"search":"pat"}"#).unwrap();
        assert_eq!(absent.search.as_deref(), Some("pat"));
        assert_eq!(absent.hovered_region, None);

        let cleared: ApiFilterUpdate = serde_json::from_str(r#"{"hoveredRegion":null}"#).unwrap();
        assert_eq!(cleared.hovered_region, Some(None));

        let set: ApiFilterUpdate =
            serde_json::from_str(r#"{"hoveredRegion":"Bihar","region":"ALL"}"#).unwrap();
        assert_eq!(set.hovered_region, Some(Some("Bihar".to_string())));
        assert_eq!(set.region, Some(RegionFilter::All));
    }

    #[test]
    fn state_snapshot_counts_records() {
        let state = DashboardState::default();
        let api = ApiState::from(&state);
        assert_eq!(api.record_count, state.records.len());
        assert_eq!(api.regions, state.regions());
    }
}
