#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District fraud-risk record types and severity definitions.
//!
//! This crate defines the data model shared by every part of the audit
//! toolchain: the per-district input row, the derived per-region summary,
//! the filtered aggregate view, and the two severity ladders used to shade
//! regions and individual records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use strum_macros::{AsRefStr, Display, EnumString};

/// Sentinel written in place of a region name to disable region filtering.
pub const ALL_REGIONS: &str = "ALL";

/// Per-child subsidy used to turn a flagged count into an estimated fiscal
/// impact when no override is configured.
pub const DEFAULT_SUBSIDY_PER_CHILD: f64 = 6000.0;

/// One row of district-level fraud-risk data.
///
/// A record is identified by its `(region, district)` pair, but duplicate
/// pairs are allowed and are aggregated independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictRecord {
    /// Top-level jurisdiction (state) name.
    pub region: String,
    /// Sub-jurisdiction name within the region.
    pub district: String,
    /// Model-estimated fraud probability in `[0.0, 1.0]`.
    pub risk_score: f64,
    /// Number of suspect enrolments attributed to this district.
    #[serde(deserialize_with = "deserialize_count")]
    pub flagged_count: u64,
    /// Number of flagged sub-areas (e.g. postal codes) within the district.
    #[serde(deserialize_with = "deserialize_count")]
    pub suspicious_locations: u64,
}

/// Converts a decoded number into a count.
///
/// Fractional values are truncated (`12.7` becomes `12`); negative and
/// non-finite values become `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_from_f64(value: f64) -> u64 {
    if value.is_finite() && value >= 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// Accepts any JSON number for a count, so `120.0` from a dataframe-backed
/// server reads the same as `120`.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl de::Visitor<'_> for CountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
            Ok(u64::try_from(value).unwrap_or(0))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<u64, E> {
            Ok(count_from_f64(value))
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

impl DistrictRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        region: impl Into<String>,
        district: impl Into<String>,
        risk_score: f64,
        flagged_count: u64,
        suspicious_locations: u64,
    ) -> Self {
        Self {
            region: region.into(),
            district: district.into(),
            risk_score,
            flagged_count,
            suspicious_locations,
        }
    }

    /// Severity of this record on the per-record ladder.
    #[must_use]
    pub fn severity(&self) -> Severity {
        record_severity(self.risk_score)
    }
}

/// Rollup of every record belonging to one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    /// Sum of `flagged_count` over the region's records.
    pub total_flagged: u64,
    /// Arithmetic mean of `risk_score` over the region's records.
    pub average_risk: f64,
    /// Number of records with this region.
    pub record_count: usize,
}

impl RegionSummary {
    /// Severity of this region on the region-average ladder.
    #[must_use]
    pub fn severity(&self) -> Severity {
        region_severity(self.average_risk)
    }
}

/// Region selector: every region, or exactly one region by name.
///
/// Serialized as a plain string, with [`ALL_REGIONS`] standing for
/// [`RegionFilter::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionFilter {
    /// No region restriction.
    #[default]
    All,
    /// Only records whose region equals this name (case-sensitive).
    Region(String),
}

impl RegionFilter {
    /// Returns `true` if a record in `region` passes this filter.
    #[must_use]
    pub fn matches(&self, region: &str) -> bool {
        match self {
            Self::All => true,
            Self::Region(name) => name == region,
        }
    }
}

impl From<String> for RegionFilter {
    fn from(value: String) -> Self {
        if value == ALL_REGIONS {
            Self::All
        } else {
            Self::Region(value)
        }
    }
}

impl From<&str> for RegionFilter {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RegionFilter> for String {
    fn from(value: RegionFilter) -> Self {
        match value {
            RegionFilter::All => ALL_REGIONS.to_string(),
            RegionFilter::Region(name) => name,
        }
    }
}

impl std::fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_REGIONS}"),
            Self::Region(name) => write!(f, "{name}"),
        }
    }
}

/// The active filter applied to the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Case-insensitive substring matched against district or region.
    pub search: String,
    /// Region restriction.
    pub region: RegionFilter,
    /// Inclusive lower bound on `risk_score`.
    pub threshold: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            region: RegionFilter::All,
            threshold: 0.0,
        }
    }
}

/// Filtered, ranked view of the record store with its rollups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    /// Matching records, highest risk first. Ties keep store order.
    pub filtered_records: Vec<DistrictRecord>,
    /// Sum of `flagged_count` over `filtered_records`.
    pub total_flagged: u64,
    /// `total_flagged` multiplied by the per-child subsidy.
    pub estimated_impact: f64,
    /// Number of matching records.
    ///
    /// Labelled "districts" by the dashboard; this counts records, not
    /// distinct regions.
    pub matched_region_count: usize,
    /// Sum of `suspicious_locations` over `filtered_records`.
    pub total_suspicious_locations: u64,
}

/// Severity label shared by both classification ladders.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Below every named threshold.
    Low,
    /// Worth monitoring.
    Moderate,
    /// Needs an audit.
    High,
    /// Needs immediate intervention.
    Critical,
}

impl Severity {
    /// Returns all variants, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Moderate, Self::High, Self::Critical]
    }
}

/// Classifies a region by its average risk.
///
/// `>= 0.80` critical, `>= 0.50` high, `>= 0.30` moderate, otherwise low.
/// NaN and out-of-range inputs fall through to [`Severity::Low`].
#[must_use]
pub fn region_severity(average_risk: f64) -> Severity {
    if average_risk >= 0.80 {
        Severity::Critical
    } else if average_risk >= 0.50 {
        Severity::High
    } else if average_risk >= 0.30 {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

/// Classifies a single record by its risk score.
///
/// `>= 0.90` critical, `>= 0.70` high, `>= 0.40` moderate, otherwise low.
/// Kept separate from [`region_severity`]: the ladders classify different
/// inputs and have different cut points.
#[must_use]
pub fn record_severity(risk_score: f64) -> Severity {
    if risk_score >= 0.90 {
        Severity::Critical
    } else if risk_score >= 0.70 {
        Severity::High
    } else if risk_score >= 0.40 {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_float_json_numbers() {
        let record: DistrictRecord = serde_json::from_value(serde_json::json!({
            "region": "Bihar",
            "district": "Patna",
            "riskScore": 0.91,
            "flaggedCount": 120.0,
            "suspiciousLocations": 4.7,
        }))
        .unwrap();
        assert_eq!(record.flagged_count, 120);
        assert_eq!(record.suspicious_locations, 4);
    }

    #[test]
    fn negative_counts_read_as_zero() {
        let record: DistrictRecord = serde_json::from_value(serde_json::json!({
            "region": "Bihar",
            "district": "Gaya",
            "riskScore": 0.5,
            "flaggedCount": -3,
            "suspiciousLocations": -0.5,
        }))
        .unwrap();
        assert_eq!(record.flagged_count, 0);
        assert_eq!(record.suspicious_locations, 0);
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let result = serde_json::from_value::<DistrictRecord>(serde_json::json!({
            "region": "Bihar",
            "district": "Gaya",
            "riskScore": 0.5,
            "flaggedCount": "many",
            "suspiciousLocations": 1,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn count_from_f64_truncates() {
        assert_eq!(count_from_f64(12.7), 12);
        assert_eq!(count_from_f64(-1.0), 0);
        assert_eq!(count_from_f64(f64::NAN), 0);
        assert_eq!(count_from_f64(f64::INFINITY), 0);
    }

    #[test]
    fn region_ladder_boundaries() {
        assert_eq!(region_severity(0.80), Severity::Critical);
        assert_eq!(region_severity(0.79), Severity::High);
        assert_eq!(region_severity(0.50), Severity::High);
        assert_eq!(region_severity(0.49), Severity::Moderate);
        assert_eq!(region_severity(0.30), Severity::Moderate);
        assert_eq!(region_severity(0.29), Severity::Low);
        assert_eq!(region_severity(1.0), Severity::Critical);
    }

    #[test]
    fn record_ladder_boundaries() {
        assert_eq!(record_severity(0.90), Severity::Critical);
        assert_eq!(record_severity(0.89), Severity::High);
        assert_eq!(record_severity(0.70), Severity::High);
        assert_eq!(record_severity(0.69), Severity::Moderate);
        assert_eq!(record_severity(0.40), Severity::Moderate);
        assert_eq!(record_severity(0.39), Severity::Low);
    }

    #[test]
    fn ladders_disagree_between_cut_points() {
        assert_eq!(region_severity(0.85), Severity::Critical);
        assert_eq!(record_severity(0.85), Severity::High);
        assert_eq!(region_severity(0.35), Severity::Moderate);
        assert_eq!(record_severity(0.35), Severity::Low);
    }

    #[test]
    fn out_of_range_inputs_are_low() {
        for value in [-1.0, -0.0001, f64::NAN, f64::NEG_INFINITY] {
            assert_eq!(region_severity(value), Severity::Low, "{value}");
            assert_eq!(record_severity(value), Severity::Low, "{value}");
        }
    }

    #[test]
    fn severity_labels_are_lowercase() {
        let labels: Vec<String> = Severity::all().iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["low", "moderate", "high", "critical"]);
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
    }

    #[test]
    fn region_filter_all_sentinel() {
        assert_eq!(RegionFilter::from("ALL"), RegionFilter::All);
        assert_eq!(
            RegionFilter::from("all"),
            RegionFilter::Region("all".to_string())
        );
        assert!(RegionFilter::All.matches("Bihar"));
        assert!(RegionFilter::from("Bihar").matches("Bihar"));
        assert!(!RegionFilter::from("Bihar").matches("bihar"));
    }

    #[test]
    fn record_json_uses_camel_case() {
        let record = DistrictRecord::new("Bihar", "Patna", 0.91, 120, 4);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["riskScore"], 0.91);
        assert_eq!(json["flaggedCount"], 120);
        assert_eq!(json["suspiciousLocations"], 4);
    }

    #[test]
    fn filter_params_region_serializes_as_string() {
        let filter = FilterParams::default();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["region"], "ALL");

        let parsed: FilterParams = serde_json::from_value(serde_json::json!({
            "search": "pat",
            "region": "Bihar",
            "threshold": 0.5,
        }))
        .unwrap();
        assert_eq!(parsed.region, RegionFilter::Region("Bihar".to_string()));
    }
}
