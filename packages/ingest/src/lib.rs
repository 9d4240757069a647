#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion of district risk records from uploaded CSV files.
//!
//! Rows are read positionally (`region, district, riskScore, flaggedCount,
//! suspiciousLocations`) after a single header line. Bad rows are skipped
//! one at a time; an ingestion only fails as a whole when nothing usable is
//! left, in which case the caller keeps its current record store.

pub mod mock;

use std::path::Path;

use thiserror::Error;
use vigil_aadhaar_audit_models::{DistrictRecord, count_from_f64};
use vigil_aadhaar_ingest_models::{IngestConfig, IngestReport, REQUIRED_FIELDS, SkipReason};

/// Errors that can occur while ingesting a CSV file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the file from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV stream could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Every data row was rejected.
    #[error("No valid rows found ({skipped_rows} rows skipped)")]
    NoValidRows {
        /// Number of rows that were rejected.
        skipped_rows: usize,
    },
}

/// Parses a CSV payload into district records.
///
/// # Errors
///
/// Returns [`IngestError::NoValidRows`] if no row survives validation, or
/// [`IngestError::Csv`] if the underlying reader fails for a reason other
/// than a single undecodable row.
pub fn parse_csv(input: &[u8], config: &IngestConfig) -> Result<IngestReport, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut records = Vec::new();
    let mut skipped_rows = 0_usize;

    for (index, result) in reader.records().enumerate() {
        // Header is line 1, so data rows start at line 2.
        let line = index + 2;

        let row = match result {
            Ok(row) => row,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                log::debug!("Skipping line {line}: {:?} ({e})", SkipReason::Malformed);
                skipped_rows += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match parse_row(&row, config) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::debug!("Skipping line {line}: {reason:?}");
                skipped_rows += 1;
            }
        }
    }

    if records.is_empty() {
        log::warn!("CSV ingestion produced no valid rows ({skipped_rows} skipped)");
        return Err(IngestError::NoValidRows { skipped_rows });
    }

    log::info!(
        "Parsed {} records from CSV ({skipped_rows} rows skipped)",
        records.len()
    );

    Ok(IngestReport {
        records,
        skipped_rows,
    })
}

/// Reads and parses a CSV file from disk.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read, otherwise the
/// same errors as [`parse_csv`].
pub fn load_csv_file(path: &Path, config: &IngestConfig) -> Result<IngestReport, IngestError> {
    log::info!("Loading CSV from {}", path.display());
    let bytes = std::fs::read(path)?;
    parse_csv(&bytes, config)
}

/// Validates one CSV row and converts it into a record.
fn parse_row(row: &csv::StringRecord, config: &IngestConfig) -> Result<DistrictRecord, SkipReason> {
    if row.len() < REQUIRED_FIELDS {
        return Err(SkipReason::TooFewFields);
    }

    let region = row.get(0).unwrap_or_default();
    if region == config.noise_sentinel {
        return Err(SkipReason::Noise);
    }
    if region == config.header_sentinel {
        return Err(SkipReason::RepeatedHeader);
    }

    let district = row.get(1).unwrap_or_default();
    if region.is_empty() || district.is_empty() {
        return Err(SkipReason::MissingName);
    }

    Ok(DistrictRecord {
        region: region.to_string(),
        district: district.to_string(),
        risk_score: parse_score(row.get(2).unwrap_or_default()),
        flagged_count: parse_count(row.get(3).unwrap_or_default()),
        suspicious_locations: parse_count(row.get(4).unwrap_or_default()),
    })
}

/// Parses a risk score, defaulting to `0.0` on failure.
fn parse_score(field: &str) -> f64 {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses a non-negative count, defaulting to `0` on failure.
///
/// Fractional values are truncated (`"12.7"` reads as `12`); negative and
/// non-numeric values read as `0`.
fn parse_count(field: &str) -> u64 {
    if let Ok(value) = field.parse::<u64>() {
        return value;
    }

    field.parse::<f64>().map_or(0, count_from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "region,district,riskScore,flaggedCount,suspiciousLocations\n";

    fn parse(body: &str) -> Result<IngestReport, IngestError> {
        parse_csv(format!("{HEADER}{body}").as_bytes(), &IngestConfig::default())
    }

    #[test]
    fn parses_valid_rows_in_order() {
        let report = parse("Bihar,Patna,0.91,120,4\nKerala, Kochi ,0.12,3,0\n").unwrap();
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(
            report.records,
            vec![
                DistrictRecord::new("Bihar", "Patna", 0.91, 120, 4),
                DistrictRecord::new("Kerala", "Kochi", 0.12, 3, 0),
            ]
        );
    }

    #[test]
    fn skips_short_rows() {
        let report = parse("Bihar,Patna,0.91,120\nBihar,Gaya,0.5,10,1\n").unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].district, "Gaya");
        assert_eq!(report.skipped_rows, 1);
    }

    #[test]
    fn skips_noise_and_repeated_header_rows() {
        let report = parse(
            "NOISE,x,1,1,1\nregion,district,riskScore,flaggedCount,suspiciousLocations\nAssam,Jorhat,0.4,7,2\n",
        )
        .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn sentinels_are_configurable() {
        let config = IngestConfig {
            noise_sentinel: "__junk__".to_string(),
            header_sentinel: "State".to_string(),
            ..IngestConfig::default()
        };
        let body = format!("{HEADER}NOISE,x,0.1,1,1\n__junk__,y,0.1,1,1\nState,z,0.1,1,1\n");
        let report = parse_csv(body.as_bytes(), &config).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].region, "NOISE");
    }

    #[test]
    fn unparseable_numbers_default_to_zero() {
        let report = parse("Goa,North Goa,high,-4,many\n").unwrap();
        let record = &report.records[0];
        assert!(record.risk_score.abs() < f64::EPSILON);
        assert_eq!(record.flagged_count, 0);
        assert_eq!(record.suspicious_locations, 0);
    }

    #[test]
    fn fractional_counts_are_truncated() {
        let report = parse("Goa,South Goa,0.3,12.7,2.0\n").unwrap();
        assert_eq!(report.records[0].flagged_count, 12);
        assert_eq!(report.records[0].suspicious_locations, 2);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let report = parse("Punjab,Amritsar,0.66,30,5,extra,columns\n").unwrap();
        assert_eq!(
            report.records[0],
            DistrictRecord::new("Punjab", "Amritsar", 0.66, 30, 5)
        );
    }

    #[test]
    fn blank_names_are_skipped() {
        let report = parse(",Nowhere,0.5,1,1\nBihar,,0.5,1,1\nBihar,Gaya,0.5,1,1\n").unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn header_only_file_fails() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, IngestError::NoValidRows { skipped_rows: 0 }));
    }

    #[test]
    fn all_rows_rejected_fails() {
        let err = parse("NOISE,a,1,1,1\nshort,row\n").unwrap_err();
        assert!(matches!(err, IngestError::NoValidRows { skipped_rows: 2 }));
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"Bihar,\xff\xfe,0.5,1,1\n");
        body.extend_from_slice(b"Bihar,Gaya,0.5,1,1\n");
        let report = parse_csv(&body, &IngestConfig::default()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped_rows, 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv_file(
            Path::new("/nonexistent/vigil-aadhaar.csv"),
            &IngestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
