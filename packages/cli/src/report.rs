//! Plain-text rendering of views and rollups for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use vigil_aadhaar_audit_models::{AggregateView, DistrictRecord, RegionSummary};

const CRORE: f64 = 10_000_000.0;

/// Formats a rupee amount in crore, e.g. `₹7.20 Cr`.
#[must_use]
pub fn format_impact(amount: f64) -> String {
    format!("₹{:.2} Cr", amount / CRORE)
}

/// Headline rollups of a filtered view.
#[must_use]
pub fn rollups(view: &AggregateView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Matched records:       {}", view.matched_region_count);
    let _ = writeln!(out, "Flagged enrolments:    {}", view.total_flagged);
    let _ = writeln!(
        out,
        "Suspicious locations:  {}",
        view.total_suspicious_locations
    );
    let _ = writeln!(
        out,
        "Estimated impact:      {}",
        format_impact(view.estimated_impact)
    );
    out
}

/// Ranked district table, at most `limit` rows.
#[must_use]
pub fn records_table(records: &[DistrictRecord], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<24} {:>6} {:>8} {:>6}  SEVERITY",
        "#", "REGION", "DISTRICT", "RISK", "FLAGGED", "SITES"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));

    for (rank, record) in records.iter().take(limit).enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<24} {:>6.2} {:>8} {:>6}  {}",
            rank + 1,
            record.region,
            record.district,
            record.risk_score,
            record.flagged_count,
            record.suspicious_locations,
            record.severity()
        );
    }

    if records.len() > limit {
        let _ = writeln!(out, "... {} more", records.len() - limit);
    }
    out
}

/// Region rollup table.
#[must_use]
pub fn regions_table<'a>(summaries: impl IntoIterator<Item = (&'a String, &'a RegionSummary)>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>8} {:>9} {:>8}  SEVERITY",
        "REGION", "FLAGGED", "AVG RISK", "RECORDS"
    );
    let _ = writeln!(out, "{}", "-".repeat(60));

    for (region, summary) in summaries {
        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>9.3} {:>8}  {}",
            region,
            summary.total_flagged,
            summary.average_risk,
            summary.record_count,
            summary.severity()
        );
    }
    out
}

/// Region table in ascending name order.
#[must_use]
pub fn all_regions(summaries: &BTreeMap<String, RegionSummary>) -> String {
    regions_table(summaries)
}

/// Region table in the given rank order.
#[must_use]
pub fn ranked_regions(ranked: &[(String, RegionSummary)]) -> String {
    regions_table(ranked.iter().map(|(region, summary)| (region, summary)))
}
