//! Ranking helpers layered on top of the engine outputs.

use std::collections::{BTreeMap, BTreeSet};

use vigil_aadhaar_audit_models::{AggregateView, DistrictRecord, RegionSummary};

/// Returns the regions with the most flagged entries, highest first.
///
/// Ties are broken by region name so the ordering is deterministic.
#[must_use]
pub fn top_offenders(
    summaries: &BTreeMap<String, RegionSummary>,
    limit: usize,
) -> Vec<(String, RegionSummary)> {
    let mut ranked: Vec<(String, RegionSummary)> = summaries
        .iter()
        .map(|(region, summary)| (region.clone(), summary.clone()))
        .collect();

    // BTreeMap iteration is already name-ordered and the sort is stable.
    ranked.sort_by(|a, b| b.1.total_flagged.cmp(&a.1.total_flagged));
    ranked.truncate(limit);
    ranked
}

/// Distinct region names present in the store, in ascending order.
#[must_use]
pub fn available_regions(records: &[DistrictRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.region.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// The `n` highest-risk records of a view.
#[must_use]
pub fn top_records(view: &AggregateView, n: usize) -> &[DistrictRecord] {
    &view.filtered_records[..n.min(view.filtered_records.len())]
}
