//! Filtering and rollup over the record store.

use std::collections::BTreeMap;

use vigil_aadhaar_audit_models::{AggregateView, DistrictRecord, FilterParams, RegionSummary};

/// Returns `true` if `record` passes every predicate of `filter`.
///
/// The threshold is an inclusive lower bound, the region match is exact and
/// case-sensitive, and the search text is a case-insensitive substring of
/// either the district or the region name.
#[must_use]
pub fn matches_filter(record: &DistrictRecord, filter: &FilterParams) -> bool {
    if record.risk_score < filter.threshold || !filter.region.matches(&record.region) {
        return false;
    }

    if filter.search.is_empty() {
        return true;
    }

    let needle = filter.search.to_lowercase();
    record.district.to_lowercase().contains(&needle)
        || record.region.to_lowercase().contains(&needle)
}

/// Filters `records`, ranks the survivors by risk and computes the rollups.
///
/// The sort is stable, so records with equal scores keep their store order.
/// Every rollup is computed from the filtered records only.
#[must_use]
pub fn filter_and_aggregate(
    records: &[DistrictRecord],
    filter: &FilterParams,
    subsidy_per_child: f64,
) -> AggregateView {
    let mut filtered_records: Vec<DistrictRecord> = records
        .iter()
        .filter(|r| matches_filter(r, filter))
        .cloned()
        .collect();

    // `sort_by` is stable; `total_cmp` keeps NaN scores from poisoning it.
    filtered_records.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let total_flagged: u64 = filtered_records.iter().map(|r| r.flagged_count).sum();
    let total_suspicious_locations: u64 = filtered_records
        .iter()
        .map(|r| r.suspicious_locations)
        .sum();

    log::debug!(
        "filter_and_aggregate: {} of {} records matched (search={:?}, region={}, threshold={})",
        filtered_records.len(),
        records.len(),
        filter.search,
        filter.region,
        filter.threshold,
    );

    #[allow(clippy::cast_precision_loss)]
    let estimated_impact = total_flagged as f64 * subsidy_per_child;

    AggregateView {
        matched_region_count: filtered_records.len(),
        filtered_records,
        total_flagged,
        estimated_impact,
        total_suspicious_locations,
    }
}

#[derive(Default)]
struct RegionAccumulator {
    total_flagged: u64,
    risk_sum: f64,
    record_count: usize,
}

/// Groups the whole store by region.
///
/// This ignores the active filter so the geographic overview stays put while
/// the table is being filtered. Keys iterate in ascending region order;
/// consumers wanting another order re-sort (see
/// [`crate::ranking::top_offenders`]).
#[must_use]
pub fn summarize_by_region(records: &[DistrictRecord]) -> BTreeMap<String, RegionSummary> {
    let mut accumulators: BTreeMap<&str, RegionAccumulator> = BTreeMap::new();

    for record in records {
        let acc = accumulators.entry(record.region.as_str()).or_default();
        acc.total_flagged += record.flagged_count;
        acc.risk_sum += record.risk_score;
        acc.record_count += 1;
    }

    accumulators
        .into_iter()
        .map(|(region, acc)| {
            // Only regions with at least one record ever get an accumulator.
            #[allow(clippy::cast_precision_loss)]
            let average_risk = acc.risk_sum / acc.record_count as f64;
            (
                region.to_string(),
                RegionSummary {
                    total_flagged: acc.total_flagged,
                    average_risk,
                    record_count: acc.record_count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use vigil_aadhaar_audit_models::RegionFilter;

    use super::*;

    const SUBSIDY: f64 = 6000.0;

    fn example_records() -> Vec<DistrictRecord> {
        vec![
            DistrictRecord::new("A", "X", 0.9, 10, 2),
            DistrictRecord::new("A", "Y", 0.3, 5, 1),
        ]
    }

    fn mixed_records() -> Vec<DistrictRecord> {
        vec![
            DistrictRecord::new("Bihar", "Patna", 0.72, 140, 6),
            DistrictRecord::new("Uttar Pradesh", "Lucknow", 0.95, 310, 11),
            DistrictRecord::new("Bihar", "Gaya", 0.72, 90, 3),
            DistrictRecord::new("Maharashtra", "Pune", 0.18, 12, 0),
            DistrictRecord::new("Uttar Pradesh", "Agra", 0.72, 75, 2),
            DistrictRecord::new("Maharashtra", "Nagpur", 0.44, 40, 1),
        ]
    }

    fn filter(search: &str, region: &str, threshold: f64) -> FilterParams {
        FilterParams {
            search: search.to_string(),
            region: RegionFilter::from(region),
            threshold,
        }
    }

    #[test]
    fn threshold_example() {
        let view = filter_and_aggregate(&example_records(), &filter("", "ALL", 0.5), SUBSIDY);
        assert_eq!(view.filtered_records, vec![example_records()[0].clone()]);
        assert_eq!(view.total_flagged, 10);
        assert_eq!(view.total_suspicious_locations, 2);
        assert_eq!(view.matched_region_count, 1);
        assert!((view.estimated_impact - 60_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_example() {
        let summaries = summarize_by_region(&example_records());
        assert_eq!(summaries.len(), 1);
        let a = &summaries["A"];
        assert_eq!(a.total_flagged, 15);
        assert_eq!(a.record_count, 2);
        assert!((a.average_risk - 0.6).abs() < 1e-9);
    }

    #[test]
    fn empty_store_yields_zero_rollups() {
        let view = filter_and_aggregate(&[], &filter("", "ALL", 0.0), SUBSIDY);
        assert_eq!(view, AggregateView::default());
        assert!(summarize_by_region(&[]).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let records = mixed_records();
        let view = filter_and_aggregate(&records, &filter("", "ALL", 0.72), SUBSIDY);
        let districts: Vec<&str> = view
            .filtered_records
            .iter()
            .map(|r| r.district.as_str())
            .collect();
        assert_eq!(districts, ["Lucknow", "Patna", "Gaya", "Agra"]);
    }

    #[test]
    fn equal_scores_keep_store_order() {
        let records = mixed_records();
        let view = filter_and_aggregate(&records, &filter("", "ALL", 0.0), SUBSIDY);
        let tied: Vec<&str> = view
            .filtered_records
            .iter()
            .filter(|r| (r.risk_score - 0.72).abs() < f64::EPSILON)
            .map(|r| r.district.as_str())
            .collect();
        assert_eq!(tied, ["Patna", "Gaya", "Agra"]);
    }

    #[test]
    fn raising_threshold_never_grows_the_view() {
        let records = mixed_records();
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let threshold = f64::from(step) / 20.0;
            let len = filter_and_aggregate(&records, &filter("", "ALL", threshold), SUBSIDY)
                .filtered_records
                .len();
            assert!(len <= previous, "threshold {threshold} grew the view");
            previous = len;
        }
    }

    #[test]
    fn rollups_follow_filtered_records() {
        let records = mixed_records();
        for f in [
            filter("", "ALL", 0.0),
            filter("a", "ALL", 0.4),
            filter("", "Bihar", 0.0),
            filter("pune", "Maharashtra", 0.0),
        ] {
            let view = filter_and_aggregate(&records, &f, SUBSIDY);
            let flagged: u64 = view.filtered_records.iter().map(|r| r.flagged_count).sum();
            let locations: u64 = view
                .filtered_records
                .iter()
                .map(|r| r.suspicious_locations)
                .sum();
            assert_eq!(view.total_flagged, flagged);
            assert_eq!(view.total_suspicious_locations, locations);
            assert_eq!(view.matched_region_count, view.filtered_records.len());
        }
    }

    #[test]
    fn search_matches_district_or_region_case_insensitively() {
        let records = mixed_records();

        let by_district = filter_and_aggregate(&records, &filter("PAT", "ALL", 0.0), SUBSIDY);
        assert_eq!(by_district.filtered_records.len(), 1);
        assert_eq!(by_district.filtered_records[0].district, "Patna");

        let by_region = filter_and_aggregate(&records, &filter("pradesh", "ALL", 0.0), SUBSIDY);
        assert_eq!(by_region.filtered_records.len(), 2);
    }

    #[test]
    fn region_filter_is_exact_and_case_sensitive() {
        let records = mixed_records();
        let exact = filter_and_aggregate(&records, &filter("", "Bihar", 0.0), SUBSIDY);
        assert_eq!(exact.filtered_records.len(), 2);

        let wrong_case = filter_and_aggregate(&records, &filter("", "bihar", 0.0), SUBSIDY);
        assert!(wrong_case.filtered_records.is_empty());

        let prefix = filter_and_aggregate(&records, &filter("", "Uttar", 0.0), SUBSIDY);
        assert!(prefix.filtered_records.is_empty());
    }

    #[test]
    fn matched_count_counts_records_not_regions() {
        let records = mixed_records();
        let view = filter_and_aggregate(&records, &filter("", "Bihar", 0.0), SUBSIDY);
        assert_eq!(view.matched_region_count, 2);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = mixed_records();
        let f = filter("a", "ALL", 0.3);
        assert_eq!(
            filter_and_aggregate(&records, &f, SUBSIDY),
            filter_and_aggregate(&records, &f, SUBSIDY)
        );
    }

    #[test]
    fn duplicates_are_both_counted() {
        let records = vec![
            DistrictRecord::new("Bihar", "Patna", 0.8, 10, 1),
            DistrictRecord::new("Bihar", "Patna", 0.6, 20, 2),
        ];
        let view = filter_and_aggregate(&records, &filter("", "ALL", 0.0), SUBSIDY);
        assert_eq!(view.filtered_records.len(), 2);
        assert_eq!(view.total_flagged, 30);

        let summary = &summarize_by_region(&records)["Bihar"];
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.total_flagged, 30);
    }

    #[test]
    fn summary_has_one_key_per_region() {
        let records = mixed_records();
        let summaries = summarize_by_region(&records);
        let keys: Vec<&str> = summaries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Bihar", "Maharashtra", "Uttar Pradesh"]);

        for (region, summary) in &summaries {
            let count = records.iter().filter(|r| &r.region == region).count();
            assert_eq!(summary.record_count, count, "{region}");
        }
    }

    #[test]
    fn summary_sums_per_region() {
        let records = mixed_records();
        let up = &summarize_by_region(&records)["Uttar Pradesh"];
        assert_eq!(up.total_flagged, 385);
        assert!((up.average_risk - (0.95 + 0.72) / 2.0).abs() < 1e-9);
    }
}
