//! Audit strategy summaries for the current filtered view.

use std::fmt::Write as _;

use vigil_aadhaar_analytics::top_records;
use vigil_aadhaar_audit_models::{AggregateView, DistrictRecord};

use crate::providers::LlmProvider;

/// Number of top-ranked records included in the prompt.
pub const DIGEST_SIZE: usize = 5;

/// Shown in place of a generated summary whenever generation fails.
pub const FALLBACK_ADVISORY: &str = "AI strategy generation is currently unavailable. \
    Prioritise field verification in the highest-risk districts listed above, \
    cross-check flagged enrolments against school attendance and birth registries, \
    and suspend disbursements to unverified beneficiaries until audits complete.";

const SYSTEM_PROMPT: &str = "You are a senior government fraud auditor reviewing \
    child-welfare enrolment data for ghost beneficiaries. Answer with a short, \
    actionable audit strategy in plain prose or a brief numbered list.";

/// Builds the user prompt from the highest-ranked records.
///
/// Only the first [`DIGEST_SIZE`] records are used; callers pass the
/// filtered records in rank order.
#[must_use]
pub fn build_prompt(records: &[DistrictRecord]) -> String {
    let mut prompt = String::from(
        "The following districts have the highest suspected ghost-child enrolment:\n",
    );

    for record in records.iter().take(DIGEST_SIZE) {
        let _ = writeln!(
            prompt,
            "- {} ({}): {} flagged entries",
            record.district, record.region, record.flagged_count
        );
    }

    prompt.push_str(
        "\nRecommend a concise audit strategy: which districts to inspect first, \
         what evidence to collect, and what immediate controls to apply.",
    );
    prompt
}

/// Requests a strategy summary for `view`.
///
/// The provider's text is returned verbatim. Errors and empty answers are
/// logged and replaced by [`FALLBACK_ADVISORY`]; this function never fails.
pub async fn generate_insight(provider: &dyn LlmProvider, view: &AggregateView) -> String {
    let digest = top_records(view, DIGEST_SIZE);
    let prompt = build_prompt(digest);

    log::info!(
        "Requesting audit strategy from {} for {} districts",
        provider.name(),
        digest.len()
    );

    match provider.generate(SYSTEM_PROMPT, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            log::warn!("{} returned an empty strategy", provider.name());
            FALLBACK_ADVISORY.to_string()
        }
        Err(e) => {
            log::error!("Strategy generation via {} failed: {e}", provider.name());
            FALLBACK_ADVISORY.to_string()
        }
    }
}
