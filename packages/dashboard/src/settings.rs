//! Runtime settings shared by the dashboard front ends.

use vigil_aadhaar_audit_models::DEFAULT_SUBSIDY_PER_CHILD;
use vigil_aadhaar_ingest_models::IngestConfig;

/// Settings that parameterize derived views and ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Per-child subsidy used for the estimated impact rollup.
    pub subsidy_per_child: f64,
    /// CSV ingestion settings.
    pub ingest: IngestConfig,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            subsidy_per_child: DEFAULT_SUBSIDY_PER_CHILD,
            ingest: IngestConfig::default(),
        }
    }
}

impl DashboardSettings {
    /// Reads `SUBSIDY_PER_CHILD` plus the ingestion variables.
    ///
    /// Unparseable or negative subsidies fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let subsidy_per_child = std::env::var("SUBSIDY_PER_CHILD")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_SUBSIDY_PER_CHILD);

        Self {
            subsidy_per_child,
            ingest: IngestConfig::from_env(),
        }
    }
}
