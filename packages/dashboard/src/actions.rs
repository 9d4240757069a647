//! Side-effecting dashboard actions.
//!
//! Each action talks to one collaborator (the CSV parser, the inference
//! server or an LLM provider) and turns the outcome into a
//! [`DashboardEvent`]. State changes still only happen through [`reduce`].

use chrono::{DateTime, Utc};
use vigil_aadhaar_ai::{insight::generate_insight, providers::LlmProvider};
use vigil_aadhaar_inference::{InferenceClient, InferenceError, InferenceResponse};
use vigil_aadhaar_ingest::parse_csv;
use vigil_aadhaar_ingest_models::IngestConfig;

use crate::{DashboardEvent, DashboardState, reduce};

/// Turns an uploaded CSV payload into a load or reject event.
#[must_use]
pub fn csv_event(file_name: &str, bytes: &[u8], config: &IngestConfig) -> DashboardEvent {
    match parse_csv(bytes, config) {
        Ok(report) => {
            log::info!(
                "Parsed {} records from {file_name} ({} rows skipped)",
                report.records.len(),
                report.skipped_rows
            );
            DashboardEvent::CsvLoaded {
                file_name: file_name.to_string(),
                records: report.records,
                skipped_rows: report.skipped_rows,
            }
        }
        Err(e) => {
            log::warn!("Rejected {file_name}: {e}");
            DashboardEvent::CsvRejected {
                file_name: file_name.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Parses `bytes` and applies the result to `state`.
///
/// A file with no usable rows leaves the record store unchanged.
#[must_use]
pub fn load_csv(
    state: &DashboardState,
    file_name: &str,
    bytes: &[u8],
    config: &IngestConfig,
    now: DateTime<Utc>,
) -> DashboardState {
    reduce(state, csv_event(file_name, bytes, config), now)
}

/// Maps the outcome of an inference call to the event that records it.
#[must_use]
pub fn inference_event(
    file_name: &str,
    result: Result<InferenceResponse, InferenceError>,
) -> DashboardEvent {
    match result {
        Ok(response) => DashboardEvent::InferenceCompleted {
            file_name: file_name.to_string(),
            data: response.data,
            logs: response.logs.unwrap_or_default(),
        },
        Err(e) => {
            log::error!("Inference upload of {file_name} failed: {e}");
            DashboardEvent::InferenceFailed {
                message: e.to_string(),
            }
        }
    }
}

/// Uploads `bytes` to the inference server and folds the answer into the
/// state.
///
/// Failures are recorded in the log and the upload status; they never
/// propagate and never touch the record store.
pub async fn run_inference(
    state: &DashboardState,
    client: &InferenceClient,
    file_name: &str,
    bytes: Vec<u8>,
) -> DashboardState {
    let uploading = reduce(
        state,
        DashboardEvent::UploadStarted {
            file_name: file_name.to_string(),
        },
        Utc::now(),
    );

    let result = client.analyze(file_name, bytes).await;

    reduce(&uploading, inference_event(file_name, result), Utc::now())
}

/// Generates a strategy summary for the current filtered view.
///
/// The returned state always carries a ready insight: either the
/// provider's text or the fallback advisory.
pub async fn request_insight(
    state: &DashboardState,
    provider: &dyn LlmProvider,
    subsidy_per_child: f64,
) -> DashboardState {
    let generating = reduce(state, DashboardEvent::InsightRequested, Utc::now());
    let view = generating.view(subsidy_per_child);
    let text = generate_insight(provider, &view).await;

    reduce(&generating, DashboardEvent::InsightReady { text }, Utc::now())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone as _;
    use vigil_aadhaar_ai::{AiError, insight::FALLBACK_ADVISORY};
    use vigil_aadhaar_audit_models::DistrictRecord;
    use vigil_aadhaar_inference::InferenceConfig;

    use super::*;
    use crate::{DataSource, InsightState, UploadStatus};

    struct FixedProvider(Result<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl LlmProvider for FixedProvider {
        async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String, AiError> {
            match self.0 {
                Ok(text) => Ok(format!("{text}\n{prompt}")),
                Err(message) => Err(AiError::Provider {
                    message: message.to_string(),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap()
    }

    #[test]
    fn load_csv_replaces_store_with_valid_rows() {
        let csv = b"region,district,riskScore,flaggedCount,suspiciousLocations\n\
                    Kerala,Idukki,0.77,120,4\n\
                    NOISE,x,0.1,1,1\n";
        let state = load_csv(
            &DashboardState::default(),
            "kerala.csv",
            csv,
            &IngestConfig::default(),
            now(),
        );
        assert_eq!(
            state.records,
            vec![DistrictRecord::new("Kerala", "Idukki", 0.77, 120, 4)]
        );
        assert_eq!(
            state.source,
            DataSource::Csv {
                file_name: "kerala.csv".to_string()
            }
        );
    }

    #[test]
    fn load_csv_without_valid_rows_keeps_store() {
        let original = DashboardState::default();
        let state = load_csv(
            &original,
            "empty.csv",
            b"region,district,riskScore,flaggedCount,suspiciousLocations\nNOISE,a,b,c,d\n",
            &IngestConfig::default(),
            now(),
        );
        assert_eq!(state.records, original.records);
        assert_eq!(state.source, DataSource::Mock);
        assert!(state.logs[0].message.starts_with("Rejected empty.csv"));
    }

    #[test]
    fn inference_event_defaults_missing_logs() {
        let event = inference_event(
            "raw.csv",
            Ok(InferenceResponse {
                data: None,
                logs: None,
            }),
        );
        assert_eq!(
            event,
            DashboardEvent::InferenceCompleted {
                file_name: "raw.csv".to_string(),
                data: None,
                logs: Vec::new(),
            }
        );
    }

    #[test]
    fn inference_event_maps_errors_to_failure() {
        let event = inference_event(
            "raw.csv",
            Err(InferenceError::Status {
                status: 503,
                body: "busy".to_string(),
            }),
        );
        assert!(matches!(
            event,
            DashboardEvent::InferenceFailed { message } if message.contains("503")
        ));
    }

    #[tokio::test]
    async fn unreachable_server_keeps_store() {
        let client = InferenceClient::new(InferenceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let original = DashboardState::default();

        let state = run_inference(&original, &client, "raw.csv", b"a,b\n".to_vec()).await;

        assert_eq!(state.records, original.records);
        assert_eq!(state.upload, UploadStatus::Failed);
        assert!(
            state
                .logs
                .last()
                .unwrap()
                .message
                .starts_with("Connection failed: ")
        );
    }

    #[tokio::test]
    async fn insight_uses_filtered_view() {
        let state = DashboardState::default();
        let state = request_insight(&state, &FixedProvider(Ok("Inspect first:")), 6000.0).await;

        let InsightState::Ready(text) = &state.insight else {
            panic!("expected a ready insight, got {:?}", state.insight);
        };
        assert!(text.starts_with("Inspect first:"));
        assert!(text.contains("flagged entries"));
    }

    #[tokio::test]
    async fn insight_failure_shows_fallback() {
        let state = request_insight(
            &DashboardState::default(),
            &FixedProvider(Err("no key")),
            6000.0,
        )
        .await;
        assert_eq!(
            state.insight,
            InsightState::Ready(FALLBACK_ADVISORY.to_string())
        );
    }
}
