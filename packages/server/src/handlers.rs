//! HTTP handler functions for the audit dashboard API.

use actix_web::{HttpResponse, web};
use vigil_aadhaar_ai::insight::{FALLBACK_ADVISORY, generate_insight};
use vigil_aadhaar_analytics::top_offenders;
use vigil_aadhaar_dashboard::{
    DashboardEvent, InsightState, UploadStatus,
    actions::{csv_event, inference_event},
};
use vigil_aadhaar_server_models::{
    ApiError, ApiFilterUpdate, ApiHealth, ApiInsight, ApiMessage, ApiRegions, ApiState, ApiView,
    FileQueryParams,
};

use crate::{AppState, TOP_OFFENDERS};

/// `GET /api/test`
pub async fn test() -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage {
        message: "Backend is Connected and Working!".to_string(),
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/state`
pub async fn state(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = ApiState::from(&*state.dashboard());
    HttpResponse::Ok().json(snapshot)
}

/// `GET /api/view`
///
/// Returns the filtered, ranked table and its rollups.
pub async fn view(state: web::Data<AppState>) -> HttpResponse {
    let view = state.dashboard().view(state.settings.subsidy_per_child);
    HttpResponse::Ok().json(ApiView::from(view))
}

/// `GET /api/regions`
///
/// Returns every region's rollup over the whole store, ignoring filters.
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let (summaries, hovered) = {
        let dashboard = state.dashboard();
        (dashboard.region_summaries(), dashboard.hovered_summary())
    };
    let top = top_offenders(&summaries, TOP_OFFENDERS);

    HttpResponse::Ok().json(ApiRegions::new(summaries, top, hovered))
}

/// `POST /api/filters`
///
/// Applies every field present in the body, in field order, as one atomic
/// update.
pub async fn filters(
    state: web::Data<AppState>,
    body: web::Json<ApiFilterUpdate>,
) -> HttpResponse {
    let update = body.into_inner();
    let mut events = Vec::new();

    if let Some(search) = update.search {
        events.push(DashboardEvent::SearchChanged { search });
    }
    if let Some(region) = update.region {
        events.push(DashboardEvent::RegionSelected { region });
    }
    if let Some(threshold) = update.threshold {
        events.push(DashboardEvent::ThresholdChanged { threshold });
    }
    if let Some(region) = update.hovered_region {
        events.push(DashboardEvent::RegionHovered { region });
    }

    let next = state.apply_all(events);

    HttpResponse::Ok().json(ApiState::from(&next))
}

/// `POST /api/upload?fileName=`
///
/// Parses the CSV body locally. A file without usable rows is rejected and
/// the current store is kept.
pub async fn upload(
    state: web::Data<AppState>,
    params: web::Query<FileQueryParams>,
    body: web::Bytes,
) -> HttpResponse {
    let event = csv_event(&params.file_name, &body, &state.settings.ingest);

    if let DashboardEvent::CsvRejected { reason, .. } = &event {
        let error = ApiError {
            error: reason.clone(),
        };
        state.apply(event);
        return HttpResponse::UnprocessableEntity().json(error);
    }

    let next = state.apply(event);
    HttpResponse::Ok().json(ApiState::from(&next))
}

/// `POST /api/analyze?fileName=`
///
/// Forwards the body to the inference server and loads the scored records
/// it returns.
pub async fn analyze(
    state: web::Data<AppState>,
    params: web::Query<FileQueryParams>,
    body: web::Bytes,
) -> HttpResponse {
    let file_name = params.into_inner().file_name;

    state.apply(DashboardEvent::UploadStarted {
        file_name: file_name.clone(),
    });

    let result = state.inference.analyze(&file_name, body.to_vec()).await;
    let next = state.apply(inference_event(&file_name, result));

    let snapshot = ApiState::from(&next);
    if next.upload == UploadStatus::Failed {
        HttpResponse::BadGateway().json(snapshot)
    } else {
        HttpResponse::Ok().json(snapshot)
    }
}

/// `POST /api/insight`
///
/// Generates a strategy summary for the current filtered view. Always
/// answers with displayable text.
pub async fn insight(state: web::Data<AppState>) -> HttpResponse {
    let generating = state.apply(DashboardEvent::InsightRequested);
    let view = generating.view(state.settings.subsidy_per_child);

    let text = match &state.insight_provider {
        Some(provider) => generate_insight(provider.as_ref(), &view).await,
        None => {
            log::warn!("No LLM provider configured; returning fallback advisory");
            FALLBACK_ADVISORY.to_string()
        }
    };

    let next = state.apply(DashboardEvent::InsightReady { text });
    match next.insight {
        InsightState::Ready(text) => HttpResponse::Ok().json(ApiInsight { text }),
        other => {
            log::info!("Discarded insight: view changed during generation ({other:?})");
            HttpResponse::Conflict().json(ApiError {
                error: "The view changed while the insight was generated".to_string(),
            })
        }
    }
}

/// `POST /api/reset`
pub async fn reset(state: web::Data<AppState>) -> HttpResponse {
    let next = state.apply(DashboardEvent::ResetToMock);
    HttpResponse::Ok().json(ApiState::from(&next))
}
