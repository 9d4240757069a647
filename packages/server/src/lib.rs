#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the audit dashboard.
//!
//! Holds a single [`DashboardState`] behind a lock and exposes it as a REST
//! API: derived views are recomputed per request, and every mutation goes
//! through the dashboard reducer. Uploads are either parsed locally or
//! forwarded to the remote inference server; strategy summaries are
//! generated by whichever LLM provider is configured.

mod handlers;

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::Utc;
use vigil_aadhaar_ai::providers::{LlmProvider, create_provider_from_env};
use vigil_aadhaar_dashboard::{DashboardEvent, DashboardSettings, DashboardState, reduce};
use vigil_aadhaar_inference::{InferenceClient, InferenceError};

/// Largest request body accepted by the upload endpoints.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Number of regions listed as top offenders.
pub const TOP_OFFENDERS: usize = 5;

/// Shared application state.
pub struct AppState {
    dashboard: RwLock<DashboardState>,
    /// Subsidy and ingestion settings.
    pub settings: DashboardSettings,
    /// Client for the remote inference server.
    pub inference: InferenceClient,
    /// Provider for strategy summaries; `None` when no credentials are set.
    pub insight_provider: Option<Box<dyn LlmProvider>>,
}

impl AppState {
    /// Creates the application state around the built-in dataset.
    #[must_use]
    pub fn new(
        settings: DashboardSettings,
        inference: InferenceClient,
        insight_provider: Option<Box<dyn LlmProvider>>,
    ) -> Self {
        Self {
            dashboard: RwLock::new(DashboardState::default()),
            settings,
            inference,
            insight_provider,
        }
    }

    /// Builds the application state from environment variables.
    ///
    /// A missing LLM configuration is not an error: insight requests then
    /// return the fallback advisory.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if the inference HTTP client cannot be
    /// built.
    pub fn from_env() -> Result<Self, InferenceError> {
        let settings = DashboardSettings::from_env();
        let inference = InferenceClient::from_env()?;
        let insight_provider = match create_provider_from_env() {
            Ok(provider) => {
                log::info!("Strategy summaries via {}", provider.name());
                Some(provider)
            }
            Err(e) => {
                log::warn!("Strategy summaries disabled: {e}");
                None
            }
        };

        Ok(Self::new(settings, inference, insight_provider))
    }

    /// Read access to the current dashboard state.
    pub fn dashboard(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.dashboard.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `event` and returns a copy of the resulting state.
    ///
    /// The lock is held only for the duration of the reduction.
    pub fn apply(&self, event: DashboardEvent) -> DashboardState {
        self.apply_all([event])
    }

    /// Applies `events` in order under a single write lock, so readers never
    /// observe a partially applied batch.
    pub fn apply_all(&self, events: impl IntoIterator<Item = DashboardEvent>) -> DashboardState {
        let mut guard = self
            .dashboard
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        let next = events
            .into_iter()
            .fold(guard.clone(), |state, event| reduce(&state, event, now));
        *guard = next.clone();
        next
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .service(
            web::scope("/api")
                .route("/test", web::get().to(handlers::test))
                .route("/health", web::get().to(handlers::health))
                .route("/state", web::get().to(handlers::state))
                .route("/view", web::get().to(handlers::view))
                .route("/regions", web::get().to(handlers::regions))
                .route("/filters", web::post().to(handlers::filters))
                .route("/upload", web::post().to(handlers::upload))
                .route("/analyze", web::post().to(handlers::analyze))
                .route("/insight", web::post().to(handlers::insight))
                .route("/reset", web::post().to(handlers::reset)),
        );
}

/// Starts the audit dashboard API server.
///
/// Reads its configuration from the environment and binds to
/// `BIND_ADDR:PORT`. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initialises logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the inference client cannot be
/// built, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_env().map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!(
        "Inference server at {}",
        state.inference.analyze_url()
    );
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
