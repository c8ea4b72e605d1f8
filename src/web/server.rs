use axum::{routing::delete, routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ephemeris::EphemerisWindow;
use crate::scheduler::{CaptureRunner, RecordingScheduler};

use super::api::{ephemeris as ephemeris_handlers, passes as pass_handlers, recording as recording_handlers};
use super::api_doc::ApiDoc;
use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Current ephemeris snapshot, replaced wholesale on reload.
    pub window: Arc<RwLock<EphemerisWindow>>,
    /// Authoritative job set. One lock covers each propose/cancel call end
    /// to end, so concurrent proposals cannot both pass the overlap check.
    pub scheduler: Arc<Mutex<RecordingScheduler>>,
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let initial_window = match &config.tracking.ephemeris_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(payload) => match EphemerisWindow::from_json(&payload) {
                Ok((window, skipped)) => {
                    if skipped > 0 {
                        log::warn!("preloaded ephemeris dropped {} malformed samples", skipped);
                    }
                    window
                }
                Err(e) => {
                    log::error!("failed to parse {}: {}", path.display(), e);
                    EphemerisWindow::default()
                }
            },
            Err(e) => {
                log::error!("failed to read {}: {}", path.display(), e);
                EphemerisWindow::default()
            }
        },
        None => EphemerisWindow::default(),
    };

    let state = AppState {
        config: Arc::new(config),
        window: Arc::new(RwLock::new(initial_window)),
        scheduler: Arc::new(Mutex::new(RecordingScheduler::new())),
    };

    let runner = CaptureRunner::spawn(state.scheduler.clone(), state.config.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/status", get(ephemeris_handlers::status))
        .route(
            "/api/ephemeris",
            get(ephemeris_handlers::get_ephemeris).post(ephemeris_handlers::replace_ephemeris),
        )
        .route("/api/position", get(ephemeris_handlers::position))
        .route("/api/passes", get(pass_handlers::list_passes))
        .route("/api/record", post(recording_handlers::record))
        .route("/api/scheduled", get(recording_handlers::list_scheduled))
        .route(
            "/api/scheduled/{job_id}",
            delete(recording_handlers::cancel_scheduled),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let result = axum::serve(listener, app).await;

    runner.stop().await;
    result
}
