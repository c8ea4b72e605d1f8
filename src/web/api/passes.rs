use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::passes::{detect_passes, Pass};
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PassesQuery {
    /// Overrides the configured minimum elevation, in degrees.
    #[serde(default)]
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesResponse {
    pub passes: Vec<Pass>,
}

#[utoipa::path(
    get,
    path = "/api/passes",
    tag = "passes",
    params(
        ("min_elevation" = Option<f64>, Query, description = "Minimum elevation override (degrees)")
    ),
    responses(
        (status = 200, description = "Upcoming passes, sorted by start time", body = PassesResponse),
        (status = 503, description = "No ephemeris loaded")
    )
)]
pub async fn list_passes(
    State(state): State<AppState>,
    Query(query): Query<PassesQuery>,
) -> ApiResult<impl IntoResponse> {
    let min_elevation = query
        .min_elevation
        .unwrap_or(state.config.tracking.min_elevation_deg);

    let window = state.window.read().await;
    if window.is_empty() {
        return Err(ApiError::NoWindow);
    }

    let passes = detect_passes(&window, &state.config.station_location(), min_elevation);
    Ok(Json(PassesResponse { passes }))
}
