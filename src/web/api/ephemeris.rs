use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ephemeris::{locate, EphemerisWindow, LocatedPosition, RawWindow};
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub station_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub min_elevation_deg: f64,
    pub window: Option<WindowSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WindowSummary {
    pub satellite_count: usize,
    pub sample_count: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn summarize(window: &EphemerisWindow) -> Option<WindowSummary> {
    let (start, end) = window.span()?;
    Some(WindowSummary {
        satellite_count: window.tracks().count(),
        sample_count: window.tracks().map(|(_, t)| t.samples.len()).sum(),
        start,
        end,
    })
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "ephemeris",
    responses((status = 200, description = "Station status", body = StatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let window = state.window.read().await;
    Json(StatusResponse {
        station_name: state.config.station.name.clone(),
        latitude: state.config.station.latitude,
        longitude: state.config.station.longitude,
        min_elevation_deg: state.config.tracking.min_elevation_deg,
        window: summarize(&window),
    })
}

#[utoipa::path(
    get,
    path = "/api/ephemeris",
    tag = "ephemeris",
    responses(
        (status = 200, description = "Summary of the loaded window", body = WindowSummary),
        (status = 503, description = "No ephemeris loaded")
    )
)]
pub async fn get_ephemeris(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let window = state.window.read().await;
    let summary = summarize(&window).ok_or(ApiError::NoWindow)?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoadResponse {
    pub summary: WindowSummary,
    /// Malformed samples dropped during ingestion.
    pub skipped: usize,
}

#[utoipa::path(
    post,
    path = "/api/ephemeris",
    tag = "ephemeris",
    request_body = RawWindow,
    responses(
        (status = 200, description = "Window replaced", body = LoadResponse),
        (status = 422, description = "Payload rejected")
    )
)]
pub async fn replace_ephemeris(
    State(state): State<AppState>,
    Json(raw): Json<RawWindow>,
) -> ApiResult<impl IntoResponse> {
    let (new_window, skipped) = EphemerisWindow::from_raw(raw)?;
    let summary = summarize(&new_window).ok_or(ApiError::Validation("empty window".into()))?;

    // Wholesale replacement; the old snapshot drops once readers let go.
    *state.window.write().await = new_window;
    log::info!(
        "ephemeris window replaced: {} satellites, {} samples",
        summary.satellite_count,
        summary.sample_count
    );

    Ok(Json(LoadResponse { summary, skipped }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionQuery {
    pub sat_id: String,
    /// Query instant (RFC3339). Defaults to now.
    pub t: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PositionResponse {
    pub sat_id: String,
    pub t: DateTime<Utc>,
    /// Absent when `t` is outside the loaded window; the caller should
    /// request a re-centered window rather than treat this as an error.
    pub position: Option<LocatedPosition>,
}

#[utoipa::path(
    get,
    path = "/api/position",
    tag = "ephemeris",
    params(
        ("sat_id" = String, Query, description = "Satellite identifier"),
        ("t" = Option<String>, Query, description = "Query instant (RFC3339), default now")
    ),
    responses(
        (status = 200, description = "Interpolated position (null when out of window)", body = PositionResponse),
        (status = 404, description = "Unknown satellite"),
        (status = 503, description = "No ephemeris loaded")
    )
)]
pub async fn position(
    State(state): State<AppState>,
    Query(query): Query<PositionQuery>,
) -> ApiResult<impl IntoResponse> {
    let t = query.t.unwrap_or_else(Utc::now);
    let window = state.window.read().await;
    if window.is_empty() {
        return Err(ApiError::NoWindow);
    }
    let track = window.track(&query.sat_id).ok_or(ApiError::NotFound)?;

    Ok(Json(PositionResponse {
        sat_id: query.sat_id,
        t,
        position: locate(&track.samples, t),
    }))
}
