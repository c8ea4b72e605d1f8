use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scheduler::{job_id, ProposeOutcome, RecordingJob};
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordRequest {
    pub sat_id: String,
    pub start_time: DateTime<Utc>,
    /// Recording length in seconds. Zero is treated as a plain cancellation
    /// request for the (sat_id, start_time) slot.
    pub duration_secs: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<RecordingJob>,
    /// The existing booking blocking this proposal. Cancel it explicitly
    /// (DELETE /api/scheduled/{id}) and retry to replace it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_with: Option<RecordingJob>,
}

#[utoipa::path(
    post,
    path = "/api/record",
    tag = "recording",
    request_body = RecordRequest,
    responses(
        (status = 200, description = "Job scheduled or toggled off", body = RecordResponse),
        (status = 409, description = "Proposal overlaps an existing booking", body = RecordResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Cancellation for a job that does not exist")
    )
)]
pub async fn record(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.duration_secs < 0 {
        return Err(ApiError::Validation("duration must not be negative".into()));
    }
    // Duration::seconds panics past i64::MAX milliseconds; reject instead.
    let duration = Duration::try_seconds(req.duration_secs)
        .ok_or_else(|| ApiError::Validation("duration out of range".into()))?;

    let name = state.config.satellite_name(&req.sat_id);
    let mut scheduler = state.scheduler.lock().await;

    // Explicit cancellation path, matching the dashboard's duration-zero
    // convention.
    if req.duration_secs == 0 {
        let removed = scheduler.cancel(&job_id(&req.sat_id, req.start_time))?;
        return Ok((
            StatusCode::OK,
            Json(RecordResponse {
                status: "cancelled".into(),
                job: Some(removed),
                conflict_with: None,
            }),
        ));
    }

    let outcome = scheduler.propose(&req.sat_id, &name, req.start_time, duration)?;

    let (code, response) = match outcome {
        ProposeOutcome::Scheduled(job) => (
            StatusCode::OK,
            RecordResponse {
                status: "scheduled".into(),
                job: Some(job),
                conflict_with: None,
            },
        ),
        ProposeOutcome::Cancelled(job) => (
            StatusCode::OK,
            RecordResponse {
                status: "cancelled".into(),
                job: Some(job),
                conflict_with: None,
            },
        ),
        ProposeOutcome::Conflict(existing) => (
            StatusCode::CONFLICT,
            RecordResponse {
                status: "conflict".into(),
                job: None,
                conflict_with: Some(existing),
            },
        ),
    };

    Ok((code, Json(response)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledResponse {
    /// Current bookings, sorted by start time for display.
    pub jobs: Vec<RecordingJob>,
}

#[utoipa::path(
    get,
    path = "/api/scheduled",
    tag = "recording",
    responses((status = 200, description = "All scheduled recordings", body = ScheduledResponse))
)]
pub async fn list_scheduled(State(state): State<AppState>) -> Json<ScheduledResponse> {
    let mut jobs = state.scheduler.lock().await.list();
    jobs.sort_by_key(|j| j.start);
    Json(ScheduledResponse { jobs })
}

#[utoipa::path(
    delete,
    path = "/api/scheduled/{job_id}",
    tag = "recording",
    params(("job_id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Booking removed", body = RecordingJob),
        (status = 404, description = "No such job")
    )
)]
pub async fn cancel_scheduled(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.scheduler.lock().await.cancel(&job_id)?;
    log::info!("recording {} cancelled", removed.id);
    Ok(Json(removed))
}
