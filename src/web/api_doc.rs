use utoipa::OpenApi;

use super::api::{ephemeris, error::ErrorResponse, passes, recording};

#[derive(OpenApi)]
#[openapi(
    paths(
        ephemeris::status,
        ephemeris::get_ephemeris,
        ephemeris::replace_ephemeris,
        ephemeris::position,
        passes::list_passes,
        recording::record,
        recording::list_scheduled,
        recording::cancel_scheduled,
    ),
    components(
        schemas(
            ErrorResponse,
            ephemeris::StatusResponse,
            ephemeris::WindowSummary,
            ephemeris::LoadResponse,
            ephemeris::PositionResponse,
            passes::PassesResponse,
            recording::RecordRequest,
            recording::RecordResponse,
            recording::ScheduledResponse,
            crate::ephemeris::RawWindow,
            crate::ephemeris::SatelliteMeta,
            crate::ephemeris::LocatedPosition,
            crate::passes::Pass,
            crate::scheduler::RecordingJob,
        )
    ),
    info(
        title = "Satwatch API",
        description = "Pass prediction and recording scheduling for a single shared receiver",
        version = "0.1.0"
    ),
    tags(
        (name = "ephemeris", description = "Position samples and interpolation"),
        (name = "passes", description = "Visibility window prediction"),
        (name = "recording", description = "Recording job scheduling")
    )
)]
pub struct ApiDoc;
