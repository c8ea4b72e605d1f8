mod process;

pub use process::{spawn, TrackedProcess};

use crate::scheduler::RecordingJob;
use crate::web::config::SatelliteConfig;

/// Expand a satellite's capture command template for a concrete job.
///
/// Recognized placeholders: `{freq}`, `{rate}`, `{duration}` (seconds) and
/// `{job_id}`. Returns `None` when the satellite has no command configured;
/// the booking still exists, it just has nothing to execute.
pub fn build_capture_command(sat: &SatelliteConfig, job: &RecordingJob) -> Option<String> {
    let template = sat.command.as_deref()?;
    let duration = (job.end - job.start).num_seconds();

    Some(
        template
            .replace("{freq}", sat.frequency.as_deref().unwrap_or(""))
            .replace("{rate}", sat.samplerate.as_deref().unwrap_or(""))
            .replace("{duration}", &duration.to_string())
            .replace("{job_id}", &job.id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn job() -> RecordingJob {
        RecordingJob {
            id: "rec_25544_0".into(),
            sat_id: "25544".into(),
            name: "ISS".into(),
            start: Utc.timestamp_opt(0, 0).unwrap(),
            end: Utc.timestamp_opt(600, 0).unwrap(),
        }
    }

    #[test]
    fn expands_all_placeholders() {
        let sat = SatelliteConfig {
            name: "ISS".into(),
            reception_radius_km: 1500.0,
            frequency: Some("137.1M".into()),
            samplerate: Some("48k".into()),
            command: Some("rtl_fm -f {freq} -s {rate} -T {duration} -o {job_id}.raw".into()),
        };
        assert_eq!(
            build_capture_command(&sat, &job()).unwrap(),
            "rtl_fm -f 137.1M -s 48k -T 600 -o rec_25544_0.raw"
        );
    }

    #[test]
    fn no_template_means_nothing_to_run() {
        let sat = SatelliteConfig {
            name: "ISS".into(),
            reception_radius_km: 1500.0,
            frequency: None,
            samplerate: None,
            command: None,
        };
        assert!(build_capture_command(&sat, &job()).is_none());
    }
}
