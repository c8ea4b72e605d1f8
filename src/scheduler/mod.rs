mod jobs;
pub mod runner;

pub use jobs::{job_id, ProposeOutcome, RecordingJob, RecordingScheduler, SchedulerError};
pub use runner::CaptureRunner;
