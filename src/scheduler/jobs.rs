use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("unschedulable duration: {0} seconds")]
    InvalidDuration(i64),
}

/// A recording booking against the shared receiver.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordingJob {
    pub id: String,
    pub sat_id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Deterministic job id. Requesting the same (satellite, start) pair twice
/// produces the same id, which is what makes propose a toggle.
pub fn job_id(sat_id: &str, start: DateTime<Utc>) -> String {
    format!("rec_{}_{}", sat_id, start.timestamp_millis())
}

/// Result of a propose call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposeOutcome {
    /// The job was inserted.
    Scheduled(RecordingJob),
    /// An existing booking overlaps the requested interval. Nothing was
    /// changed; the caller must explicitly resolve the conflict (cancel the
    /// carried job) and retry.
    Conflict(RecordingJob),
    /// The exact same job was already booked; the call cancelled it.
    Cancelled(RecordingJob),
}

/// Authoritative set of recording jobs for the single shared receiver.
///
/// Invariant: no two jobs have overlapping [start, end) intervals. Callers
/// that mirror this set (UI views) must re-fetch after every mutation; the
/// mirrors are never authoritative.
///
/// The scheduler itself is not synchronized. Shared access goes through one
/// `Mutex` so that the overlap scan and the insert/remove of a call form a
/// single critical section.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    jobs: HashMap<String, RecordingJob>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book, toggle off, or report a conflict for a recording slot.
    ///
    /// Never evicts another booking on its own: a conflicting job is returned
    /// to the caller, who decides whether to discard it via
    /// [`resolve_conflict`](Self::resolve_conflict) and retry.
    ///
    /// A non-positive duration, or one whose end would fall outside the
    /// representable datetime range, is rejected as `InvalidDuration`. The
    /// toggle check runs first, so an existing booking can always be toggled
    /// off whatever duration the request carries.
    pub fn propose(
        &mut self,
        sat_id: &str,
        name: &str,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Result<ProposeOutcome, SchedulerError> {
        let id = job_id(sat_id, start);

        if let Some(existing) = self.jobs.remove(&id) {
            log::info!("recording {} toggled off", existing.id);
            return Ok(ProposeOutcome::Cancelled(existing));
        }

        if duration <= Duration::zero() {
            return Err(SchedulerError::InvalidDuration(duration.num_seconds()));
        }
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| SchedulerError::InvalidDuration(duration.num_seconds()))?;

        if let Some(conflicting) = self.find_overlap(start, end) {
            return Ok(ProposeOutcome::Conflict(conflicting.clone()));
        }

        let job = RecordingJob {
            id: id.clone(),
            sat_id: sat_id.to_string(),
            name: name.to_string(),
            start,
            end,
        };
        log::info!("recording {} scheduled ({} - {})", job.id, job.start, job.end);
        self.jobs.insert(id, job.clone());
        Ok(ProposeOutcome::Scheduled(job))
    }

    /// Remove a booking. Idempotent from the caller's perspective: a missing
    /// id is reported, not fatal, and cancelling never waits on the external
    /// capture process actually stopping.
    pub fn cancel(&mut self, job_id: &str) -> Result<RecordingJob, SchedulerError> {
        self.jobs
            .remove(job_id)
            .ok_or_else(|| SchedulerError::NotFound(job_id.to_string()))
    }

    /// The sanctioned first step of replacing a conflicting booking: remove
    /// the job `propose` reported as conflicting, then retry the propose.
    /// Kept as a distinct operation so that discarding prior work is always
    /// an explicit, attributable call.
    pub fn resolve_conflict(&mut self, job_id: &str) -> Result<RecordingJob, SchedulerError> {
        self.cancel(job_id)
    }

    /// All current jobs, in no guaranteed order.
    pub fn list(&self) -> Vec<RecordingJob> {
        self.jobs.values().cloned().collect()
    }

    pub fn get(&self, job_id: &str) -> Option<&RecordingJob> {
        self.jobs.get(job_id)
    }

    /// The job with the earliest start time that has not yet ended at `now`.
    /// Used by the capture runner to plan its next wakeup.
    pub fn next_job(&self, now: DateTime<Utc>) -> Option<RecordingJob> {
        self.jobs
            .values()
            .filter(|j| j.end > now)
            .min_by_key(|j| j.start)
            .cloned()
    }

    fn find_overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<&RecordingJob> {
        // [s1, e1) and [s2, e2) overlap iff s1 < e2 && s2 < e1.
        self.jobs
            .values()
            .find(|j| start < j.end && j.start < end)
    }
}
