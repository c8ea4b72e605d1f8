use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::executor::{self, build_capture_command};
use crate::web::config::Config;

use super::jobs::{RecordingJob, RecordingScheduler};

/// How often the runner re-reads the job set while idle or waiting, so that
/// newly proposed or cancelled jobs are noticed promptly.
const POLL_INTERVAL: StdDuration = StdDuration::from_secs(5);
/// Granularity of the cancellation check while a capture is running.
const RUN_CHECK_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// Background worker that executes scheduled recordings.
///
/// The runner only reads the authoritative job set through the shared mutex;
/// it never bypasses the scheduler's conflict rules. On natural completion it
/// removes the finished booking, returning the job id to ABSENT.
pub struct CaptureRunner {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl CaptureRunner {
    pub fn spawn(scheduler: Arc<Mutex<RecordingScheduler>>, config: Arc<Config>) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_loop(scheduler, config, stop_rx));
        Self { stop_tx, join }
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

async fn run_loop(
    scheduler: Arc<Mutex<RecordingScheduler>>,
    config: Arc<Config>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        let next = scheduler.lock().await.next_job(Utc::now());

        let Some(job) = next else {
            if wait_or_stop(POLL_INTERVAL, &mut stop_rx).await {
                return;
            }
            continue;
        };

        let until_start = (job.start - Utc::now()).to_std().unwrap_or_default();
        if until_start > POLL_INTERVAL {
            // Still far out; keep polling so an earlier proposal can preempt.
            if wait_or_stop(POLL_INTERVAL, &mut stop_rx).await {
                return;
            }
            continue;
        }

        if wait_or_stop(until_start, &mut stop_rx).await {
            return;
        }

        // The booking may have been toggled off while we slept.
        if scheduler.lock().await.get(&job.id).is_none() {
            continue;
        }

        if execute_job(&scheduler, &config, &job, &mut stop_rx).await {
            return;
        }
    }
}

/// Run one job to completion (or cancellation/stop). Returns true when the
/// runner should shut down.
async fn execute_job(
    scheduler: &Arc<Mutex<RecordingScheduler>>,
    config: &Arc<Config>,
    job: &RecordingJob,
    stop_rx: &mut oneshot::Receiver<()>,
) -> bool {
    let process = config
        .satellites
        .get(&job.sat_id)
        .and_then(|sat| build_capture_command(sat, job))
        .and_then(|cmd| {
            match executor::spawn(&cmd, &job.id, &config.recording.artifacts_dir) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::error!("failed to launch capture for {}: {}", job.id, e);
                    None
                }
            }
        });

    if process.is_none() {
        log::warn!("job {} has no runnable capture command", job.id);
    }

    let mut stopped = false;
    while Utc::now() < job.end {
        if scheduler.lock().await.get(&job.id).is_none() {
            // Cancelled mid-recording: removal already happened, stopping the
            // capture is our best-effort side of the contract.
            log::info!("job {} cancelled while recording", job.id);
            if let Some(p) = &process {
                p.kill();
            }
            return false;
        }
        if wait_or_stop(RUN_CHECK_INTERVAL, stop_rx).await {
            stopped = true;
            break;
        }
    }

    if let Some(p) = &process {
        // The capture command normally exits on its own at the configured
        // duration; this only reaps stragglers.
        p.kill();
    }

    // Natural completion: the booking record is removed, the id is free
    // again. A concurrent cancel may already have removed it.
    if let Ok(done) = scheduler.lock().await.cancel(&job.id) {
        log::info!("job {} completed", done.id);
    }

    stopped
}

/// Sleep for `duration`, returning true if the stop signal fired first.
async fn wait_or_stop(duration: StdDuration, stop_rx: &mut oneshot::Receiver<()>) -> bool {
    tokio::select! {
        _ = sleep(duration) => false,
        _ = stop_rx => true,
    }
}
