use std::{
    fs::OpenOptions,
    io,
    path::Path,
    process::{Child, Command as StdCommand, Stdio},
    sync::{Arc, Mutex},
    thread,
};

/// Handle to a running capture process. Dropping the handle does not stop
/// the process; call [`kill`](TrackedProcess::kill) for that.
pub struct TrackedProcess {
    child: Arc<Mutex<Option<Child>>>,
}

impl TrackedProcess {
    /// Best-effort termination. The process may already have exited, which
    /// is not an error.
    pub fn kill(&self) {
        let mut guard = self.child.lock().unwrap();
        if let Some(mut child) = guard.take() {
            if let Err(e) = child.kill() {
                log::warn!("failed to kill capture process: {}", e);
            }
            let _ = child.wait();
        }
    }
}

/// Launch a capture command, teeing its output to per-job log files under
/// `artifacts_dir`. A monitor thread reaps the child and logs its exit.
pub fn spawn(cmd: &str, job_id: &str, artifacts_dir: &Path) -> io::Result<TrackedProcess> {
    std::fs::create_dir_all(artifacts_dir)?;
    let stdout_path = artifacts_dir.join(format!("{}_stdout.log", job_id));
    let stderr_path = artifacts_dir.join(format!("{}_stderr.log", job_id));

    let stdout_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&stdout_path)?;

    let stderr_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&stderr_path)?;

    log::info!("executing capture for {}: {}", job_id, cmd);

    let child = StdCommand::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()?;

    log::info!("capture {} spawned (PID: {})", job_id, child.id());

    let child_arc = Arc::new(Mutex::new(Some(child)));
    let monitor_arc = child_arc.clone();
    let job = job_id.to_string();

    thread::spawn(move || monitor(monitor_arc, job));

    Ok(TrackedProcess { child: child_arc })
}

fn monitor(child_arc: Arc<Mutex<Option<Child>>>, job_id: String) {
    loop {
        // Hold the lock only briefly to check status.
        let result = {
            let mut guard = child_arc.lock().unwrap();
            match &mut *guard {
                Some(child) => child.try_wait(),
                // Taken by kill().
                None => return,
            }
        };

        match result {
            Ok(Some(status)) => {
                let exit_code = status.code().unwrap_or(-1);
                if exit_code == 0 {
                    log::info!("capture {} completed", job_id);
                } else {
                    log::error!("capture {} exited with code {}", job_id, exit_code);
                }
                child_arc.lock().unwrap().take();
                return;
            }
            Ok(None) => {
                thread::sleep(std::time::Duration::from_millis(100));
            }
            Err(e) => {
                log::error!("capture {} wait error: {}", job_id, e);
                return;
            }
        }
    }
}
