//! # Run Handles
//!
//! A [`RunHandle`] represents one playbook run. The spawner hands the
//! matching [`RunReporter`] to whatever learns the exit status (the child
//! waiter thread for PTY runs), and the event loop polls the handle.
//!
//! ```text
//! Idle ──submit──▶ Running ──exit 0──▶ Succeeded
//!                     │ └────exit ≠ 0─▶ Failed
//!                     └──cancel─────▶ Cancelled
//! ```

use anyhow::{Context, Result};
use portable_pty::{ChildKiller, MasterPty};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Status of a playbook run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Nothing has been run yet
    Idle,
    /// The command is running
    Running,
    /// The command exited with code 0
    Succeeded,
    /// The command could not run or exited with a non-zero code
    Failed,
    /// The operator cancelled the run
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ExecutionStatus::Idle => "idle",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }
}

/// Write side of a run's shared state
#[derive(Clone)]
pub struct RunReporter {
    status: Arc<Mutex<ExecutionStatus>>,
    exit_code: Arc<Mutex<Option<i32>>>,
    error: Arc<Mutex<Option<String>>>,
    finished_at: Arc<Mutex<Option<Instant>>>,
    cancel_requested: Arc<AtomicBool>,
}

impl RunReporter {
    /// Record the exit code of the finished command.
    pub fn finish(&self, code: i32) {
        if let Ok(mut ec) = self.exit_code.lock() {
            *ec = Some(code);
        }
        let status = if self.cancel_requested.load(Ordering::SeqCst) {
            ExecutionStatus::Cancelled
        } else if code == 0 {
            ExecutionStatus::Succeeded
        } else {
            ExecutionStatus::Failed
        };
        self.set_finished(status);
    }

    /// Record that the command could not be waited on.
    pub fn fail(&self, message: impl Into<String>) {
        if let Ok(mut e) = self.error.lock() {
            *e = Some(message.into());
        }
        let status = if self.cancel_requested.load(Ordering::SeqCst) {
            ExecutionStatus::Cancelled
        } else {
            ExecutionStatus::Failed
        };
        self.set_finished(status);
    }

    fn set_finished(&self, status: ExecutionStatus) {
        if let Ok(mut f) = self.finished_at.lock() {
            *f = Some(Instant::now());
        }
        if let Ok(mut s) = self.status.lock() {
            *s = status;
        }
    }
}

/// A playbook run in flight
pub struct RunHandle {
    /// The command line being run, as shown to the operator
    pub command_line: String,
    pub started_at: Instant,
    reporter: RunReporter,
    killer: Option<Box<dyn ChildKiller + Send + Sync>>,
    // Keep the PTY master alive until the run is dropped
    _master: Option<Arc<Mutex<Option<Box<dyn MasterPty + Send>>>>>,
}

impl RunHandle {
    /// Create a running handle and the reporter that completes it.
    pub fn new(command_line: impl Into<String>) -> (Self, RunReporter) {
        let reporter = RunReporter {
            status: Arc::new(Mutex::new(ExecutionStatus::Running)),
            exit_code: Arc::new(Mutex::new(None)),
            error: Arc::new(Mutex::new(None)),
            finished_at: Arc::new(Mutex::new(None)),
            cancel_requested: Arc::new(AtomicBool::new(false)),
        };
        let handle = Self {
            command_line: command_line.into(),
            started_at: Instant::now(),
            reporter: reporter.clone(),
            killer: None,
            _master: None,
        };
        (handle, reporter)
    }

    /// Attach the killer used by [`RunHandle::cancel`].
    pub fn with_killer(mut self, killer: Box<dyn ChildKiller + Send + Sync>) -> Self {
        self.killer = Some(killer);
        self
    }

    pub(crate) fn with_master(
        mut self,
        master: Arc<Mutex<Option<Box<dyn MasterPty + Send>>>>,
    ) -> Self {
        self._master = Some(master);
        self
    }

    pub fn poll_status(&self) -> ExecutionStatus {
        self.reporter
            .status
            .lock()
            .map(|s| *s)
            .unwrap_or(ExecutionStatus::Failed)
    }

    pub fn poll_exit_code(&self) -> Option<i32> {
        self.reporter.exit_code.lock().ok().and_then(|ec| *ec)
    }

    /// Message recorded when the command could not be waited on
    pub fn error_message(&self) -> Option<String> {
        self.reporter.error.lock().ok().and_then(|e| e.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.poll_status().is_finished()
    }

    pub fn cancel_requested(&self) -> bool {
        self.reporter.cancel_requested.load(Ordering::SeqCst)
    }

    /// Time since start, frozen once the run has finished
    pub fn elapsed(&self) -> Duration {
        let finished = self.reporter.finished_at.lock().ok().and_then(|f| *f);
        match finished {
            Some(end) => end.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }

    /// Ask the running command to stop.
    ///
    /// The run reaches [`ExecutionStatus::Cancelled`] once the child has
    /// actually exited.
    pub fn cancel(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        // Set before signalling so the waiter sees it when the child exits
        self.reporter.cancel_requested.store(true, Ordering::SeqCst);
        if let Some(killer) = self.killer.as_mut() {
            if let Err(e) = killer.kill() {
                self.reporter.cancel_requested.store(false, Ordering::SeqCst);
                return Err(e).context("Failed to signal playbook process");
            }
        }
        Ok(())
    }
}
