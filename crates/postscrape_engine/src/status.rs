use std::mem;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use engine_logging::engine_info;
use postscrape_core::{update, Effect, JobKind, JobState, JobStatus, Msg, ProgressView};

/// Produces the `HH:MM:SS` stamp prefixed to every log line.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().format("%H:%M:%S").to_string())
}

/// Shared job state behind a single mutex.
///
/// Every mutation goes through [`postscrape_core::update`]; the lock is held
/// only for the swap, never across browser or network calls.
pub struct StatusStore {
    state: Mutex<JobState>,
    clock: Clock,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::with_clock(local_clock())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Mutex::new(JobState::new()),
            clock,
        }
    }

    /// Apply `msg` and return the resulting effects plus the new status.
    pub fn dispatch(&self, msg: Msg) -> (Vec<Effect>, JobStatus) {
        self.dispatch_with(|| msg)
    }

    /// `make` runs under the lock, so anything it reads is ordered with the write.
    fn dispatch_with(&self, make: impl FnOnce() -> Msg) -> (Vec<Effect>, JobStatus) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = mem::take(&mut *guard);
        let (next, effects) = update(current, make());
        let status = next.status();
        *guard = next;
        (effects, status)
    }

    /// Append `[HH:MM:SS] message` to the job log.
    pub fn push_log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        engine_info!("{message}");
        // Stamped inside the lock so stamps never run backwards in the log.
        self.dispatch_with(|| Msg::LogPushed(format!("[{}] {}", (self.clock)(), message)));
    }

    /// Mark `kind` as parked at its verification gate.
    pub fn park(&self, kind: JobKind) {
        self.dispatch(Msg::VerificationRequired(kind));
    }

    pub fn set_status(&self, status: JobStatus) {
        self.dispatch(Msg::StatusReported(status));
    }

    pub fn finish_run(&self, output_path: PathBuf) {
        self.dispatch(Msg::RunSucceeded { output_path });
    }

    pub fn status(&self) -> JobStatus {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status()
    }

    /// Copy of the current state; later mutations never show through.
    pub fn snapshot(&self) -> ProgressView {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .view()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
