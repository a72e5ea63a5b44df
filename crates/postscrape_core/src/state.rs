use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::view_model::ProgressView;

/// Externally visible status of the scrape job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Verification,
    Error,
}

impl JobStatus {
    /// A job is in flight while running or parked at the verification gate.
    pub fn is_busy(self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Verification)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Running => "running",
            JobStatus::Verification => "verification",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which worker a verification pause belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Scrape,
    Poster,
}

/// Process-wide job state. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    status: JobStatus,
    logs: Vec<String>,
    output_path: Option<PathBuf>,
    poster_running: bool,
    /// Tracked apart from `status`, which belongs to the scrape job.
    poster_verification: bool,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn poster_running(&self) -> bool {
        self.poster_running
    }

    pub fn poster_verification(&self) -> bool {
        self.poster_verification
    }

    /// Snapshot copy for pollers; never a live reference.
    pub fn view(&self) -> ProgressView {
        ProgressView {
            logs: self.logs.clone(),
            status: self.status,
            output_path: self.output_path.clone(),
            poster_running: self.poster_running,
            poster_verification: self.poster_verification,
        }
    }

    pub(crate) fn begin_run(&mut self) {
        self.logs.clear();
        self.output_path = None;
        self.status = JobStatus::Running;
    }

    pub(crate) fn push_log(&mut self, line: String) {
        self.logs.push(line);
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }

    pub(crate) fn finish_run(&mut self, output_path: PathBuf) {
        self.output_path = Some(output_path);
        self.status = JobStatus::Idle;
    }

    pub(crate) fn set_poster_running(&mut self, running: bool) {
        self.poster_running = running;
    }

    pub(crate) fn set_poster_verification(&mut self, waiting: bool) {
        self.poster_verification = waiting;
    }
}
