use std::path::PathBuf;

use serde::Serialize;

use crate::JobStatus;

/// Polling read of the job state: `{logs, status, outputPath}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub logs: Vec<String>,
    pub status: JobStatus,
    pub output_path: Option<PathBuf>,
    pub poster_running: bool,
    pub poster_verification: bool,
}

impl ProgressView {
    /// Some job is parked until the operator resumes.
    pub fn awaiting_verification(&self) -> bool {
        self.status == JobStatus::Verification || self.poster_verification
    }
}
