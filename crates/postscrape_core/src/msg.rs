use std::path::PathBuf;

use crate::{Credentials, JobKind, JobStatus, ScrapeRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// UI asked for a new scrape run.
    StartRequested(ScrapeRequest),
    /// UI reports that the human finished the verification step.
    ResumeRequested,
    /// A job hit a verification challenge and is about to park.
    VerificationRequired(JobKind),
    /// Job appended an already timestamped log line.
    LogPushed(String),
    /// Plain status overwrite; no transition validation.
    StatusReported(JobStatus),
    /// Result file written; the run ends successfully.
    RunSucceeded { output_path: PathBuf },
    /// UI asked the poster workflow to log in.
    PosterLoginRequested(Credentials),
    /// UI asked the poster workflow to generate and publish a post.
    PosterPostRequested {
        credentials: Credentials,
        topic: String,
    },
    /// Poster worker finished its current command.
    PosterFinished,
}
