use std::fmt;

use postscrape_core::RequiredField;
use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("element not found: {0}")]
    ElementMissing(String),
    #[error("script failed: {0}")]
    Script(String),
    #[error("browser session already closed")]
    Closed,
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Top-level failure of one job. Everything that aborts a run ends up here.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("browser unavailable: {0}")]
    DriverUnavailable(String),
    #[error("Missing required fields: {}", MissingList(.0))]
    MissingRequiredField(Vec<RequiredField>),
    #[error(transparent)]
    Driver(DriverError),
    #[error("could not write results: {0}")]
    Sink(#[from] SinkError),
    #[error("interrupted: {0}")]
    Interrupted(String),
}

impl From<DriverError> for JobError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Unavailable(message) => JobError::DriverUnavailable(message),
            other => JobError::Driver(other),
        }
    }
}

struct MissingList<'a>(&'a [RequiredField]);

impl fmt::Display for MissingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_as_list() {
        let err =
            JobError::MissingRequiredField(vec![RequiredField::Email, RequiredField::SearchTerm]);
        assert_eq!(err.to_string(), "Missing required fields: email, search term");
    }

    #[test]
    fn unavailable_driver_maps_to_fatal_job_error() {
        let err: JobError = DriverError::Unavailable("no chrome".into()).into();
        assert!(matches!(err, JobError::DriverUnavailable(_)));
    }
}
