use crate::{Credentials, JobKind, RequiredField, ScrapeRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SpawnScrape(ScrapeRequest),
    RejectScrape { missing: Vec<RequiredField> },
    ReleaseVerification(JobKind),
    SpawnPosterLogin(Credentials),
    SpawnPosterPost {
        credentials: Option<Credentials>,
        topic: String,
    },
    RejectPoster { reason: String },
}
