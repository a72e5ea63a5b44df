use crate::{Effect, JobKind, JobState, JobStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: JobState, msg: Msg) -> (JobState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested(request) => {
            if state.status().is_busy() {
                return (state, Vec::new());
            }
            state.begin_run();
            let missing = request.missing_fields();
            if missing.is_empty() {
                vec![Effect::SpawnScrape(request)]
            } else {
                state.set_status(JobStatus::Error);
                vec![Effect::RejectScrape { missing }]
            }
        }
        Msg::ResumeRequested => {
            // Release every parked job; flags flip now so a second resume is a no-op.
            let mut released = Vec::new();
            if state.status() == JobStatus::Verification {
                state.set_status(JobStatus::Running);
                released.push(Effect::ReleaseVerification(JobKind::Scrape));
            }
            if state.poster_verification() {
                state.set_poster_verification(false);
                released.push(Effect::ReleaseVerification(JobKind::Poster));
            }
            released
        }
        Msg::VerificationRequired(JobKind::Scrape) => {
            state.set_status(JobStatus::Verification);
            Vec::new()
        }
        Msg::VerificationRequired(JobKind::Poster) => {
            state.set_poster_verification(true);
            Vec::new()
        }
        Msg::LogPushed(line) => {
            state.push_log(line);
            Vec::new()
        }
        Msg::StatusReported(status) => {
            state.set_status(status);
            Vec::new()
        }
        Msg::RunSucceeded { output_path } => {
            state.finish_run(output_path);
            Vec::new()
        }
        Msg::PosterLoginRequested(credentials) => {
            if !credentials.is_complete() {
                vec![Effect::RejectPoster {
                    reason: "Poster login missing email or password.".to_string(),
                }]
            } else if state.poster_running() {
                Vec::new()
            } else {
                state.set_poster_running(true);
                vec![Effect::SpawnPosterLogin(credentials)]
            }
        }
        Msg::PosterPostRequested { credentials, topic } => {
            let topic = topic.trim().to_string();
            if topic.is_empty() {
                vec![Effect::RejectPoster {
                    reason: "Poster missing title.".to_string(),
                }]
            } else if state.poster_running() {
                Vec::new()
            } else {
                state.set_poster_running(true);
                let credentials = credentials.is_complete().then_some(credentials);
                vec![Effect::SpawnPosterPost { credentials, topic }]
            }
        }
        Msg::PosterFinished => {
            state.set_poster_running(false);
            state.set_poster_verification(false);
            Vec::new()
        }
    };

    (state, effects)
}
