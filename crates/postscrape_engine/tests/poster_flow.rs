mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{
    contains_line, init_logging, three_card_page, wait_until, MockLauncher, MockSite, Recorder,
    CHALLENGE_PAGE, HOME_PAGE,
};
use postscrape_core::{Credentials, Effect, JobKind, JobStatus, Msg, ScrapeRequest};
use postscrape_engine::{
    ContentError, ContentGenerator, CsvSink, EngineParts, JobContext, PostContent,
    PosterWorkflow, ScrapeController, ScrapeSettings, SelectorConfig, StatusStore,
    VerificationGate,
};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(10);

struct CannedGenerator;

#[async_trait]
impl ContentGenerator for CannedGenerator {
    async fn generate(&self, _topic: &str) -> Result<PostContent, ContentError> {
        Ok(PostContent {
            title: "Ship small, ship often".into(),
            description: "Every release teaches you something.".into(),
        })
    }
}

struct FailingGenerator;

#[async_trait]
impl ContentGenerator for FailingGenerator {
    async fn generate(&self, _topic: &str) -> Result<PostContent, ContentError> {
        Err(ContentError::Malformed)
    }
}

fn context() -> JobContext {
    JobContext::new(
        JobKind::Poster,
        Arc::new(StatusStore::new()),
        Arc::new(ScrapeSettings::default().without_delays()),
        Arc::new(SelectorConfig::default()),
    )
}

fn typed_text(recorder: &Recorder) -> Option<String> {
    recorder
        .scripts
        .iter()
        .find(|(script, _)| script.contains("innerText"))
        .and_then(|(_, args)| args.get(1))
        .and_then(|value| value.as_str())
        .map(String::from)
}

#[tokio::test]
async fn post_logs_in_generates_and_publishes() {
    init_logging();
    let launcher = MockLauncher::new(MockSite::with_pages(Vec::new()));
    let ctx = context();
    let mut workflow = PosterWorkflow::new(
        Arc::new(launcher.clone()),
        Some(Arc::new(CannedGenerator)),
        ctx.clone(),
    );

    let credentials = Credentials::new("me@example.com", "hunter2");
    workflow.generate_and_post(Some(&credentials), "shipping").await;

    let logs = ctx.status.snapshot().logs;
    assert!(contains_line(&logs, "Poster login: opening LinkedIn..."));
    assert!(contains_line(&logs, "Poster login complete."));
    assert!(contains_line(&logs, "Post: composer trigger clicked."));
    assert!(contains_line(&logs, "Post: Post button clicked."));
    assert!(workflow.has_session());

    let recorder = launcher.recorder.lock().unwrap();
    assert!(recorder
        .clicks
        .contains(&"button.share-actions__primary-action".to_string()));
    let text = typed_text(&recorder).unwrap();
    assert!(text.starts_with("Ship small, ship often\n\nEvery release teaches you something."));
    assert!(text.ends_with("#Ship #Small #Often"));
}

#[tokio::test]
async fn generator_failure_falls_back_to_local_copy() {
    init_logging();
    let launcher = MockLauncher::new(MockSite::with_pages(Vec::new()));
    let ctx = context();
    let mut workflow = PosterWorkflow::new(
        Arc::new(launcher.clone()),
        Some(Arc::new(FailingGenerator)),
        ctx.clone(),
    );

    let credentials = Credentials::new("me@example.com", "hunter2");
    workflow.login(&credentials).await;
    workflow.generate_and_post(None, "Consistency").await;

    let logs = ctx.status.snapshot().logs;
    assert!(contains_line(&logs, "OpenAI error, using fallback"));
    let recorder = launcher.recorder.lock().unwrap();
    let text = typed_text(&recorder).unwrap();
    assert!(text.starts_with("Consistency\n\nProgress is built on consistency"));
    assert!(text.ends_with("#Consistency"));
}

#[tokio::test]
async fn post_without_session_only_generates() {
    init_logging();
    let launcher = MockLauncher::new(MockSite::default());
    let ctx = context();
    let mut workflow = PosterWorkflow::new(Arc::new(launcher.clone()), None, ctx.clone());

    workflow.generate_and_post(None, "Focus").await;

    let logs = ctx.status.snapshot().logs;
    assert!(contains_line(&logs, "Post content ready: Focus"));
    assert!(contains_line(&logs, "No poster session is open"));
    assert_eq!(launcher.opens(), 0);
}

#[tokio::test]
async fn login_replaces_previous_session() {
    init_logging();
    let launcher = MockLauncher::new(MockSite::default());
    let ctx = context();
    let mut workflow = PosterWorkflow::new(Arc::new(launcher.clone()), None, ctx.clone());
    let credentials = Credentials::new("me@example.com", "hunter2");

    workflow.login(&credentials).await;
    workflow.login(&credentials).await;
    workflow.shutdown().await;
    workflow.shutdown().await;

    assert_eq!(launcher.opens(), 2);
    assert_eq!(launcher.closes(), 2);
    assert!(!workflow.has_session());
}

#[test]
fn controller_rejects_incomplete_poster_requests() {
    init_logging();
    let out = TempDir::new().unwrap();
    let launcher = MockLauncher::new(MockSite::default());
    let controller = ScrapeController::start(
        EngineParts::new(
            Arc::new(launcher.clone()),
            Arc::new(CsvSink::new(out.path().to_path_buf())),
        )
        .with_settings(ScrapeSettings::default().without_delays()),
    );

    assert_eq!(
        controller.poster_login(Credentials::new("me@example.com", "")),
        JobStatus::Error
    );
    assert_eq!(
        controller.poster_generate_and_post(Credentials::default(), "   "),
        JobStatus::Error
    );
    let logs = controller.progress().logs;
    assert!(contains_line(&logs, "Poster login missing email or password."));
    assert!(contains_line(&logs, "Poster missing title."));
    assert_eq!(launcher.opens(), 0);
}

#[test]
fn controller_runs_poster_commands_on_its_worker() {
    init_logging();
    let out = TempDir::new().unwrap();
    let launcher = MockLauncher::new(MockSite::default());
    let controller = ScrapeController::start(
        EngineParts::new(
            Arc::new(launcher.clone()),
            Arc::new(CsvSink::new(out.path().to_path_buf())),
        )
        .with_settings(ScrapeSettings::default().without_delays()),
    );

    let credentials = Credentials::new("me@example.com", "hunter2");
    assert_eq!(controller.poster_login(credentials.clone()), JobStatus::Running);
    assert!(wait_until(WAIT, || {
        let view = controller.progress();
        !view.poster_running && contains_line(&view.logs, "Poster login complete.")
    }));

    assert_eq!(
        controller.poster_generate_and_post(Credentials::default(), "Teamwork"),
        JobStatus::Running
    );
    assert!(wait_until(WAIT, || {
        let view = controller.progress();
        !view.poster_running && contains_line(&view.logs, "Post: Post button clicked.")
    }));
    assert_eq!(launcher.opens(), 1);
    assert_eq!(controller.progress().status, JobStatus::Idle);

    assert_eq!(launcher.closes(), 0);

    controller.shutdown();
    assert_eq!(launcher.closes(), 1);
}

#[test]
fn poster_parked_at_verification_outlives_a_finishing_scrape() {
    init_logging();
    let out = TempDir::new().unwrap();
    let hold = Arc::new(VerificationGate::new());
    let mut site = MockSite::with_pages(vec![three_card_page()])
        .with_login_sequence(&[HOME_PAGE, CHALLENGE_PAGE]);
    site.hold_search = Some(Arc::clone(&hold));
    let launcher = MockLauncher::new(site);
    let controller = ScrapeController::start(
        EngineParts::new(
            Arc::new(launcher.clone()),
            Arc::new(CsvSink::new(out.path().to_path_buf())),
        )
        .with_settings(ScrapeSettings::default().without_delays()),
    );

    let request = ScrapeRequest::new(Credentials::new("me@example.com", "hunter2"), "rust");
    assert_eq!(controller.start_scrape(request), JobStatus::Running);
    assert!(wait_until(WAIT, || contains_line(
        &controller.progress().logs,
        "Scraping page 1/1..."
    )));

    let credentials = Credentials::new("me@example.com", "hunter2");
    assert_eq!(controller.poster_login(credentials.clone()), JobStatus::Running);
    assert!(wait_until(WAIT, || controller.progress().poster_verification));
    assert_eq!(controller.progress().status, JobStatus::Running);

    hold.release();
    assert!(wait_until(WAIT, || controller.progress().status == JobStatus::Idle));
    let view = controller.progress();
    assert!(view.output_path.is_some());
    assert!(view.poster_running);
    assert!(view.awaiting_verification());

    assert_eq!(controller.resume_after_verification(), JobStatus::Idle);
    assert!(wait_until(WAIT, || {
        let view = controller.progress();
        !view.poster_running && contains_line(&view.logs, "Poster login complete.")
    }));
    assert!(!controller.progress().awaiting_verification());

    assert_eq!(controller.poster_login(credentials), JobStatus::Running);
    assert!(wait_until(WAIT, || !controller.progress().poster_running));
    // Scrape session, challenged poster session, then the fresh login.
    assert_eq!(launcher.opens(), 3);
    controller.shutdown();
}

#[tokio::test]
async fn poster_verification_uses_its_own_gate() {
    init_logging();
    let site = MockSite {
        after_login: CHALLENGE_PAGE.to_string(),
        ..MockSite::default()
    };
    let launcher = MockLauncher::new(site);
    let ctx = context();
    let status = Arc::clone(&ctx.status);
    let gate = Arc::clone(&ctx.gate);
    let mut workflow = PosterWorkflow::new(Arc::new(launcher), None, ctx);

    let credentials = Credentials::new("me@example.com", "hunter2");
    let login = tokio::spawn(async move {
        workflow.login(&credentials).await;
        workflow
    });

    let parked = tokio::time::timeout(WAIT, async {
        while !status.snapshot().poster_verification {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(parked.is_ok());
    assert_eq!(status.status(), JobStatus::Idle);

    let (effects, _) = status.dispatch(Msg::ResumeRequested);
    assert_eq!(effects, vec![Effect::ReleaseVerification(JobKind::Poster)]);
    gate.release();

    let workflow = login.await.unwrap();
    assert!(workflow.has_session());
    assert!(contains_line(&status.snapshot().logs, "Poster login complete."));
}
