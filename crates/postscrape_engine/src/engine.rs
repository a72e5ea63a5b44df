use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use engine_logging::{engine_error, engine_info};
use postscrape_core::{Credentials, Effect, JobKind, JobStatus, Msg, ProgressView, ScrapeRequest};

use crate::config::{ScrapeSettings, SelectorConfig};
use crate::content::ContentGenerator;
use crate::driver::SessionLauncher;
use crate::gate::VerificationGate;
use crate::job::{JobContext, ScrapeJob};
use crate::poster::PosterWorkflow;
use crate::sink::ResultSink;
use crate::status::StatusStore;
use crate::types::JobError;

enum ScrapeCommand {
    Run(ScrapeRequest),
}

enum PosterCommand {
    Login(Credentials),
    Post {
        credentials: Option<Credentials>,
        topic: String,
    },
}

/// Collaborators and knobs needed to start the engine.
pub struct EngineParts {
    pub launcher: Arc<dyn SessionLauncher>,
    pub sink: Arc<dyn ResultSink>,
    pub generator: Option<Arc<dyn ContentGenerator>>,
    pub settings: ScrapeSettings,
    pub selectors: SelectorConfig,
    pub status: Arc<StatusStore>,
}

impl EngineParts {
    pub fn new(launcher: Arc<dyn SessionLauncher>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            launcher,
            sink,
            generator: None,
            settings: ScrapeSettings::default(),
            selectors: SelectorConfig::default(),
            status: Arc::new(StatusStore::new()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_settings(mut self, settings: ScrapeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_selectors(mut self, selectors: SelectorConfig) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_status_store(mut self, status: Arc<StatusStore>) -> Self {
        self.status = status;
        self
    }
}

/// Job control surface. Each job kind runs on its own long-lived worker
/// thread; calls here only touch the status store and return immediately.
pub struct ScrapeController {
    status: Arc<StatusStore>,
    scrape_gate: Arc<VerificationGate>,
    poster_gate: Arc<VerificationGate>,
    scrape_tx: mpsc::Sender<ScrapeCommand>,
    poster_tx: mpsc::Sender<PosterCommand>,
    workers: Vec<JoinHandle<()>>,
}

impl ScrapeController {
    pub fn start(parts: EngineParts) -> Self {
        let settings = Arc::new(parts.settings);
        let selectors = Arc::new(parts.selectors);
        let scrape_ctx = JobContext::new(
            JobKind::Scrape,
            Arc::clone(&parts.status),
            Arc::clone(&settings),
            Arc::clone(&selectors),
        );
        let poster_ctx =
            JobContext::new(JobKind::Poster, Arc::clone(&parts.status), settings, selectors);
        let scrape_gate = Arc::clone(&scrape_ctx.gate);
        let poster_gate = Arc::clone(&poster_ctx.gate);

        let job = ScrapeJob::new(Arc::clone(&parts.launcher), parts.sink, scrape_ctx);
        let workflow = PosterWorkflow::new(parts.launcher, parts.generator, poster_ctx);

        let (scrape_tx, scrape_worker) = spawn_scrape_worker(job, Arc::clone(&parts.status));
        let (poster_tx, poster_worker) = spawn_poster_worker(workflow, Arc::clone(&parts.status));

        Self {
            status: parts.status,
            scrape_gate,
            poster_gate,
            scrape_tx,
            poster_tx,
            workers: vec![scrape_worker, poster_worker],
        }
    }

    /// Start a scrape unless one is in flight. Returns the resulting status.
    pub fn start_scrape(&self, request: ScrapeRequest) -> JobStatus {
        let (effects, status) = self.status.dispatch(Msg::StartRequested(request));
        match self.run_effects(effects) {
            JobStatus::Error => JobStatus::Error,
            _ => status,
        }
    }

    /// Release every job parked at its verification gate. No-op otherwise.
    pub fn resume_after_verification(&self) -> JobStatus {
        let (effects, status) = self.status.dispatch(Msg::ResumeRequested);
        self.run_effects(effects);
        status
    }

    pub fn progress(&self) -> ProgressView {
        self.status.snapshot()
    }

    pub fn poster_login(&self, credentials: Credentials) -> JobStatus {
        let (effects, _) = self.status.dispatch(Msg::PosterLoginRequested(credentials));
        self.run_effects(effects)
    }

    pub fn poster_generate_and_post(
        &self,
        credentials: Credentials,
        topic: impl Into<String>,
    ) -> JobStatus {
        let (effects, _) = self.status.dispatch(Msg::PosterPostRequested {
            credentials,
            topic: topic.into(),
        });
        self.run_effects(effects)
    }

    /// Close the worker channels and wait for both workers to exit.
    ///
    /// A scrape in flight runs to completion first; the poster session is
    /// closed. A job parked at verification is released so it can finish.
    pub fn shutdown(self) {
        let Self {
            scrape_gate,
            poster_gate,
            scrape_tx,
            poster_tx,
            workers,
            ..
        } = self;
        drop(scrape_tx);
        drop(poster_tx);
        scrape_gate.release();
        poster_gate.release();
        for worker in workers {
            if worker.join().is_err() {
                engine_error!("Worker thread panicked during shutdown");
            }
        }
    }

    /// Execute effects; returns `Error` if any request was rejected.
    fn run_effects(&self, effects: Vec<Effect>) -> JobStatus {
        let mut reply = JobStatus::Running;
        for effect in effects {
            match effect {
                Effect::SpawnScrape(request) => {
                    self.status.push_log("Preparing the browser and logging in...");
                    if self.scrape_tx.send(ScrapeCommand::Run(request)).is_err() {
                        engine_error!("Scrape worker is gone");
                        self.status.push_log("Error: scrape worker is not running.");
                        self.status.set_status(JobStatus::Error);
                        reply = JobStatus::Error;
                    }
                }
                Effect::RejectScrape { missing } => {
                    self.status
                        .push_log(JobError::MissingRequiredField(missing).to_string());
                    reply = JobStatus::Error;
                }
                Effect::ReleaseVerification(kind) => {
                    self.status
                        .push_log("Continue clicked. Resuming after manual verification.");
                    match kind {
                        JobKind::Scrape => self.scrape_gate.release(),
                        JobKind::Poster => self.poster_gate.release(),
                    }
                }
                Effect::SpawnPosterLogin(credentials) => {
                    self.send_poster(PosterCommand::Login(credentials), &mut reply);
                }
                Effect::SpawnPosterPost { credentials, topic } => {
                    self.send_poster(PosterCommand::Post { credentials, topic }, &mut reply);
                }
                Effect::RejectPoster { reason } => {
                    self.status.push_log(reason);
                    reply = JobStatus::Error;
                }
            }
        }
        reply
    }

    fn send_poster(&self, command: PosterCommand, reply: &mut JobStatus) {
        if self.poster_tx.send(command).is_err() {
            engine_error!("Poster worker is gone");
            self.status.push_log("Poster error: worker is not running.");
            self.status.dispatch(Msg::PosterFinished);
            *reply = JobStatus::Error;
        }
    }
}

fn spawn_scrape_worker(
    job: ScrapeJob,
    status: Arc<StatusStore>,
) -> (mpsc::Sender<ScrapeCommand>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        while let Ok(command) = cmd_rx.recv() {
            match command {
                ScrapeCommand::Run(request) => {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        runtime.block_on(job.run(request))
                    }));
                    if outcome.is_err() {
                        engine_error!("Scrape job panicked");
                        status.push_log("Error: scrape job stopped unexpectedly.");
                        status.set_status(JobStatus::Error);
                    }
                }
            }
        }
        engine_info!("Scrape worker stopped");
    });
    (cmd_tx, worker)
}

fn spawn_poster_worker(
    mut workflow: PosterWorkflow,
    status: Arc<StatusStore>,
) -> (mpsc::Sender<PosterCommand>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        while let Ok(command) = cmd_rx.recv() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                runtime.block_on(async {
                    match command {
                        PosterCommand::Login(credentials) => workflow.login(&credentials).await,
                        PosterCommand::Post { credentials, topic } => {
                            workflow
                                .generate_and_post(credentials.as_ref(), &topic)
                                .await
                        }
                    }
                })
            }));
            if outcome.is_err() {
                engine_error!("Poster job panicked");
                status.push_log("Poster error: job stopped unexpectedly.");
            }
            status.dispatch(Msg::PosterFinished);
        }
        runtime.block_on(workflow.shutdown());
        engine_info!("Poster worker stopped");
    });
    (cmd_tx, worker)
}
