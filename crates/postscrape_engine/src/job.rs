use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_error, engine_warn};
use postscrape_core::{
    build_keywords, build_search_url, JobKind, JobStatus, ResultRow, ScrapeRequest,
};

use crate::auth;
use crate::config::{ScrapeSettings, SelectorConfig};
use crate::driver::{SessionDriver, SessionLauncher};
use crate::gate::VerificationGate;
use crate::paginate::paginate;
use crate::sink::ResultSink;
use crate::status::StatusStore;
use crate::types::JobError;

/// Handles one job kind needs. The status store is shared; the gate belongs
/// to this job kind alone.
#[derive(Clone)]
pub struct JobContext {
    pub kind: JobKind,
    pub status: Arc<StatusStore>,
    pub gate: Arc<VerificationGate>,
    pub settings: Arc<ScrapeSettings>,
    pub selectors: Arc<SelectorConfig>,
}

impl JobContext {
    pub fn new(
        kind: JobKind,
        status: Arc<StatusStore>,
        settings: Arc<ScrapeSettings>,
        selectors: Arc<SelectorConfig>,
    ) -> Self {
        Self {
            kind,
            status,
            gate: Arc::new(VerificationGate::new()),
            settings,
            selectors,
        }
    }

    pub fn log(&self, message: impl AsRef<str>) {
        self.status.push_log(message);
    }
}

/// One scrape run from login to result file.
pub struct ScrapeJob {
    launcher: Arc<dyn SessionLauncher>,
    sink: Arc<dyn ResultSink>,
    ctx: JobContext,
}

impl ScrapeJob {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        sink: Arc<dyn ResultSink>,
        ctx: JobContext,
    ) -> Self {
        Self { launcher, sink, ctx }
    }

    /// Run to completion. Never returns an error: failures end as an
    /// `error` status plus a log line.
    pub async fn run(&self, request: ScrapeRequest) {
        match self.execute(&request).await {
            Ok(path) => {
                self.ctx.log(format!("Done. Saved to {}", path.display()));
                self.ctx.status.finish_run(path);
            }
            Err(err) => {
                engine_error!("Scrape failed: {err:?}");
                self.ctx.log(format!("Error: {err}"));
                self.ctx.status.set_status(JobStatus::Error);
            }
        }
    }

    async fn execute(&self, request: &ScrapeRequest) -> Result<PathBuf, JobError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(JobError::MissingRequiredField(missing));
        }

        let mut driver = self.launcher.open().await?;
        let collected = self.collect(driver.as_mut(), request).await;
        if let Err(err) = driver.close().await {
            engine_warn!("Closing browser session failed: {err}");
        }
        // Rows are held in memory until here; a failure above discards them.
        let rows = collected?;

        self.ctx
            .log(format!("Collected {} posts. Writing CSV...", rows.len()));
        Ok(self.sink.write(&rows)?)
    }

    async fn collect(
        &self,
        driver: &mut dyn SessionDriver,
        request: &ScrapeRequest,
    ) -> Result<Vec<ResultRow>, JobError> {
        auth::login(driver, &request.credentials, &self.ctx).await?;

        let query = build_keywords(&request.search_term, &request.filters);
        let base = build_search_url(request);
        self.ctx.log(format!("Using posts query: {query}"));

        Ok(paginate(driver, &self.ctx, &base, request.page_limit).await?)
    }
}
