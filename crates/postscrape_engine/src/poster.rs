use std::sync::Arc;

use engine_logging::engine_warn;
use postscrape_core::Credentials;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};

use crate::auth;
use crate::content::{compose_post_text, fallback_content, ContentGenerator, PostContent};
use crate::driver::{SessionDriver, SessionLauncher};
use crate::job::JobContext;
use crate::types::{DriverError, JobError};

const INJECT_TEXT_SCRIPT: &str = "\
const el = document.querySelector(arguments[0]);
if (!el) { return false; }
el.focus();
el.innerText = arguments[1];
el.dispatchEvent(new InputEvent('input', { bubbles: true }));
return true;";

/// Poster session: logs in, generates post copy and publishes it.
///
/// The browser session outlives individual commands so a later post can reuse
/// an earlier login.
pub struct PosterWorkflow {
    launcher: Arc<dyn SessionLauncher>,
    generator: Option<Arc<dyn ContentGenerator>>,
    ctx: JobContext,
    session: Option<Box<dyn SessionDriver>>,
}

impl PosterWorkflow {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        generator: Option<Arc<dyn ContentGenerator>>,
        ctx: JobContext,
    ) -> Self {
        Self {
            launcher,
            generator,
            ctx,
            session: None,
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Replace any open session with a freshly authenticated one.
    pub async fn login(&mut self, credentials: &Credentials) {
        self.shutdown().await;
        if let Err(err) = self.ensure_logged_in(credentials).await {
            self.ctx.log(format!("Poster login error: {err}"));
        }
    }

    pub async fn generate_and_post(&mut self, credentials: Option<&Credentials>, topic: &str) {
        if let Err(err) = self.try_generate_and_post(credentials, topic).await {
            self.ctx.log(format!("Poster post error: {err}"));
        }
    }

    pub async fn shutdown(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.close().await {
                engine_warn!("Closing poster session failed: {err}");
            }
        }
    }

    async fn ensure_logged_in(&mut self, credentials: &Credentials) -> Result<(), JobError> {
        if self.session.is_none() {
            self.session = Some(self.launcher.open().await?);
        }
        self.ctx.log("Poster login: opening LinkedIn...");
        if let Some(driver) = self.session.as_deref_mut() {
            auth::login(driver, credentials, &self.ctx).await?;
        }
        self.ctx.log("Poster login complete.");
        Ok(())
    }

    async fn try_generate_and_post(
        &mut self,
        credentials: Option<&Credentials>,
        topic: &str,
    ) -> Result<(), JobError> {
        if let Some(credentials) = credentials {
            self.ensure_logged_in(credentials).await?;
        }
        let content = self.generate(topic).await;
        self.ctx
            .log(format!("Post content ready: {}", content.title));

        match self.session.as_deref_mut() {
            Some(driver) => publish(driver, &compose_post_text(&content), &self.ctx).await,
            None => {
                self.ctx
                    .log("No poster session is open; log in to publish the post.");
                Ok(())
            }
        }
    }

    async fn generate(&self, topic: &str) -> PostContent {
        let Some(generator) = &self.generator else {
            return fallback_content(topic);
        };
        match generator.generate(topic).await {
            Ok(content) => content,
            Err(err) => {
                self.ctx
                    .log(format!("OpenAI error, using fallback: {err}"));
                fallback_content(topic)
            }
        }
    }
}

/// Open the feed composer, type `text` and submit it.
pub async fn publish(
    driver: &mut dyn SessionDriver,
    text: &str,
    ctx: &JobContext,
) -> Result<(), JobError> {
    driver.navigate(&ctx.settings.feed_url).await?;
    sleep(ctx.settings.login_settle).await;

    ctx.log("Post: feed opened, searching composer trigger...");
    let trigger = first_present(driver, &ctx.selectors.composer_trigger, ctx)
        .await?
        .ok_or_else(|| DriverError::ElementMissing("post composer trigger".into()))?;
    driver.click(&trigger).await?;
    ctx.log("Post: composer trigger clicked.");
    sleep(ctx.settings.composer_settle).await;

    ctx.log("Post: searching editor...");
    let editor = first_present(driver, &ctx.selectors.composer_editor, ctx)
        .await?
        .ok_or_else(|| DriverError::ElementMissing("post editor".into()))?;
    driver.click(&editor).await?;
    let injected = driver
        .execute(INJECT_TEXT_SCRIPT, vec![json!(editor), json!(text)])
        .await?;
    if injected != Value::Bool(true) {
        driver.fill(&editor, text).await?;
    }
    ctx.log("Post: content entered.");

    ctx.log("Post: searching Post button...");
    let submit = first_present(driver, &ctx.selectors.composer_submit, ctx)
        .await?
        .ok_or_else(|| DriverError::ElementMissing("Post button".into()))?;
    driver.click(&submit).await?;
    ctx.log("Post: Post button clicked.");
    sleep(ctx.settings.composer_settle).await;
    Ok(())
}

/// First selector that matches within the composer timeout, tried in order.
async fn first_present(
    driver: &mut dyn SessionDriver,
    selectors: &[String],
    ctx: &JobContext,
) -> Result<Option<String>, DriverError> {
    for selector in selectors {
        let deadline = Instant::now() + ctx.settings.composer_timeout;
        loop {
            if driver.exists(selector).await? {
                return Ok(Some(selector.clone()));
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(ctx.settings.results_poll).await;
        }
    }
    Ok(None)
}
