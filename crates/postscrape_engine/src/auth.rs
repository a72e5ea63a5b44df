use std::sync::Arc;

use engine_logging::engine_debug;
use postscrape_core::Credentials;
use tokio::time::sleep;

use crate::config::SelectorConfig;
use crate::driver::SessionDriver;
use crate::job::JobContext;
use crate::types::{DriverError, JobError};

pub const VERIFICATION_INSTRUCTION: &str =
    "Verification required. Enter the code in the LinkedIn window, then click 'Continue' in the app.";

/// Submit the login form. No success check is made afterwards; a wrong
/// password surfaces later as missing results.
pub async fn authenticate(
    driver: &mut dyn SessionDriver,
    credentials: &Credentials,
    ctx: &JobContext,
) -> Result<(), DriverError> {
    let selectors = &ctx.selectors;
    driver.navigate(&ctx.settings.login_url).await?;
    sleep(ctx.settings.login_settle).await;
    driver.fill(&selectors.login_username, &credentials.email).await?;
    driver
        .fill(&selectors.login_password, credentials.secret.expose())
        .await?;
    driver.click(&selectors.login_submit).await?;
    sleep(ctx.settings.submit_settle).await;
    ctx.log("Login attempt complete.");
    Ok(())
}

/// True on the first code-input selector that matches, else on the first
/// heading containing a verification keyword.
pub async fn detect_verification_challenge(
    driver: &mut dyn SessionDriver,
    selectors: &SelectorConfig,
) -> Result<bool, DriverError> {
    for selector in &selectors.verification_inputs {
        if driver.exists(selector).await? {
            engine_debug!("Verification input matched {selector:?}");
            return Ok(true);
        }
    }
    let headings = driver.query(&selectors.verification_headings).await?;
    Ok(headings.iter().any(|heading| {
        let lowered = heading.to_lowercase();
        selectors
            .verification_keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }))
}

/// Park the job until an operator resumes, if a challenge is showing.
///
/// Each attempt re-arms this job kind's own gate before the parked flag is
/// published, so a resume that arrives right after is never lost and a
/// release left over from an earlier attempt never counts.
pub async fn handle_verification(
    driver: &mut dyn SessionDriver,
    ctx: &JobContext,
) -> Result<(), JobError> {
    if !detect_verification_challenge(driver, &ctx.selectors).await? {
        return Ok(());
    }
    ctx.gate.arm();
    ctx.status.park(ctx.kind);
    ctx.log(VERIFICATION_INSTRUCTION);

    let gate = Arc::clone(&ctx.gate);
    tokio::task::spawn_blocking(move || gate.wait())
        .await
        .map_err(|err| JobError::Interrupted(err.to_string()))?;

    ctx.log("Verification acknowledged, continuing.");
    sleep(ctx.settings.verification_settle).await;
    Ok(())
}

/// Authenticate, then clear a verification challenge if one appears.
pub async fn login(
    driver: &mut dyn SessionDriver,
    credentials: &Credentials,
    ctx: &JobContext,
) -> Result<(), JobError> {
    authenticate(driver, credentials, ctx).await?;
    handle_verification(driver, ctx).await
}
