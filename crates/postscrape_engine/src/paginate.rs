use postscrape_core::{page_url, ResultRow};
use serde_json::json;
use tokio::time::{sleep, Instant};
use url::Url;

use crate::driver::SessionDriver;
use crate::extract::extract_cards;
use crate::job::JobContext;
use crate::types::DriverError;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight * arguments[0]);";

/// Poll for any known result layout until the configured timeout.
///
/// Returns whether results showed up; a timeout is logged, never fatal.
pub async fn wait_for_results(
    driver: &mut dyn SessionDriver,
    ctx: &JobContext,
) -> Result<bool, DriverError> {
    let deadline = Instant::now() + ctx.settings.results_timeout;
    loop {
        for selector in &ctx.selectors.result_containers {
            if driver.exists(selector).await? {
                return Ok(true);
            }
        }
        if Instant::now() >= deadline {
            ctx.log("No results detected yet; continuing.");
            return Ok(false);
        }
        sleep(ctx.settings.results_poll).await;
    }
}

pub async fn scroll_once(
    driver: &mut dyn SessionDriver,
    ctx: &JobContext,
) -> Result<(), DriverError> {
    driver
        .execute(SCROLL_SCRIPT, vec![json!(ctx.settings.scroll_fraction)])
        .await?;
    sleep(ctx.settings.scroll_settle).await;
    Ok(())
}

/// Load one results page and extract its cards.
pub async fn scrape_page(
    driver: &mut dyn SessionDriver,
    ctx: &JobContext,
    base: &Url,
    page: u32,
) -> Result<Vec<ResultRow>, DriverError> {
    driver.navigate(&page_url(base, page)).await?;
    wait_for_results(driver, ctx).await?;
    scroll_once(driver, ctx).await?;

    let source = driver.page_source().await?;
    let extraction = extract_cards(&source, &ctx.selectors);
    if extraction.cards_found == 0 {
        ctx.log("No post cards found on this page.");
    }
    for _ in 0..extraction.skipped {
        ctx.log("Skipped a card (no author/snippet/link detected).");
    }
    ctx.log(format!("Page {page}: {} posts captured.", extraction.rows.len()));
    Ok(extraction.rows)
}

/// Visit pages `1..=page_limit` strictly in order, concatenating rows.
pub async fn paginate(
    driver: &mut dyn SessionDriver,
    ctx: &JobContext,
    base: &Url,
    page_limit: u32,
) -> Result<Vec<ResultRow>, DriverError> {
    let mut rows = Vec::new();
    for page in 1..=page_limit {
        ctx.log(format!("Scraping page {page}/{page_limit}..."));
        rows.extend(scrape_page(driver, ctx, base, page).await?);
    }
    Ok(rows)
}
