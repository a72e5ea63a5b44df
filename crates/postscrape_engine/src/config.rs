use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub const FEED_URL: &str = "https://www.linkedin.com/feed/";

/// Timing and output knobs for scrape and poster jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    pub login_url: String,
    pub feed_url: String,
    /// Pause after opening the login page.
    pub login_settle: Duration,
    /// Pause after submitting credentials.
    pub submit_settle: Duration,
    /// Pause after the operator resumes a verification challenge.
    pub verification_settle: Duration,
    pub results_timeout: Duration,
    pub results_poll: Duration,
    /// Fraction of the page height scrolled before extraction.
    pub scroll_fraction: f64,
    pub scroll_settle: Duration,
    /// Upper bound for locating each composer element.
    pub composer_timeout: Duration,
    pub composer_settle: Duration,
    pub output_dir: PathBuf,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.to_string(),
            feed_url: FEED_URL.to_string(),
            login_settle: Duration::from_secs(2),
            submit_settle: Duration::from_secs(3),
            verification_settle: Duration::from_millis(1500),
            results_timeout: Duration::from_secs(12),
            results_poll: Duration::from_millis(500),
            scroll_fraction: 2.0 / 3.0,
            scroll_settle: Duration::from_millis(1500),
            composer_timeout: Duration::from_secs(8),
            composer_settle: Duration::from_millis(1500),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ScrapeSettings {
    /// Same knobs with every pause and wait set to zero.
    pub fn without_delays(mut self) -> Self {
        for duration in [
            &mut self.login_settle,
            &mut self.submit_settle,
            &mut self.verification_settle,
            &mut self.results_timeout,
            &mut self.results_poll,
            &mut self.scroll_settle,
            &mut self.composer_timeout,
            &mut self.composer_settle,
        ] {
            *duration = Duration::ZERO;
        }
        self
    }
}

/// Where a field selector is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryScope {
    #[default]
    Card,
    Document,
}

/// One step of an ordered fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSelector {
    pub selector: String,
    #[serde(default)]
    pub scope: QueryScope,
}

impl FieldSelector {
    pub fn card(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            scope: QueryScope::Card,
        }
    }
}

/// Every CSS selector and keyword the jobs depend on.
///
/// Defaults track the current LinkedIn markup; any subset can be overridden
/// from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub login_username: String,
    pub login_password: String,
    pub login_submit: String,
    pub verification_inputs: Vec<String>,
    pub verification_headings: String,
    pub verification_keywords: Vec<String>,
    pub result_containers: Vec<String>,
    pub cards: Vec<String>,
    pub fallback_cards: Vec<String>,
    pub author: Vec<FieldSelector>,
    pub posted_at: Vec<FieldSelector>,
    pub description: Vec<FieldSelector>,
    pub post_anchor: String,
    pub composer_trigger: Vec<String>,
    pub composer_editor: Vec<String>,
    pub composer_submit: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn chain(values: &[&str]) -> Vec<FieldSelector> {
    values.iter().map(|value| FieldSelector::card(value)).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            login_username: "#username".to_string(),
            login_password: "#password".to_string(),
            login_submit: "button[type='submit']".to_string(),
            verification_inputs: owned(&[
                "input#input__email_verification_pin",
                "input[name='pin']",
                "input[autocomplete='one-time-code']",
                "input[placeholder*='code']",
            ]),
            verification_headings: "h1, h2".to_string(),
            verification_keywords: owned(&["verification", "security check", "enter code"]),
            result_containers: owned(&[
                "div.feed-shared-update-v2",
                "li.reusable-search__result-container",
                "div.reusable-search__result-container",
                "div.search-reusables__entry",
                "article",
            ]),
            cards: owned(&[
                "div.feed-shared-update-v2",
                "li.reusable-search__result-container",
                "div.reusable-search__result-container",
                "div.search-reusables__entry",
            ]),
            fallback_cards: owned(&["article"]),
            author: chain(&[
                "span.update-components-actor__title span[dir='ltr']",
                "span.entity-result__title-text a span[dir='ltr']",
                "span.feed-shared-actor__name",
                "a.app-aware-link[href*='/in/'] span[aria-hidden='true']",
            ]),
            posted_at: chain(&[
                "span.update-components-actor__sub-description span.visually-hidden",
                "span.update-components-actor__sub-description",
                "span.feed-shared-actor__sub-description span.visually-hidden",
                "span.feed-shared-actor__sub-description",
            ]),
            description: chain(&[
                "div.feed-shared-update-v2__description-wrapper span[dir='ltr']",
                "div.feed-shared-text-view span[dir='ltr']",
                "div.entity-result__summary span[dir='ltr']",
                "div.update-components-text span[dir='ltr']",
                "span.break-words",
            ]),
            post_anchor: "a[href]".to_string(),
            composer_trigger: owned(&[
                "button.share-box-feed-entry__trigger",
                "button[data-control-name='sharebox_trigger']",
                "button[aria-label*='Start a post']",
                "button[aria-label*='Create a post']",
                "div[role='button'][aria-label*='Start a post']",
                "div[role='button'][aria-label*='Create a post']",
            ]),
            composer_editor: owned(&[
                "div.ql-editor",
                "div.share-box__text-editor",
                "div.editor-content",
                "div[role='textbox']",
            ]),
            composer_submit: owned(&[
                "button.share-actions__primary-action",
                "button[data-control-name='share_post']",
                "button[aria-label*='Post']",
                "div[role='button'][aria-label='Post']",
            ]),
        }
    }
}
