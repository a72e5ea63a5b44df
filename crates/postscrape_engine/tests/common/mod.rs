#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use postscrape_engine::{
    DriverError, SessionDriver, SessionLauncher, VerificationGate,
};
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub const LOGIN_PAGE: &str = r#"<html><body>
  <form>
    <input id="username"><input id="password" type="password">
    <button type="submit">Sign in</button>
  </form>
</body></html>"#;

pub const HOME_PAGE: &str = "<html><body><h1>Welcome back</h1></body></html>";

pub const CHALLENGE_PAGE: &str = r#"<html><body>
  <h1>Let's do a quick security check</h1>
  <input name="pin" autocomplete="one-time-code">
</body></html>"#;

/// Challenge announced only by a heading; there is no code input to match.
pub const HEADING_CHALLENGE_PAGE: &str = r#"<html><body>
  <h2>SeCuRiTy Check</h2>
  <p>We sent a code to your phone.</p>
</body></html>"#;

pub const FEED_PAGE: &str = r#"<html><body>
  <button class="share-box-feed-entry__trigger">Start a post</button>
  <div class="ql-editor" contenteditable="true"></div>
  <button class="share-actions__primary-action">Post</button>
</body></html>"#;

pub fn post_card(activity: u64, author: &str, body_html: &str, href: &str) -> String {
    format!(
        r#"<div class="feed-shared-update-v2" data-urn="urn:li:activity:{activity}">
  <span class="update-components-actor__title"><span dir="ltr">{author}</span></span>
  <span class="update-components-actor__sub-description"><span class="visually-hidden">2 days ago</span>2d</span>
  <div class="update-components-text"><span dir="ltr">{body_html}</span></div>
  <a class="app-aware-link" href="{href}">View post</a>
</div>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!(
        "<html><body><main class=\"search-results\">{}</main></body></html>",
        cards.join("\n")
    )
}

pub fn three_card_page() -> String {
    results_page(&[
        post_card(
            1001,
            "Jane Doe",
            "We are hiring!<br>Position: Senior Rust Engineer<br>Location: Berlin<br>Full-time, hybrid",
            "/posts/jane-doe_hiring-activity-1001?utm_source=share",
        ),
        post_card(
            1002,
            "Omar Khan",
            "Backend developer needed<br>Remote<br>Contact: jobs@example.com",
            "/feed/update/urn:li:activity:1002/?trk=x",
        ),
        post_card(
            1003,
            "Li Wei",
            "Internship opening<br>Skills: Python, SQL<br>Salary $1,000 - $1,500",
            "https://www.linkedin.com/in/liwei?mini=true",
        ),
    ])
}

/// Everything the mock browser observed, shared across sessions.
#[derive(Debug, Default)]
pub struct Recorder {
    pub opens: usize,
    pub closes: usize,
    pub navigations: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub clicks: Vec<String>,
    pub scripts: Vec<(String, Vec<Value>)>,
}

/// Canned responses keyed by URL shape.
#[derive(Clone, Default)]
pub struct MockSite {
    pub after_login: String,
    /// Result pages by page number, starting at 1.
    pub pages: Vec<String>,
    pub fail_on: Option<String>,
    /// Blocks the first search navigation until released.
    pub hold_search: Option<Arc<VerificationGate>>,
    /// Post-login pages handed out one per opened session, in order.
    /// Sessions opened after it runs dry land on `after_login`.
    pub login_sequence: Arc<Mutex<VecDeque<String>>>,
}

impl MockSite {
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self {
            after_login: HOME_PAGE.to_string(),
            pages,
            ..Self::default()
        }
    }

    pub fn with_login_sequence(self, pages: &[&str]) -> Self {
        *self.login_sequence.lock().unwrap() = pages.iter().map(|page| page.to_string()).collect();
        self
    }
}

#[derive(Clone)]
pub struct MockLauncher {
    pub site: MockSite,
    pub recorder: Arc<Mutex<Recorder>>,
    pub unavailable: bool,
}

impl MockLauncher {
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            recorder: Arc::new(Mutex::new(Recorder::default())),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(MockSite::default())
        }
    }

    pub fn opens(&self) -> usize {
        self.recorder.lock().unwrap().opens
    }

    pub fn closes(&self) -> usize {
        self.recorder.lock().unwrap().closes
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    async fn open(&self) -> Result<Box<dyn SessionDriver>, DriverError> {
        if self.unavailable {
            return Err(DriverError::Unavailable("no chrome binary found".into()));
        }
        self.recorder.lock().unwrap().opens += 1;
        let mut site = self.site.clone();
        if let Some(page) = site.login_sequence.lock().unwrap().pop_front() {
            site.after_login = page;
        }
        Ok(Box::new(MockDriver {
            site,
            recorder: Arc::clone(&self.recorder),
            current: String::new(),
            closed: false,
        }))
    }
}

pub struct MockDriver {
    site: MockSite,
    recorder: Arc<Mutex<Recorder>>,
    current: String,
    closed: bool,
}

fn texts(html: &str, selector: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect()
}

fn page_number(url: &str) -> Option<usize> {
    let parsed = Url::parse(url).ok()?;
    let page = parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())?;
    page.parse().ok()
}

impl MockDriver {
    fn require(&self, selector: &str) -> Result<(), DriverError> {
        if texts(&self.current, selector).is_empty() {
            return Err(DriverError::ElementMissing(selector.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.recorder.lock().unwrap().navigations.push(url.to_string());
        if let Some(needle) = &self.site.fail_on {
            if url.contains(needle.as_str()) {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_RESET".into(),
                });
            }
        }
        self.current = if url.contains("/login") {
            LOGIN_PAGE.to_string()
        } else if url.contains("/feed/") && !url.contains("/search/") {
            FEED_PAGE.to_string()
        } else if let Some(page) = page_number(url) {
            if let Some(hold) = self.site.hold_search.take() {
                hold.wait();
            }
            self.site
                .pages
                .get(page - 1)
                .cloned()
                .unwrap_or_else(|| results_page(&[]))
        } else {
            HOME_PAGE.to_string()
        };
        Ok(())
    }

    async fn query(&mut self, selector: &str) -> Result<Vec<String>, DriverError> {
        Ok(texts(&self.current, selector))
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.require(selector)?;
        self.recorder
            .lock()
            .unwrap()
            .fills
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.require(selector)?;
        self.recorder.lock().unwrap().clicks.push(selector.to_string());
        if selector == "button[type='submit']" {
            self.current = self.site.after_login.clone();
        }
        Ok(())
    }

    async fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.recorder
            .lock()
            .unwrap()
            .scripts
            .push((script.to_string(), args));
        Ok(Value::Bool(true))
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        Ok(self.current.clone())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if !self.closed {
            self.closed = true;
            self.recorder.lock().unwrap().closes += 1;
        }
        Ok(())
    }
}

/// Poll `condition` until it returns true or the deadline passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

pub fn contains_line(logs: &[String], needle: &str) -> bool {
    logs.iter().any(|line| line.contains(needle))
}

pub fn count_lines(logs: &[String], needle: &str) -> usize {
    logs.iter().filter(|line| line.contains(needle)).count()
}
