use std::fmt;

use serde::Deserialize;

/// Page limit used when the caller supplies nothing usable.
pub const DEFAULT_PAGE_LIMIT: u32 = 1;

/// Opaque credential secret. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub email: String,
    pub secret: Secret,
}

impl Credentials {
    /// The email is trimmed; the secret is kept verbatim.
    pub fn new(email: impl AsRef<str>, secret: impl Into<Secret>) -> Self {
        Self {
            email: email.as_ref().trim().to_string(),
            secret: secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.secret.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Recent,
}

impl SortMode {
    /// Anything other than `recent` means relevance.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("recent") {
            SortMode::Recent
        } else {
            SortMode::Relevance
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    Any,
    Past24h,
    PastWeek,
    PastMonth,
}

impl DateWindow {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "past-24h" => DateWindow::Past24h,
            "past-week" => DateWindow::PastWeek,
            "past-month" => DateWindow::PastMonth,
            _ => DateWindow::Any,
        }
    }

    /// Value of the `datePosted` search parameter, if any.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            DateWindow::Any => None,
            DateWindow::Past24h => Some("past-24h"),
            DateWindow::PastWeek => Some("past-week"),
            DateWindow::PastMonth => Some("past-month"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilters {
    pub title: String,
    pub company: String,
    pub location: String,
    pub industry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Email,
    Secret,
    SearchTerm,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Email => write!(f, "email"),
            RequiredField::Secret => write!(f, "password"),
            RequiredField::SearchTerm => write!(f, "search term"),
        }
    }
}

/// Validated, immutable input of one scrape job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub credentials: Credentials,
    pub search_term: String,
    pub filters: SearchFilters,
    pub page_limit: u32,
    pub sort: SortMode,
    pub date_window: DateWindow,
}

impl ScrapeRequest {
    pub fn new(credentials: Credentials, search_term: impl AsRef<str>) -> Self {
        Self {
            credentials,
            search_term: search_term.as_ref().trim().to_string(),
            filters: SearchFilters::default(),
            page_limit: DEFAULT_PAGE_LIMIT,
            sort: SortMode::default(),
            date_window: DateWindow::default(),
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_date_window(mut self, date_window: DateWindow) -> Self {
        self.date_window = date_window;
        self
    }

    /// Fields that must be present before any browser session is opened.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.credentials.email.is_empty() {
            missing.push(RequiredField::Email);
        }
        if self.credentials.secret.is_empty() {
            missing.push(RequiredField::Secret);
        }
        if self.search_term.is_empty() {
            missing.push(RequiredField::SearchTerm);
        }
        missing
    }
}

/// Coerce free-form page input into a positive page count.
///
/// Zero, negative and unparsable input all become 1.
pub fn coerce_page_limit(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(n) => clamp_page_limit(n),
        Err(_) => DEFAULT_PAGE_LIMIT,
    }
}

fn clamp_page_limit(n: i64) -> u32 {
    u32::try_from(n.max(1)).unwrap_or(u32::MAX)
}

/// Page count as the UI sends it: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PageInput {
    pub fn coerce(&self) -> u32 {
        match self {
            PageInput::Integer(n) => clamp_page_limit(*n),
            PageInput::Float(f) if f.is_finite() => clamp_page_limit(f.trunc() as i64),
            PageInput::Float(_) => DEFAULT_PAGE_LIMIT,
            PageInput::Text(text) => coerce_page_limit(text),
        }
    }
}

/// Raw job payload as submitted by the UI shell, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapePayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub search_term: Option<String>,
    pub pages: Option<PageInput>,
    pub sort_by: Option<String>,
    pub date_posted: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
}

impl ScrapePayload {
    pub fn normalize(self) -> ScrapeRequest {
        let trimmed = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        let page_limit = self
            .pages
            .as_ref()
            .map(PageInput::coerce)
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        ScrapeRequest {
            credentials: Credentials::new(
                self.email.unwrap_or_default(),
                self.password.unwrap_or_default(),
            ),
            search_term: trimmed(self.search_term),
            filters: SearchFilters {
                title: trimmed(self.title),
                company: trimmed(self.company),
                location: trimmed(self.location),
                industry: trimmed(self.industry),
            },
            page_limit,
            sort: SortMode::parse(self.sort_by.as_deref().unwrap_or_default()),
            date_window: DateWindow::parse(self.date_posted.as_deref().unwrap_or_default()),
        }
    }
}
