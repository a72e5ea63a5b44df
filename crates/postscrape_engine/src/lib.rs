//! Postscrape engine: browser sessions, extraction pipeline and job execution.
mod auth;
mod chrome;
mod config;
mod content;
mod driver;
mod engine;
mod extract;
mod filename;
mod gate;
mod infer;
mod job;
mod paginate;
mod persist;
mod poster;
mod sink;
mod status;
mod text;
mod types;

pub use auth::{
    authenticate, detect_verification_challenge, handle_verification, login,
    VERIFICATION_INSTRUCTION,
};
pub use chrome::{ChromeLauncher, ChromeOptions, ChromeSession};
pub use config::{
    FieldSelector, QueryScope, ScrapeSettings, SelectorConfig, FEED_URL, LOGIN_URL,
};
pub use content::{
    compose_post_text, fallback_content, hashtags_from_title, parse_content_reply, ContentError,
    ContentGenerator, OpenAiContentGenerator, OpenAiSettings, PostContent, DEFAULT_MODEL,
    OPENAI_RESPONSES_URL,
};
pub use driver::{SessionDriver, SessionLauncher};
pub use engine::{EngineParts, ScrapeController};
pub use extract::{canonical_post_url, extract_cards, PageExtraction, LINKEDIN_ORIGIN};
pub use filename::{timestamped_filename, OUTPUT_PREFIX};
pub use gate::VerificationGate;
pub use infer::{
    contact_details, employment_type, job_title, location, salary, section_excerpt,
    workplace_mode, QUALIFICATION_KEYWORDS, SKILL_KEYWORDS,
};
pub use job::{JobContext, ScrapeJob};
pub use paginate::{paginate, scrape_page, scroll_once, wait_for_results};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poster::{publish, PosterWorkflow};
pub use sink::{encode_rows, CsvSink, ResultSink};
pub use status::{local_clock, Clock, StatusStore};
pub use text::visible_text;
pub use types::{DriverError, JobError, SinkError};
