//! Postscrape core: request/row data model and the pure job-control state machine.
mod effect;
mod msg;
mod query;
mod request;
mod row;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use query::{build_keywords, build_search_url, page_url, SEARCH_ENDPOINT, SEARCH_ORIGIN};
pub use request::{
    coerce_page_limit, Credentials, DateWindow, PageInput, RequiredField, ScrapePayload,
    ScrapeRequest, SearchFilters, Secret, SortMode, DEFAULT_PAGE_LIMIT,
};
pub use row::{normalize_whitespace, ResultRow, WorkplaceMode, OUTPUT_HEADER};
pub use state::{JobKind, JobState, JobStatus};
pub use update::update;
pub use view_model::ProgressView;
