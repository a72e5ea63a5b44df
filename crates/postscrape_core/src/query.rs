use url::Url;

use crate::request::{ScrapeRequest, SearchFilters, SortMode};

pub const SEARCH_ENDPOINT: &str = "https://www.linkedin.com/search/results/content/";
pub const SEARCH_ORIGIN: &str = "GLOBAL_SEARCH_HEADER";

/// Combine the search term with quoted field filters, e.g.
/// `rust AND title:"Engineer" AND location:"Berlin"`.
pub fn build_keywords(search_term: &str, filters: &SearchFilters) -> String {
    let mut segments = vec![search_term.trim().to_string()];
    for (field, value) in [
        ("title", &filters.title),
        ("company", &filters.company),
        ("location", &filters.location),
        ("industry", &filters.industry),
    ] {
        let value = value.trim();
        if !value.is_empty() {
            segments.push(format!("{field}:\"{value}\""));
        }
    }
    segments.retain(|segment| !segment.is_empty());
    segments.join(" AND ")
}

/// Base URL of the content search, without a page number.
pub fn build_search_url(request: &ScrapeRequest) -> Url {
    let keywords = build_keywords(&request.search_term, &request.filters);
    let mut url = Url::parse(SEARCH_ENDPOINT).expect("search endpoint is a valid url");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("keywords", &keywords);
        pairs.append_pair("origin", SEARCH_ORIGIN);
        if request.sort == SortMode::Recent {
            pairs.append_pair("sortBy", "recent");
        }
        if let Some(window) = request.date_window.as_param() {
            pairs.append_pair("datePosted", window);
        }
    }
    url
}

/// `base&page={page}`.
pub fn page_url(base: &Url, page: u32) -> String {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url.into()
}
