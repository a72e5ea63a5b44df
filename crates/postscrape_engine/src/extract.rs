use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeId;
use engine_logging::engine_warn;
use postscrape_core::ResultRow;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::{FieldSelector, QueryScope, SelectorConfig};
use crate::infer;
use crate::text::visible_text;

pub const LINKEDIN_ORIGIN: &str = "https://www.linkedin.com/";
const FEED_UPDATE_BASE: &str = "https://www.linkedin.com/feed/update/";

static ACTIVITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"urn:li:activity:(\d+)").expect("activity urn pattern"));

/// Cards found on one page snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageExtraction {
    pub rows: Vec<ResultRow>,
    pub cards_found: usize,
    /// Cards dropped because they had no author, description or link.
    pub skipped: usize,
}

/// Extract rows from a serialized page, in document order.
pub fn extract_cards(html: &str, selectors: &SelectorConfig) -> PageExtraction {
    let document = Html::parse_document(html);
    let compiled = CompiledSelectors::new(selectors);

    let mut cards = select_cards(&document, &compiled.cards);
    if cards.is_empty() {
        cards = select_cards(&document, &compiled.fallback_cards);
    }

    let mut extraction = PageExtraction {
        cards_found: cards.len(),
        ..PageExtraction::default()
    };
    for card in cards {
        match parse_card(card, &document, &compiled) {
            Some(row) => extraction.rows.push(row),
            None => extraction.skipped += 1,
        }
    }
    extraction
}

struct CompiledChain {
    selector: Selector,
    scope: QueryScope,
}

struct CompiledSelectors {
    cards: Vec<Selector>,
    fallback_cards: Vec<Selector>,
    author: Vec<CompiledChain>,
    posted_at: Vec<CompiledChain>,
    description: Vec<CompiledChain>,
    anchor: Option<Selector>,
    urn: Option<Selector>,
}

impl CompiledSelectors {
    fn new(config: &SelectorConfig) -> Self {
        Self {
            cards: config.cards.iter().filter_map(|s| compile(s)).collect(),
            fallback_cards: config.fallback_cards.iter().filter_map(|s| compile(s)).collect(),
            author: compile_chain(&config.author),
            posted_at: compile_chain(&config.posted_at),
            description: compile_chain(&config.description),
            anchor: compile(&config.post_anchor),
            urn: compile("[data-urn]"),
        }
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            engine_warn!("Ignoring invalid selector {selector:?}: {err}");
            None
        }
    }
}

fn compile_chain(chain: &[FieldSelector]) -> Vec<CompiledChain> {
    chain
        .iter()
        .filter_map(|entry| {
            compile(&entry.selector).map(|selector| CompiledChain {
                selector,
                scope: entry.scope,
            })
        })
        .collect()
}

/// Union of all matches in document order. An element nested inside an
/// already selected card is not a card of its own.
fn select_cards<'a>(document: &'a Html, selectors: &[Selector]) -> Vec<ElementRef<'a>> {
    let mut matched: HashSet<NodeId> = HashSet::new();
    for selector in selectors {
        matched.extend(document.select(selector).map(|element| element.id()));
    }

    let mut cards: Vec<ElementRef<'a>> = Vec::new();
    let mut taken: HashSet<NodeId> = HashSet::new();
    for node in document.root_element().descendants() {
        if !matched.contains(&node.id()) {
            continue;
        }
        if node.ancestors().any(|ancestor| taken.contains(&ancestor.id())) {
            continue;
        }
        if let Some(element) = ElementRef::wrap(node) {
            taken.insert(node.id());
            cards.push(element);
        }
    }
    cards
}

/// First non-empty text along the chain.
fn first_text(card: ElementRef, document: &Html, chain: &[CompiledChain]) -> String {
    for step in chain {
        let found = match step.scope {
            QueryScope::Card => card
                .select(&step.selector)
                .map(visible_text)
                .find(|text| !text.is_empty()),
            QueryScope::Document => document
                .select(&step.selector)
                .map(visible_text)
                .find(|text| !text.is_empty()),
        };
        if let Some(text) = found {
            return text;
        }
    }
    String::new()
}

fn parse_card(
    card: ElementRef,
    document: &Html,
    compiled: &CompiledSelectors,
) -> Option<ResultRow> {
    let author = first_text(card, document, &compiled.author);
    let posted_at = first_text(card, document, &compiled.posted_at);
    let description = first_text(card, document, &compiled.description);
    let post_url = canonical_post_url(card, compiled.anchor.as_ref(), compiled.urn.as_ref());

    let row = ResultRow {
        job_title: infer::job_title(&description),
        location: infer::location(&description),
        employment_type: infer::employment_type(&description),
        workplace: infer::workplace_mode(&description).label().to_string(),
        qualifications: infer::section_excerpt(&description, infer::QUALIFICATION_KEYWORDS),
        skills: infer::section_excerpt(&description, infer::SKILL_KEYWORDS),
        contact: infer::contact_details(&description),
        salary: infer::salary(&description),
        author,
        description,
        posted_at,
        post_url,
    };
    row.has_signal().then(|| row.normalized())
}

/// Pick the most specific post link inside a card.
///
/// Post and feed-update links win, then anything carrying an activity URN,
/// then the first absolute link, then a `data-urn` attribute. Query strings
/// are always dropped.
pub fn canonical_post_url(
    card: ElementRef,
    anchor: Option<&Selector>,
    urn: Option<&Selector>,
) -> String {
    let base = Url::parse(LINKEDIN_ORIGIN).ok();
    let urls: Vec<String> = anchor
        .map(|anchor| {
            card.select(anchor)
                .filter_map(|element| element.value().attr("href"))
                .filter_map(|href| resolve_url(href, base.as_ref()))
                .collect()
        })
        .unwrap_or_default();

    if let Some(url) = urls
        .iter()
        .find(|url| url.contains("/posts/") || url.contains("/feed/update"))
    {
        return strip_query(url);
    }
    if let Some(url) = urls.iter().find_map(|url| activity_url(url)) {
        return url;
    }
    if let Some(url) = urls.iter().find(|url| url.starts_with("http")) {
        return strip_query(url);
    }

    let own_urn = card.value().attr("data-urn").and_then(activity_url);
    own_urn
        .or_else(|| {
            urn.and_then(|urn| {
                card.select(urn)
                    .filter_map(|element| element.value().attr("data-urn"))
                    .find_map(activity_url)
            })
        })
        .unwrap_or_default()
}

fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

fn activity_url(value: &str) -> Option<String> {
    ACTIVITY_RE
        .captures(value)
        .map(|captures| format!("{FEED_UPDATE_BASE}urn:li:activity:{}", &captures[1]))
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_of(card_html: &str) -> String {
        let document = Html::parse_document(card_html);
        let card_selector = Selector::parse("div.card").unwrap();
        let card = document.select(&card_selector).next().unwrap();
        let anchor = Selector::parse("a[href]").unwrap();
        let urn = Selector::parse("[data-urn]").unwrap();
        canonical_post_url(card, Some(&anchor), Some(&urn))
    }

    #[test]
    fn relative_post_link_is_resolved_and_stripped() {
        assert_eq!(
            url_of(r#"<div class="card"><a href="/in/jane">Jane</a><a href="/posts/jane_hiring-123?utm=x">post</a></div>"#),
            "https://www.linkedin.com/posts/jane_hiring-123"
        );
    }

    #[test]
    fn activity_urn_in_href_is_canonicalized() {
        assert_eq!(
            url_of(r#"<div class="card"><a href="https://lnkd.in/x?urn=urn:li:activity:7001&trk=1">x</a></div>"#),
            "https://www.linkedin.com/feed/update/urn:li:activity:7001"
        );
    }

    #[test]
    fn data_urn_is_last_resort() {
        assert_eq!(
            url_of(r#"<div class="card"><span data-urn="urn:li:activity:42"></span></div>"#),
            "https://www.linkedin.com/feed/update/urn:li:activity:42"
        );
        assert_eq!(url_of(r#"<div class="card">nothing here</div>"#), "");
    }

    #[test]
    fn nested_card_matches_are_not_duplicated() {
        let html = r#"<ul>
            <li class="reusable-search__result-container">
              <div class="feed-shared-update-v2"><span class="break-words">Hello</span></div>
            </li>
        </ul>"#;
        let extraction = extract_cards(html, &SelectorConfig::default());
        assert_eq!(extraction.cards_found, 1);
        assert_eq!(extraction.rows.len(), 1);
    }
}
