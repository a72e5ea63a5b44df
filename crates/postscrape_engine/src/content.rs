use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use postscrape_core::Secret;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_HASHTAGS: usize = 4;
const DEFAULT_HASHTAGS: &str = "#Motivation #Growth #Mindset";

static JSON_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json block pattern"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("word pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reply did not contain a title/description object")]
    Malformed,
}

/// Turns a topic into post copy.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<PostContent, ContentError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Secret,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<Secret>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: OPENAI_RESPONSES_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAiContentGenerator {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiContentGenerator {
    pub fn new(settings: OpenAiSettings) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: String,
}

#[derive(Debug, Deserialize)]
struct ContentReply {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

fn prompt_for(topic: &str) -> String {
    format!(
        "Create a motivational LinkedIn post based on the topic. \
         Return JSON with keys: title, description. \
         Title should be catchy and professional. \
         Description should be detailed and motivational (250-350 words) in English. \
         Topic: {topic}."
    )
}

#[async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    async fn generate(&self, topic: &str) -> Result<PostContent, ContentError> {
        let body = json!({
            "model": self.settings.model,
            "input": prompt_for(topic),
        });
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(self.settings.api_key.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let reply: ResponsesReply = serde_json::from_slice(&bytes)?;
        parse_content_reply(&reply.output_text, topic).ok_or(ContentError::Malformed)
    }
}

/// Parse the model's text as JSON, or the first `{...}` block inside it.
/// Blank fields fall back to the topic.
pub fn parse_content_reply(output_text: &str, topic: &str) -> Option<PostContent> {
    let parsed = serde_json::from_str::<ContentReply>(output_text).ok().or_else(|| {
        JSON_BLOCK_RE
            .find(output_text)
            .and_then(|block| serde_json::from_str::<ContentReply>(block.as_str()).ok())
    })?;
    let or_topic = |value: String| {
        let value = value.trim().to_string();
        if value.is_empty() {
            topic.to_string()
        } else {
            value
        }
    };
    Some(PostContent {
        title: or_topic(parsed.title),
        description: or_topic(parsed.description),
    })
}

/// Deterministic copy used whenever generation is unavailable.
pub fn fallback_content(topic: &str) -> PostContent {
    PostContent {
        title: topic.to_string(),
        description: format!(
            "{topic}\n\n\
             Progress is built on consistency, not perfection. \
             Focus on one meaningful step today, then another tomorrow. \
             Momentum compounds faster than motivation, and small wins build confidence. \
             If you feel stuck, simplify your next move and commit to a short, focused sprint. \
             Keep learning, keep iterating, and keep showing up. \
             Your future self will thank you for the discipline you practice today."
        ),
    }
}

/// Up to four `#Word` tags from title words of three or more characters.
pub fn hashtags_from_title(title: &str) -> String {
    let mut tags: Vec<String> = Vec::new();
    for word in WORD_RE.find_iter(title).map(|m| m.as_str()) {
        if tags.len() >= MAX_HASHTAGS {
            break;
        }
        if word.len() < 3 {
            continue;
        }
        let tag = format!("#{}", capitalize(word));
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if tags.is_empty() {
        return DEFAULT_HASHTAGS.to_string();
    }
    tags.join(" ")
}

fn capitalize(word: &str) -> String {
    let lowered = word.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text typed into the composer: title (unless the description already
/// opens with it), description, hashtags.
pub fn compose_post_text(content: &PostContent) -> String {
    let hashtags = hashtags_from_title(&content.title);
    if content.description.starts_with(&content.title) {
        format!("{}\n\n{hashtags}", content.description)
    } else {
        format!("{}\n\n{}\n\n{hashtags}", content.title, content.description)
    }
}

