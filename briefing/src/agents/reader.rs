// Reader Agent: fetches a page and pulls out its main readable text

use crate::agents::citations::collapse_whitespace;
use crate::error::ApiError;
use crate::models::ReadableDocument;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ResearchBriefingBot/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Extracted text is capped at this many characters.
pub const MAX_TEXT_CHARS: usize = 15_000;

const UNKNOWN_TITLE: &str = "Unknown";
const MIN_CANDIDATE_CHARS: usize = 20;
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];
const BOILERPLATE_HINTS: &[&str] = &[
    "nav", "menu", "footer", "header", "sidebar", "cookie", "comment", "banner", "breadcrumb",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReaderAgent {
    client: reqwest::Client,
}

impl ReaderAgent {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<ReadableDocument, ApiError> {
        let parsed = parse_http_url(url)?;
        info!("Reader: Fetching {}", parsed);

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Reader: {} answered {}", url, status);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "Failed to fetch URL: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
            });
        }

        let html = resp.text().await?;
        let Extracted { title, text } = extract_readable(&html);

        Ok(ReadableDocument {
            url: url.to_string(),
            title,
            text,
        })
    }
}

fn parse_http_url(url: &str) -> Result<Url, ApiError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| ApiError::Validation(format!("Invalid url: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ApiError::Validation(format!("Unsupported url scheme: {}", other))),
    }
}

/// Best-effort title and article text. Never fails; malformed markup just
/// yields less.
pub fn extract_readable(html: &str) -> Extracted {
    let doc = Html::parse_document(html);

    let title = meta_title(&doc)
        .or_else(|| first_text(&doc, "title"))
        .or_else(|| first_text(&doc, "h1"))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let text = main_text(&doc)
        .or_else(|| first_text(&doc, "body"))
        .unwrap_or_default();

    Extracted {
        title,
        text: text.chars().take(MAX_TEXT_CHARS).collect(),
    }
}

fn meta_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(visible_text)
        .find(|t| !t.is_empty())
}

/// Per-node character counts gathered bottom-up in one pass.
#[derive(Debug, Default, Clone, Copy)]
struct TextStats {
    text: usize,
    links: usize,
}

/// Highest scoring content container: dense non-link text wins.
fn main_text(doc: &Html) -> Option<String> {
    // Children follow their parent in document order, so walking the
    // nodes backwards sees every child before the parent.
    let nodes: Vec<_> = doc.root_element().descendants().collect();
    let mut stats: HashMap<_, TextStats> = HashMap::with_capacity(nodes.len());
    let mut best: Option<(i64, ElementRef)> = None;

    for node in nodes.iter().rev() {
        let mut own = TextStats::default();

        if let Some(text) = node.value().as_text() {
            own.text = collapsed_chars(text);
        } else if let Some(el) = ElementRef::wrap(*node) {
            let tag = el.value().name();
            if !SKIPPED_TAGS.contains(&tag) {
                for child in node.children() {
                    if let Some(child_stats) = stats.get(&child.id()) {
                        own.text += child_stats.text;
                        own.links += child_stats.links;
                    }
                }
                if tag == "a" {
                    own.links = own.text;
                }
                if let Some(score) = candidate_score(&el, own) {
                    // Ties go to the earlier element in the document.
                    if best.as_ref().map_or(true, |(s, _)| score >= *s) {
                        best = Some((score, el));
                    }
                }
            }
        }

        stats.insert(node.id(), own);
    }

    best.filter(|(score, _)| *score > 0)
        .map(|(_, el)| visible_text(el))
}

fn candidate_score(el: &ElementRef, stats: TextStats) -> Option<i64> {
    let tag = el.value().name();
    if !matches!(tag, "article" | "main" | "section" | "div") || is_boilerplate(el) {
        return None;
    }
    if stats.text < MIN_CANDIDATE_CHARS {
        return None;
    }

    let mut score = stats.text as i64 - 2 * stats.links as i64;
    match tag {
        "article" => score += 500,
        "main" => score += 300,
        _ => {}
    }
    if stats.links > stats.text / 2 {
        score -= 500;
    }
    Some(score)
}

fn is_boilerplate(el: &ElementRef) -> bool {
    let tag = el.value().name();
    if matches!(tag, "nav" | "footer" | "header" | "aside") {
        return true;
    }
    let marker = format!(
        "{} {}",
        el.value().attr("class").unwrap_or(""),
        el.value().id().unwrap_or("")
    )
    .to_lowercase();
    BOILERPLATE_HINTS.iter().any(|hint| marker.contains(hint))
}

/// Length of `text` once whitespace is collapsed, counting one separator
/// per word.
fn collapsed_chars(text: &str) -> usize {
    text.split_whitespace().map(|word| word.chars().count() + 1).sum()
}

/// Text of `el` and its descendants with script-like subtrees dropped,
/// whitespace collapsed. Iterative, so nesting depth is not bounded by the
/// thread stack.
fn visible_text(el: ElementRef) -> String {
    let mut raw = String::new();
    let mut stack: Vec<_> = el.children().rev().collect();

    while let Some(node) = stack.pop() {
        if let Some(text) = node.value().as_text() {
            raw.push_str(text);
            raw.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(node) {
            if !SKIPPED_TAGS.contains(&child_el.value().name()) {
                stack.extend(node.children().rev());
            }
        }
    }

    collapse_whitespace(&raw)
}
