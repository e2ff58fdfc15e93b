// Citation output handling: turns raw LLM text into exactly five bullets,
// falling back to a document-derived summary when the text is unusable.

use crate::models::SourceDocument;
use serde_json::Value;

pub const BULLET_COUNT: usize = 5;
pub const MAX_BULLET_CHARS: usize = 200;

const FALLBACK_SNIPPET_CHARS: usize = 180;
const PLACEHOLDER_BULLET: &str = "Additional information available in sources. [1]";
const ELLIPSIS: &str = "...";

/// Upper bound on embedded objects we try to parse from a single response.
const MAX_EMBEDDED_ATTEMPTS: usize = 32;

/// Pulls a bullet list out of the backend's raw output.
///
/// Tries, in order: a JSON object embedded in the text, the whole text as
/// JSON, then `-`/`•` marker lines. The first step that yields a list wins;
/// the list must then hold exactly five strings or the parse is failed.
pub fn extract_bullets(raw: &str) -> Option<Vec<String>> {
    let candidate = match embedded_json_bullets(raw).or_else(|| bullets_field(raw.trim())) {
        // A `bullets` array ends the search even when its entries are unusable.
        Some(entries) => string_entries(entries)?,
        None => marker_line_bullets(raw)?,
    };

    (candidate.len() == BULLET_COUNT).then_some(candidate)
}

/// Five bullets built purely from the documents, citing each by position.
pub fn fallback_bullets(docs: &[SourceDocument]) -> Vec<String> {
    let mut bullets: Vec<String> = docs
        .iter()
        .take(BULLET_COUNT)
        .enumerate()
        .map(|(i, doc)| {
            let snippet: String = doc.text.chars().take(FALLBACK_SNIPPET_CHARS).collect();
            format!("{}{} [{}]", collapse_whitespace(&snippet), ELLIPSIS, i + 1)
        })
        .collect();

    bullets.resize(BULLET_COUNT, PLACEHOLDER_BULLET.to_string());
    bullets
}

/// Hard cut to 197 chars plus an ellipsis. Citation markers get no special care.
pub fn clamp_bullet(bullet: String) -> String {
    if bullet.chars().count() <= MAX_BULLET_CHARS {
        return bullet;
    }
    let mut cut: String = bullet
        .chars()
        .take(MAX_BULLET_CHARS - ELLIPSIS.len())
        .collect();
    cut.push_str(ELLIPSIS);
    cut
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn embedded_json_bullets(raw: &str) -> Option<Vec<Value>> {
    let mut attempts = 0;
    for (start, _) in raw.match_indices('{') {
        let Some(end) = matching_brace(raw, start) else {
            continue;
        };
        let object = &raw[start..=end];
        if !object.contains("\"bullets\"") {
            continue;
        }
        if let Some(bullets) = bullets_field(object) {
            return Some(bullets);
        }
        attempts += 1;
        if attempts >= MAX_EMBEDDED_ATTEMPTS {
            break;
        }
    }
    None
}

/// Byte offset of the `}` closing the `{` at `start`, skipping braces inside
/// JSON string literals.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text[start..].bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// The `bullets` array of a JSON object, whatever its entries are.
fn bullets_field(text: &str) -> Option<Vec<Value>> {
    let mut value: Value = serde_json::from_str(text).ok()?;
    match value.get_mut("bullets")?.take() {
        Value::Array(entries) => Some(entries),
        _ => None,
    }
}

fn string_entries(entries: Vec<Value>) -> Option<Vec<String>> {
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(text) => Some(text),
            _ => None,
        })
        .collect()
}

fn marker_line_bullets(raw: &str) -> Option<Vec<String>> {
    let bullets: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('-').or_else(|| line.strip_prefix('•')))
        .map(|line| line.trim().to_string())
        .take(BULLET_COUNT)
        .collect();

    (bullets.len() == BULLET_COUNT).then_some(bullets)
}
