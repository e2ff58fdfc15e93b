use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A document handed to the summarizer. Missing fields read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// Position-indexed identity of an input document, the only citation key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceReference {
    #[serde(rename = "i")]
    pub index: usize,
    pub title: String,
    pub url: String,
}

impl SourceReference {
    pub fn from_docs(docs: &[SourceDocument]) -> Vec<SourceReference> {
        docs.iter()
            .enumerate()
            .map(|(i, doc)| SourceReference {
                index: i + 1,
                title: doc.title.clone(),
                url: doc.url.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResult {
    pub bullets: Vec<String>,
    pub sources: Vec<SourceReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadableDocument {
    pub url: String,
    pub title: String,
    pub text: String,
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub topic: Option<String>,
    pub docs: Option<Vec<SourceDocument>>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub filename: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_references_follow_input_order() {
        let docs = vec![
            SourceDocument { title: "B".into(), url: "https://b.example".into(), text: String::new() },
            SourceDocument { title: "A".into(), url: "https://a.example".into(), text: String::new() },
            SourceDocument { title: "B".into(), url: "https://b.example".into(), text: String::new() },
        ];
        let refs = SourceReference::from_docs(&docs);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[1].title, "A");
        assert_eq!(refs[2].index, 3);
        assert_eq!(refs[2].url, "https://b.example");
    }

    #[test]
    fn source_reference_serializes_index_as_i() {
        let r = SourceReference { index: 2, title: "T".into(), url: "u".into() };
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value, serde_json::json!({"i": 2, "title": "T", "url": "u"}));
    }

    #[test]
    fn document_fields_default_to_empty() {
        let doc: SourceDocument = serde_json::from_str(r#"{"title": "only title"}"#).unwrap();
        assert_eq!(doc.title, "only title");
        assert!(doc.url.is_empty());
        assert!(doc.text.is_empty());
    }
}
