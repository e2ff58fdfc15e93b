// Summarizer Agent: five citation-annotated bullets over a set of sources

use crate::agents::citations::{self, BULLET_COUNT, MAX_BULLET_CHARS};
use crate::agents::llm::{GenerateOptions, Generator};
use crate::error::ApiError;
use crate::models::{SourceDocument, SourceReference, SummaryResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Characters of each document's text that reach the prompt.
pub const MAX_CONTEXT_CHARS: usize = 4000;

const SOURCE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Clone)]
pub struct SummarizerAgent {
    generator: Arc<dyn Generator>,
    options: GenerateOptions,
}

/// What the summarizer produced and whether the backend output was usable.
#[derive(Debug, Clone)]
pub struct Summary {
    pub result: SummaryResult,
    pub used_fallback: bool,
}

impl SummarizerAgent {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            options: GenerateOptions::default(),
        }
    }

    pub async fn summarize(&self, topic: &str, docs: &[SourceDocument]) -> Result<Summary, ApiError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ApiError::missing("topic"));
        }
        if docs.is_empty() {
            return Err(ApiError::Validation("Missing or empty docs array".to_string()));
        }

        info!("Summarizer: {} source(s) on {:?} via {}", docs.len(), topic, self.generator.describe());

        let sources = SourceReference::from_docs(docs);
        let prompt = build_prompt(topic, docs);
        let raw = self.generator.generate(&prompt, self.options).await?;

        let (bullets, used_fallback) = match citations::extract_bullets(&raw) {
            Some(bullets) => (bullets, false),
            None => {
                warn!("Failed to parse LLM response, using fallback bullets: {:?}", raw);
                (citations::fallback_bullets(docs), true)
            }
        };

        let bullets: Vec<String> = bullets.into_iter().map(citations::clamp_bullet).collect();
        debug_assert_eq!(bullets.len(), BULLET_COUNT);

        Ok(Summary {
            result: SummaryResult { bullets, sources },
            used_fallback,
        })
    }
}

/// Deterministic prompt for `topic` over `docs`, numbered in input order.
pub fn build_prompt(topic: &str, docs: &[SourceDocument]) -> String {
    let context = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let text: String = doc.text.chars().take(MAX_CONTEXT_CHARS).collect();
            format!("[Source {}] {}\n{}", i + 1, doc.title, text)
        })
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR);

    format!(
        r#"You are a research assistant. Based on the following sources about "{topic}", create exactly {count} bullet points summarizing the key information.

RULES:
1. Each bullet must be ≤{max} characters
2. Include inline citation markers like [1], [2], etc. referencing the source numbers
3. Be factual and informative
4. Return ONLY a JSON object with a "bullets" array containing exactly {count} strings

SOURCES:
{context}

Respond with ONLY valid JSON in this format:
{{"bullets": ["First bullet point with citation [1]", "Second bullet [2]", "Third bullet [1][3]", "Fourth bullet [2]", "Fifth bullet [3]"]}}"#,
        topic = topic,
        count = BULLET_COUNT,
        max = MAX_BULLET_CHARS,
        context = context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a canned backend reply and records every prompt it saw.
    struct ScriptedGenerator {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(reply.to_string()), prompts: Mutex::new(vec![]) })
        }

        fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(msg.to_string()), prompts: Mutex::new(vec![]) })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, _options: GenerateOptions) -> Result<String, ApiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(ApiError::BackendUnavailable)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn docs(n: usize) -> Vec<SourceDocument> {
        (1..=n)
            .map(|i| SourceDocument {
                title: format!("Doc {}", i),
                url: format!("https://example.com/{}", i),
                text: format!("Body of document number {} with   some  spacing.", i),
            })
            .collect()
    }

    fn five() -> Vec<String> {
        (1..=5).map(|i| format!("Finding {} [{}]", i, i)).collect()
    }

    #[tokio::test]
    async fn valid_backend_bullets_pass_through_verbatim() {
        let reply = serde_json::json!({ "bullets": five() }).to_string();
        let generator = ScriptedGenerator::replying(&reply);
        let agent = SummarizerAgent::new(generator.clone());

        let summary = agent.summarize("rust", &docs(3)).await.unwrap();
        assert!(!summary.used_fallback);
        assert_eq!(summary.result.bullets, five());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn always_five_bullets_and_one_source_per_doc() {
        for n in [1, 2, 5, 7, 20] {
            for reply in ["not json at all", "{\"bullets\": [\"x\"]}"] {
                let agent = SummarizerAgent::new(ScriptedGenerator::replying(reply));
                let result = agent.summarize("topic", &docs(n)).await.unwrap().result;
                assert_eq!(result.bullets.len(), 5);
                assert_eq!(result.sources.len(), n);
                for (i, source) in result.sources.iter().enumerate() {
                    assert_eq!(source.index, i + 1);
                    assert_eq!(source.url, format!("https://example.com/{}", i + 1));
                }
                assert!(result.bullets.iter().all(|b| b.chars().count() <= MAX_BULLET_CHARS));
            }
        }
    }

    #[tokio::test]
    async fn prose_reply_yields_document_fallback() {
        let input = docs(2);
        let agent = SummarizerAgent::new(ScriptedGenerator::replying("Here are my thoughts:\n- only one line"));

        let summary = agent.summarize("topic", &input).await.unwrap();
        assert!(summary.used_fallback);
        assert_eq!(summary.result.bullets, citations::fallback_bullets(&input));
        assert_eq!(summary.result.bullets[0], "Body of document number 1 with some spacing.... [1]");
        assert_eq!(summary.result.bullets[1], "Body of document number 2 with some spacing.... [2]");
    }

    #[tokio::test]
    async fn short_bullet_array_uses_fallback_not_padding() {
        let reply = r#"{"bullets": ["a [1]", "b [1]", "c [1]"]}"#;
        let input = docs(4);
        let agent = SummarizerAgent::new(ScriptedGenerator::replying(reply));

        let summary = agent.summarize("topic", &input).await.unwrap();
        assert!(summary.used_fallback);
        assert!(!summary.result.bullets.contains(&"a [1]".to_string()));
        assert_eq!(summary.result.bullets, citations::fallback_bullets(&input));
    }

    #[tokio::test]
    async fn overlong_backend_bullets_are_truncated() {
        let mut bullets = five();
        bullets[2] = format!("{} [3]", "z".repeat(246));
        let reply = serde_json::json!({ "bullets": bullets }).to_string();
        let agent = SummarizerAgent::new(ScriptedGenerator::replying(&reply));

        let result = agent.summarize("topic", &docs(3)).await.unwrap().result;
        assert_eq!(result.bullets[2].chars().count(), 200);
        assert!(result.bullets[2].ends_with("..."));
        assert_eq!(result.bullets[0], "Finding 1 [1]");
    }

    #[tokio::test]
    async fn validation_happens_before_backend_call() {
        let generator = ScriptedGenerator::replying("unused");
        let agent = SummarizerAgent::new(generator.clone());

        let err = agent.summarize("   ", &docs(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("topic")));

        let err = agent.summarize("topic", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("docs")));

        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn backend_failure_is_not_masked_by_fallback() {
        let agent = SummarizerAgent::new(ScriptedGenerator::failing("Ollama API error: 404"));
        let err = agent.summarize("topic", &docs(2)).await.unwrap_err();
        assert!(matches!(err, ApiError::BackendUnavailable(_)));
    }

    #[test]
    fn prompt_is_deterministic_and_numbered() {
        let input = docs(3);
        let first = build_prompt("solar power", &input);
        assert_eq!(first, build_prompt("solar power", &input));
        assert!(first.contains("sources about \"solar power\""));
        assert!(first.contains("[Source 1] Doc 1\n"));
        assert!(first.contains("[Source 3] Doc 3\n"));
        assert!(first.contains("exactly 5 bullet points"));
        assert!(first.contains("≤200 characters"));
        assert!(first.contains("{\"bullets\": [\"First bullet point with citation [1]\""));
        assert_eq!(first.matches(SOURCE_SEPARATOR).count(), 2);
    }

    #[test]
    fn prompt_truncates_each_document() {
        let input = vec![SourceDocument {
            title: "Long".to_string(),
            url: String::new(),
            text: format!("{}{}", "a".repeat(MAX_CONTEXT_CHARS), "TAIL"),
        }];
        let prompt = build_prompt("t", &input);
        assert!(prompt.contains(&"a".repeat(MAX_CONTEXT_CHARS)));
        assert!(!prompt.contains("TAIL"));
    }
}
