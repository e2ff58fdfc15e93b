use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Process-wide counters, exposed at `/metrics`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
    fallbacks: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("briefing_tool_requests_total", "Tool invocations by tool name"),
            &["tool"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new("briefing_tool_errors_total", "Failed tool invocations by tool name"),
            &["tool"],
        )?;
        let fallbacks = IntCounter::new(
            "briefing_summary_fallbacks_total",
            "Summaries built from source text because the LLM output was unusable",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(fallbacks.clone()))?;

        Ok(Self { registry, requests, errors, fallbacks })
    }

    pub fn record_request(&self, tool: &str) {
        self.requests.with_label_values(&[tool]).inc();
    }

    pub fn record_error(&self, tool: &str) {
        self.errors.with_label_values(&[tool]).inc();
    }

    pub fn record_fallback(&self) {
        self.fallbacks.inc();
    }

    /// Text exposition of every registered metric, with its content type.
    pub fn render(&self) -> prometheus::Result<(Vec<u8>, String)> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("search_web");
        metrics.record_request("search_web");
        metrics.record_error("fetch_readable");
        metrics.record_fallback();

        let (body, content_type) = metrics.render().unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains(r#"briefing_tool_requests_total{tool="search_web"} 2"#));
        assert!(text.contains(r#"briefing_tool_errors_total{tool="fetch_readable"} 1"#));
        assert!(text.contains("briefing_summary_fallbacks_total 1"));
    }

    #[test]
    fn instances_do_not_share_state() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_fallback();
        let (body, _) = b.render().unwrap();
        assert!(String::from_utf8(body).unwrap().contains("briefing_summary_fallbacks_total 0"));
    }
}
