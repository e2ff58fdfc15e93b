use serde::Deserialize;
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_TOKEN: &str = "dev-token";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub token: String,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub output_dir: PathBuf,
    pub llm_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            token: std::env::var("MCP_HTTP_TOKEN")
                .unwrap_or_else(|_| DEFAULT_TOKEN.to_string()),
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            google_cse_id: non_empty_var("GOOGLE_CSE_ID"),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| "llama3".to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "./briefs".to_string())
                .into(),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Token as it may appear in logs.
    pub fn masked_token(&self) -> &'static str {
        if self.token == DEFAULT_TOKEN {
            "dev-token (default)"
        } else {
            "***configured***"
        }
    }

    pub fn google_configured(&self) -> bool {
        self.google_api_key.is_some() && self.google_cse_id.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests(output_dir: PathBuf) -> Self {
        Config {
            port: 0,
            token: "test-token".to_string(),
            google_api_key: None,
            google_cse_id: None,
            ollama_base_url: "http://127.0.0.1:9".to_string(),
            ollama_model: "test-model".to_string(),
            output_dir,
            llm_timeout_secs: 1,
            log_level: "debug".to_string(),
        }
    }
}
