// Action Agent: persists finished briefs as markdown files

use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ActionAgent {
    output_dir: PathBuf,
}

impl ActionAgent {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `content` under the output directory and returns the absolute path.
    pub async fn save_markdown(&self, filename: &str, content: &str) -> Result<PathBuf, ApiError> {
        if filename.is_empty() {
            return Err(ApiError::missing("filename"));
        }
        if content.is_empty() {
            return Err(ApiError::missing("content"));
        }

        let dir = absolute(&self.output_dir)?;
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(markdown_filename(filename));
        tokio::fs::write(&path, content).await?;

        info!("Action: Saved {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}

/// Restricts `name` to `[A-Za-z0-9_.-]` and makes sure it ends in `.md`.
pub fn markdown_filename(name: &str) -> String {
    let mut safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if !safe.ends_with(".md") {
        safe.push_str(".md");
    }
    safe
}

fn absolute(dir: &Path) -> std::io::Result<PathBuf> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}
