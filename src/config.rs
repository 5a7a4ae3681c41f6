use crate::error::{Error, Result};
use std::env;

pub const DEFAULT_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini"];
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub github_api_url: String,
    pub exclude_patterns: Vec<String>,
    pub max_files: Option<usize>,
    pub models: Vec<String>,
    pub rules_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = non_empty("OPENAI_API_KEY")
            .ok_or_else(|| Error::Config("OPENAI_API_KEY environment variable not set".to_string()))?;

        let github_token = non_empty("GITHUB_TOKEN")
            .ok_or_else(|| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        let openai_base_url = non_empty("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let github_api_url = non_empty("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        let exclude_patterns = non_empty("EXCLUDE_PATTERNS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let max_files = match non_empty("MAX_FILES") {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(Error::Config(format!(
                        "MAX_FILES must be a positive integer, got '{}'",
                        v
                    )))
                }
            },
            None => None,
        };

        let models = non_empty("REVIEW_MODELS")
            .map(|v| split_list(&v))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        let rules_path = non_empty("REVIEW_RULES_PATH");

        Ok(Self {
            github_token,
            openai_api_key,
            openai_base_url,
            github_api_url,
            exclude_patterns,
            max_files,
            models,
            rules_path,
        })
    }
}

/// Splits a comma-separated value, dropping blank entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub exclude_patterns: Vec<String>,
    pub max_files: Option<usize>,
    pub models: Vec<String>,
    pub post_comment: bool,
    pub report_status: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            exclude_patterns: config.exclude_patterns.clone(),
            max_files: config.max_files,
            models: config.models.clone(),
            post_comment: true,
            report_status: true,
        }
    }
}
