use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::analysis::pipeline::AnalysisOptions;
use crate::analysis::ranker::DEFAULT_TOP_N;
use crate::analysis::refiner::DEFAULT_REFINED_TEXT_MAX_CHARS;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_DOCUMENTS: usize = 10;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; a present but malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default result-count limit when a request does not set `top_n`.
    pub top_n: usize,
    pub refined_text_max_chars: usize,
    /// Documents accepted per request; bounds the wall-clock cost of one analysis.
    pub max_documents: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            top_n: DEFAULT_TOP_N,
            refined_text_max_chars: DEFAULT_REFINED_TEXT_MAX_CHARS,
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let config = Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            top_n: parse_or(&lookup, "TOP_N", defaults.top_n)?,
            refined_text_max_chars: parse_or(
                &lookup,
                "REFINED_TEXT_MAX_CHARS",
                defaults.refined_text_max_chars,
            )?,
            max_documents: parse_or(&lookup, "MAX_DOCUMENTS", defaults.max_documents)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        ensure!(config.top_n >= 1, "TOP_N must be at least 1");
        ensure!(
            config.refined_text_max_chars >= 1,
            "REFINED_TEXT_MAX_CHARS must be at least 1"
        );
        ensure!(config.max_documents >= 1, "MAX_DOCUMENTS must be at least 1");
        Ok(config)
    }

    pub fn analysis_options(&self, top_n: Option<usize>) -> AnalysisOptions {
        AnalysisOptions {
            top_n: top_n.unwrap_or(self.top_n),
            refined_text_max_chars: self.refined_text_max_chars,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
