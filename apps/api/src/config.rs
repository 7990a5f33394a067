use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::DEFAULT_API_URL as DEFAULT_ANTHROPIC_API_URL;
use crate::render::SummaryPlacement;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub github_api_url: String,
    /// Bound for enrichment calls: readme, languages, bullet synthesis.
    pub collaborator_timeout: Duration,
    /// Bound for structuring and tailoring calls.
    pub llm_timeout: Duration,
    pub sync_candidate_limit: usize,
    pub summary_placement: SummaryPlacement,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_API_URL.to_string()),
            github_api_url: optional_env("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            collaborator_timeout: Duration::from_secs(parse_env("COLLABORATOR_TIMEOUT_SECS", 15)?),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            sync_candidate_limit: parse_env("SYNC_CANDIDATE_LIMIT", 20)?,
            summary_placement: match optional_env("SUMMARY_PLACEMENT") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .context("SUMMARY_PLACEMENT is invalid")?,
                None => SummaryPlacement::default(),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key} must be a valid number: {e}")),
        None => Ok(default),
    }
}
