//! Repository ingestion. Turns a linked GitHub account into ranked, enriched,
//! deduplicated project drafts.

pub mod github;
pub mod pipeline;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

pub use github::GitHubClient;
pub use pipeline::{sync, SyncSettings};

#[derive(Debug, Error)]
pub enum RepoSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

/// One owned repository as listed by the metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u32,
    #[serde(rename = "forks_count", default)]
    pub forks: u32,
    pub updated_at: DateTime<Utc>,
}

/// Remote repository metadata. Carried in `AppState` as
/// `Arc<dyn RepoMetadataSource>`.
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    async fn list_owned_repos(&self, credential: &str) -> Result<Vec<RepoSummary>, RepoSourceError>;

    /// `Ok(None)` when the repository has no readme.
    async fn fetch_readme_excerpt(
        &self,
        credential: &str,
        owner: &str,
        name: &str,
    ) -> Result<Option<String>, RepoSourceError>;

    /// Language names, largest share first.
    async fn fetch_language_breakdown(
        &self,
        credential: &str,
        owner: &str,
        name: &str,
    ) -> Result<Vec<String>, RepoSourceError>;
}
