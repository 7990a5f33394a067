//! GitHub REST client for the three metadata calls the sync pipeline makes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{RepoMetadataSource, RepoSourceError, RepoSummary};

const USER_AGENT: &str = "vitae-api";
const ACCEPT: &str = "application/vnd.github+json";
const REPOS_PATH: &str = "/user/repos?type=owner&sort=updated&per_page=100";
pub const README_EXCERPT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepoSourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, credential: &str, path: &str) -> Result<reqwest::Response, RepoSourceError> {
        debug!("GitHub GET {path}");
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(credential)
            .header("Accept", ACCEPT)
            .send()
            .await?;
        Ok(response)
    }

    fn check(response: reqwest::Response, path: &str) -> Result<reqwest::Response, RepoSourceError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RepoSourceError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            })
        }
    }
}

#[async_trait]
impl RepoMetadataSource for GitHubClient {
    async fn list_owned_repos(&self, credential: &str) -> Result<Vec<RepoSummary>, RepoSourceError> {
        let response = Self::check(self.get(credential, REPOS_PATH).await?, REPOS_PATH)?;
        Ok(response.json().await?)
    }

    async fn fetch_readme_excerpt(
        &self,
        credential: &str,
        owner: &str,
        name: &str,
    ) -> Result<Option<String>, RepoSourceError> {
        let path = format!("/repos/{owner}/{name}/readme");
        let response = self.get(credential, &path).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let readme: ReadmeResponse = Self::check(response, &path)?.json().await?;
        if !readme.encoding.is_empty() && readme.encoding != "base64" {
            return Err(RepoSourceError::Decode(format!(
                "unexpected readme encoding '{}'",
                readme.encoding
            )));
        }
        decode_readme(&readme.content).map_err(RepoSourceError::Decode)
    }

    async fn fetch_language_breakdown(
        &self,
        credential: &str,
        owner: &str,
        name: &str,
    ) -> Result<Vec<String>, RepoSourceError> {
        let path = format!("/repos/{owner}/{name}/languages");
        let response = Self::check(self.get(credential, &path).await?, &path)?;
        let bytes_by_language: HashMap<String, u64> = response.json().await?;
        Ok(rank_languages(bytes_by_language))
    }
}

/// Decodes GitHub's line-wrapped base64 readme payload and keeps the first
/// `README_EXCERPT_CHARS` characters. Blank readmes become `None`.
pub fn decode_readme(content: &str) -> Result<Option<String>, String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    let text = String::from_utf8_lossy(&bytes);
    let excerpt: String = text.chars().take(README_EXCERPT_CHARS).collect();
    if excerpt.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(excerpt))
    }
}

/// Language names by byte count, largest first; ties broken by name.
pub fn rank_languages(bytes_by_language: HashMap<String, u64>) -> Vec<String> {
    let mut languages: Vec<(String, u64)> = bytes_by_language.into_iter().collect();
    languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    languages.into_iter().map(|(name, _)| name).collect()
}
