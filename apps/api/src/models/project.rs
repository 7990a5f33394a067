use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSource {
    Manual,
    Imported,
}

impl ProjectSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectSource::Manual => "manual",
            ProjectSource::Imported => "imported",
        }
    }
}

/// Where an imported project came from, captured at import time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRef {
    pub external_url: String,
    pub star_count: u32,
    pub fork_count: u32,
    pub primary_languages: Vec<String>,
    pub readme_excerpt: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

/// A project that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    pub impact: String,
    pub bullets: Vec<String>,
    pub source: ProjectSource,
    pub origin: Option<OriginRef>,
}

impl NewProject {
    pub fn external_url(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.external_url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    pub impact: String,
    pub bullets: Vec<String>,
    pub source: String,
    pub external_url: Option<String>,
    pub origin: Option<Json<OriginRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
