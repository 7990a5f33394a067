use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::document::{GeneratedArtifact, ResumeContent, TemplateStructure};

#[derive(Debug, Clone, FromRow)]
pub struct GeneratedRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub base_resume_id: Uuid,
    pub role_tag: String,
    pub job_description: String,
    pub keywords: Vec<String>,
    pub content: Json<ResumeContent>,
    pub template: Json<TemplateStructure>,
    pub ats_score: Option<i16>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedRow {
    pub fn into_artifact(self) -> GeneratedArtifact {
        GeneratedArtifact::restore(
            self.id,
            self.user_id,
            self.base_resume_id,
            self.role_tag,
            self.keywords,
            self.content.0,
            self.template.0,
            self.ats_score,
            self.created_at,
        )
    }
}

/// Listing projection without the document body.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSummaryRow {
    pub id: Uuid,
    pub base_resume_id: Uuid,
    pub base_resume_title: Option<String>,
    pub role_tag: String,
    pub keywords: Vec<String>,
    pub ats_score: Option<i16>,
    pub created_at: DateTime<Utc>,
}
