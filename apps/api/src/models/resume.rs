use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::document::{ResumeContent, TemplateStructure};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub original_file_name: String,
    pub s3_key: String,
    pub raw_text: String,
    pub content: Json<ResumeContent>,
    pub template: Json<TemplateStructure>,
    pub created_at: DateTime<Utc>,
}

/// Listing projection; raw text and content stay out of list responses.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub original_file_name: String,
    pub template: Json<TemplateStructure>,
    pub created_at: DateTime<Utc>,
}
