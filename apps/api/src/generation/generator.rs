//! Resume tailoring: turns a base resume plus a job description into an
//! immutable `GeneratedArtifact`.
//!
//! Flow: validate → analyze_target → tailor → capture atsScore → normalize →
//! snapshot with the base resume's template structure.
//!
//! Both collaborator calls carry the document's primary content, so either one
//! failing fails the whole generation.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::document::{
    ats_score, normalize, ArtifactSnapshot, GeneratedArtifact, ResumeContent, TemplateStructure,
};
use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::text_gen::{ProjectBrief, TailorRequest, TargetAnalysis, TextGenerator};

/// Request body for resume generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    #[serde(alias = "baseResumeId")]
    pub base_resume_id: Option<Uuid>,
    #[serde(alias = "jobDescription", default)]
    pub job_description: String,
    #[serde(alias = "roleTag", default)]
    pub role_tag: String,
    #[serde(alias = "selectedProjectIds", default)]
    pub selected_project_ids: Vec<Uuid>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidGenerateRequest {
    pub user_id: Uuid,
    pub base_resume_id: Uuid,
    pub job_description: String,
    pub role_tag: String,
    pub selected_project_ids: Vec<Uuid>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<ValidGenerateRequest, AppError> {
        let job_description = self.job_description.trim().to_string();
        let role_tag = self.role_tag.trim().to_string();
        match (self.base_resume_id, job_description.is_empty(), role_tag.is_empty()) {
            (Some(base_resume_id), false, false) => Ok(ValidGenerateRequest {
                user_id: self.user_id,
                base_resume_id,
                job_description,
                role_tag,
                selected_project_ids: self.selected_project_ids,
            }),
            _ => Err(AppError::Validation(
                "Base resume, job description, and role tag are required".to_string(),
            )),
        }
    }
}

pub fn project_brief(row: &ProjectRow) -> ProjectBrief {
    ProjectBrief {
        title: row.title.clone(),
        tech_stack: row.tech_stack.clone(),
        description: row.description.clone(),
        bullets: row.bullets.clone(),
        impact: row.impact.clone(),
    }
}

/// Keywords then required skills, first spelling kept, case-insensitive dedup.
fn keyword_bag(analysis: &TargetAnalysis) -> Vec<String> {
    let mut seen = HashSet::new();
    analysis
        .keywords
        .iter()
        .chain(analysis.required_skills.iter())
        .filter(|k| seen.insert(k.to_lowercase()))
        .cloned()
        .collect()
}

/// Runs the two collaborator calls and snapshots the result.
pub async fn tailor_artifact(
    text_gen: &dyn TextGenerator,
    request: &ValidGenerateRequest,
    base_content: &ResumeContent,
    base_template: &TemplateStructure,
    projects: Vec<ProjectBrief>,
) -> Result<GeneratedArtifact, AppError> {
    info!(
        "Analyzing job description for user {} ({})",
        request.user_id, request.role_tag
    );
    let analysis = text_gen.analyze_target(&request.job_description).await?;
    let keywords = keyword_bag(&analysis);

    let tailor_request = TailorRequest {
        base: base_content.clone(),
        projects,
        analysis,
        structure: base_template.clone(),
    };
    let raw = text_gen.tailor(&tailor_request).await?;

    let score = ats_score(&raw);
    let content = normalize(&raw);
    info!(
        "Tailored resume for user {}: {} keywords, atsScore={:?}",
        request.user_id,
        keywords.len(),
        score
    );

    Ok(GeneratedArtifact::create(ArtifactSnapshot {
        user_id: request.user_id,
        base_resume_id: request.base_resume_id,
        role_tag: request.role_tag.clone(),
        keywords,
        content,
        structure: base_template.clone(),
        ats_score: score,
    }))
}
