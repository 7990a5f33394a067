use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::document::GeneratedArtifact;
use crate::errors::AppError;
use crate::models::generated::{GeneratedRow, GeneratedSummaryRow};

pub async fn insert(
    pool: &PgPool,
    artifact: &GeneratedArtifact,
    job_description: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO generated_resumes
            (id, user_id, base_resume_id, role_tag, job_description,
             keywords, content, template, ats_score, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(artifact.id())
    .bind(artifact.user_id())
    .bind(artifact.base_resume_id())
    .bind(artifact.role_tag())
    .bind(job_description)
    .bind(artifact.keywords())
    .bind(Json(artifact.content()))
    .bind(Json(artifact.structure()))
    .bind(artifact.ats_score())
    .bind(artifact.created_at())
    .execute(pool)
    .await?;
    Ok(())
}

/// Newest first. The base title is NULL once the base resume is deleted.
pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<GeneratedSummaryRow>, AppError> {
    Ok(sqlx::query_as::<_, GeneratedSummaryRow>(
        r#"
        SELECT g.id, g.base_resume_id, r.title AS base_resume_title,
               g.role_tag, g.keywords, g.ats_score, g.created_at
        FROM generated_resumes g
        LEFT JOIN resumes r ON r.id = g.base_resume_id
        WHERE g.user_id = $1
        ORDER BY g.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn find(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<GeneratedRow, AppError> {
    sqlx::query_as::<_, GeneratedRow>(
        "SELECT * FROM generated_resumes WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Generated resume {id} not found")))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM generated_resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Generated resume {id} not found")));
    }
    Ok(())
}
