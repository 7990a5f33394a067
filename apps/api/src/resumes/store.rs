use aws_sdk_s3::primitives::ByteStream;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::document::{ResumeContent, TemplateStructure};
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummaryRow};

pub struct NewResume<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub original_file_name: &'a str,
    pub s3_key: &'a str,
    pub raw_text: &'a str,
    pub content: &'a ResumeContent,
    pub template: &'a TemplateStructure,
}

/// `resumes/{user_id}/{resume_id}/{file}`; path separators in the file name
/// are flattened.
pub fn source_key(user_id: Uuid, resume_id: Uuid, file_name: &str) -> String {
    let file = file_name.replace(['/', '\\'], "_");
    format!("resumes/{user_id}/{resume_id}/{file}")
}

pub async fn upload_source(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;
    info!("Uploaded resume source to s3://{bucket}/{key}");
    Ok(())
}

pub async fn insert(pool: &PgPool, resume: NewResume<'_>) -> Result<ResumeRow, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, title, original_file_name, s3_key, raw_text, content, template)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(resume.id)
    .bind(resume.user_id)
    .bind(resume.title)
    .bind(resume.original_file_name)
    .bind(resume.s3_key)
    .bind(resume.raw_text)
    .bind(Json(resume.content))
    .bind(Json(resume.template))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeSummaryRow>, AppError> {
    Ok(sqlx::query_as::<_, ResumeSummaryRow>(
        r#"
        SELECT id, title, original_file_name, template, created_at
        FROM resumes
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn find(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_layout() {
        let user = Uuid::nil();
        let resume = Uuid::from_u128(1);
        assert_eq!(
            source_key(user, resume, "../cv.pdf"),
            format!("resumes/{user}/{resume}/.._cv.pdf")
        );
    }
}
