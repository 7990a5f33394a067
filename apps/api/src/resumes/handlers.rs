use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::db::find_user;
use crate::document::{normalize, normalize_template};
use crate::errors::AppError;
use crate::extract::{extract_text_blocking, ExtractFormat};
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::resumes::store::{self, NewResume};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    user_id: Option<Uuid>,
    title: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("Malformed upload: {e}"))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let raw = field.text().await.map_err(bad_form)?;
                let id = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                form.user_id = Some(id);
            }
            Some("title") => {
                let title = field.text().await.map_err(bad_form)?;
                form.title = Some(title.trim().to_string()).filter(|t| !t.is_empty());
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                form.file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

fn default_title(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
        .to_string()
}

/// POST /api/v1/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let form = read_form(multipart).await?;
    let user_id = form
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let (file_name, bytes) = form
        .file
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation("Please upload a resume file".to_string()))?;
    let format = ExtractFormat::from_filename(&file_name)?;

    find_user(&state.db, user_id).await?;

    let raw_text = extract_text_blocking(bytes.clone(), format).await?;
    let structured = state.text_gen.structure(&raw_text).await?;
    let content = normalize(&structured);
    let template = normalize_template(&structured);

    let resume_id = Uuid::new_v4();
    let s3_key = store::source_key(user_id, resume_id, &file_name);
    let content_type = match format {
        ExtractFormat::Pdf => "application/pdf",
        ExtractFormat::Docx => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
    };
    store::upload_source(&state.s3, &state.config.s3_bucket, &s3_key, bytes, content_type).await?;

    let title = form.title.unwrap_or_else(|| default_title(&file_name));
    let row = store::insert(
        &state.db,
        NewResume {
            id: resume_id,
            user_id,
            title: &title,
            original_file_name: &file_name,
            s3_key: &s3_key,
            raw_text: &raw_text,
            content: &content,
            template: &template,
        },
    )
    .await?;

    info!(
        "Stored resume {resume_id} for user {user_id} ({} sections in template)",
        template.section_order.len()
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeSummaryRow>>, AppError> {
    Ok(Json(store::list(&state.db, params.user_id).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(store::find(&state.db, params.user_id, id).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_strips_extension() {
        assert_eq!(default_title("Jane Doe CV.pdf"), "Jane Doe CV");
        assert_eq!(default_title("resume"), "resume");
    }
}
