//! Axum route handlers for tailored resume generation and export.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::document::GeneratedArtifact;
use crate::errors::AppError;
use crate::generation::generator::{project_brief, tailor_artifact, GenerateRequest};
use crate::generation::store;
use crate::models::generated::GeneratedSummaryRow;
use crate::projects::store as project_store;
use crate::render::{render_document, ExportFormat, RenderedDocument};
use crate::resumes::store as resume_store;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDetail {
    #[serde(flatten)]
    pub artifact: GeneratedArtifact,
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generated
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GeneratedDetail>), AppError> {
    let req = req.validate()?;

    let base = resume_store::find(&state.db, req.user_id, req.base_resume_id).await?;
    let projects: Vec<_> =
        project_store::list_for_generation(&state.db, req.user_id, &req.selected_project_ids)
            .await?
            .iter()
            .map(project_brief)
            .collect();

    let artifact = tailor_artifact(
        state.text_gen.as_ref(),
        &req,
        &base.content.0,
        &base.template.0,
        projects,
    )
    .await?;
    store::insert(&state.db, &artifact, &req.job_description).await?;

    info!(
        "Generated resume {} for user {} from base {}",
        artifact.id(),
        req.user_id,
        req.base_resume_id
    );
    Ok((
        StatusCode::CREATED,
        Json(GeneratedDetail {
            artifact,
            job_description: req.job_description,
        }),
    ))
}

/// GET /api/v1/generated
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<GeneratedSummaryRow>>, AppError> {
    Ok(Json(store::list(&state.db, params.user_id).await?))
}

/// GET /api/v1/generated/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<GeneratedDetail>, AppError> {
    let row = store::find(&state.db, params.user_id, id).await?;
    let job_description = row.job_description.clone();
    Ok(Json(GeneratedDetail {
        artifact: row.into_artifact(),
        job_description,
    }))
}

/// DELETE /api/v1/generated/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/generated/:id/export?format=pdf|docx
///
/// The format is checked before the artifact is loaded.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = params.format.as_deref().unwrap_or("pdf").parse()?;
    let artifact = store::find(&state.db, params.user_id, id).await?.into_artifact();
    let placement = state.config.summary_placement;

    let document = tokio::task::spawn_blocking(move || {
        render_document(
            artifact.content(),
            artifact.structure(),
            format,
            artifact.role_tag(),
            placement,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    info!(
        "Exported generated resume {id} as {} ({} bytes)",
        document.filename,
        document.bytes.len()
    );
    attachment(document)
}

fn attachment(document: RenderedDocument) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&content_disposition(&document.filename))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("bad Content-Disposition: {e}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(document.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// `attachment` with an ASCII `filename` and an RFC 5987 `filename*` for the
/// exact UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("Backend-resume.pdf"),
            "attachment; filename=\"Backend-resume.pdf\"; filename*=UTF-8''Backend-resume.pdf"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_is_a_valid_header() {
        let value = content_disposition("Ingénieur data-resume.docx");
        assert!(value.contains("filename=\"Ing_nieur data-resume.docx\""));
        assert!(value.contains("filename*=UTF-8''Ing%C3%A9nieur%20data-resume.docx"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn test_attachment_sets_headers() {
        let response = attachment(RenderedDocument {
            bytes: b"%PDF-1.3".to_vec(),
            content_type: "application/pdf",
            filename: "x-resume.pdf".to_string(),
        })
        .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"x-resume.pdf\"; filename*=UTF-8''x-resume.pdf"
        );
    }
}
