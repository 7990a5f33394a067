use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::find_user;
use crate::errors::AppError;
use crate::ingest::{self, SyncSettings};
use crate::models::project::{NewProject, ProjectRow, ProjectSource};
use crate::projects::guard::SyncGuard;
use crate::projects::store::{self, ProjectChanges};
use crate::state::AppState;
use crate::text_gen::{BulletSynthesis, ProjectFacts};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(alias = "user_id")]
    pub user_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(alias = "user_id")]
    pub user_id: Uuid,
    pub title: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub bullets: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct SyncRequest {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub imported: usize,
    pub projects: Vec<ProjectRow>,
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// GET /api/v1/projects
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    Ok(Json(store::list(&state.db, params.user_id).await?))
}

/// POST /api/v1/projects
///
/// Bullet synthesis is best-effort: on failure the project is stored without bullets.
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Project title is required".to_string()));
    }
    let tech_stack = clean_list(req.tech_stack);
    let description = req.description.trim().to_string();

    let facts = ProjectFacts {
        title: title.clone(),
        tech_stack: tech_stack.clone(),
        description: description.clone(),
        ..Default::default()
    };
    let synthesis = match tokio::time::timeout(
        state.config.collaborator_timeout,
        state.text_gen.synthesize_bullets(&facts),
    )
    .await
    {
        Ok(Ok(s)) => s.cleaned(),
        Ok(Err(e)) => {
            warn!("bullet synthesis failed for manual project '{title}': {e}");
            BulletSynthesis::default()
        }
        Err(_) => {
            warn!("bullet synthesis timed out for manual project '{title}'");
            BulletSynthesis::default()
        }
    };

    let project = NewProject {
        title,
        tech_stack,
        description,
        impact: req.impact.trim().to_string(),
        bullets: synthesis.bullets,
        source: ProjectSource::Manual,
        origin: None,
    };
    let row = store::insert(&state.db, req.user_id, &project)
        .await?
        .ok_or_else(|| AppError::Conflict("Project already exists".to_string()))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/projects/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectRow>, AppError> {
    let title = req.title.map(|t| t.trim().to_string());
    if title.as_deref() == Some("") {
        return Err(AppError::Validation("Project title cannot be empty".to_string()));
    }
    let changes = ProjectChanges {
        title,
        tech_stack: req.tech_stack.map(clean_list),
        description: req.description.map(|d| d.trim().to_string()),
        impact: req.impact.map(|i| i.trim().to_string()),
        bullets: req.bullets.map(clean_list),
    };
    Ok(Json(store::update(&state.db, req.user_id, id, changes).await?))
}

/// DELETE /api/v1/projects/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/github/sync
pub async fn handle_github_sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let user = find_user(&state.db, req.user_id).await?;
    let (token, username) = user.github_link().ok_or_else(|| {
        AppError::Validation(
            "GitHub is not connected for this user; link an account first".to_string(),
        )
    })?;

    let guard = SyncGuard::acquire(&state.redis, user.id).await?;

    let existing = match store::existing_external_urls(&state.db, user.id).await {
        Ok(urls) => urls,
        Err(e) => {
            guard.release().await;
            return Err(e);
        }
    };
    let settings = SyncSettings {
        candidate_limit: state.config.sync_candidate_limit,
        call_timeout: state.config.collaborator_timeout,
    };
    let drafts = ingest::sync(
        Arc::clone(&state.repos),
        Arc::clone(&state.text_gen),
        token,
        username,
        &existing,
        settings,
    )
    .await;

    let result = match drafts {
        Ok(drafts) => persist_imports(&state, user.id, &drafts).await,
        Err(e) => Err(e),
    };
    guard.release().await;

    let projects = result?;
    info!("Imported {} GitHub projects for user {}", projects.len(), user.id);
    Ok(Json(SyncResponse {
        imported: projects.len(),
        projects,
    }))
}

/// Stores drafts in rank order. A draft that loses the uniqueness race to a
/// concurrent sync is skipped.
async fn persist_imports(
    state: &AppState,
    user_id: Uuid,
    drafts: &[NewProject],
) -> Result<Vec<ProjectRow>, AppError> {
    let mut stored = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match store::insert(&state.db, user_id, draft).await? {
            Some(row) => stored.push(row),
            None => info!(
                "Skipped already-imported {}",
                draft.external_url().unwrap_or(&draft.title)
            ),
        }
    }
    Ok(stored)
}
