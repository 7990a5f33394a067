pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::generation::handlers as generated;
use crate::projects::handlers as projects;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Base resumes
        .route(
            "/api/v1/resumes/upload",
            post(resumes::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route("/api/v1/resumes", get(resumes::handle_list))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        // Projects
        .route(
            "/api/v1/projects",
            get(projects::handle_list).post(projects::handle_create),
        )
        .route(
            "/api/v1/projects/:id",
            put(projects::handle_update).delete(projects::handle_delete),
        )
        .route(
            "/api/v1/projects/github/sync",
            post(projects::handle_github_sync),
        )
        // Generated resumes
        .route(
            "/api/v1/generated",
            get(generated::handle_list).post(generated::handle_generate),
        )
        .route(
            "/api/v1/generated/:id",
            get(generated::handle_get).delete(generated::handle_delete),
        )
        .route(
            "/api/v1/generated/:id/export",
            get(generated::handle_export),
        )
        .with_state(state)
}
