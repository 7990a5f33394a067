use std::collections::HashSet;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::{NewProject, ProjectRow};

/// Partial update; `None` leaves a column unchanged.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub bullets: Option<Vec<String>>,
}

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<ProjectRow>, AppError> {
    Ok(sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Projects offered to a tailoring call: the selected ones, or all of them.
pub async fn list_for_generation(
    pool: &PgPool,
    user_id: Uuid,
    selected: &[Uuid],
) -> Result<Vec<ProjectRow>, AppError> {
    if selected.is_empty() {
        return list(pool, user_id).await;
    }
    Ok(sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE user_id = $1 AND id = ANY($2) ORDER BY created_at DESC",
    )
    .bind(user_id)
    .bind(selected)
    .fetch_all(pool)
    .await?)
}

/// External URLs this user has already imported. Read once per sync.
pub async fn existing_external_urls(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<HashSet<String>, AppError> {
    let urls: Vec<String> = sqlx::query_scalar(
        "SELECT external_url FROM projects WHERE user_id = $1 AND external_url IS NOT NULL",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(urls.into_iter().collect())
}

/// Inserts a project. Returns `None` when an imported project with the same
/// external URL already exists for this user.
pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    project: &NewProject,
) -> Result<Option<ProjectRow>, AppError> {
    Ok(sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (user_id, title, tech_stack, description, impact, bullets, source, external_url, origin)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id, external_url) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&project.title)
    .bind(&project.tech_stack)
    .bind(&project.description)
    .bind(&project.impact)
    .bind(&project.bullets)
    .bind(project.source.as_str())
    .bind(project.external_url())
    .bind(project.origin.as_ref().map(Json))
    .fetch_optional(pool)
    .await?)
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    changes: ProjectChanges,
) -> Result<ProjectRow, AppError> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE projects SET
            title       = COALESCE($3, title),
            tech_stack  = COALESCE($4, tech_stack),
            description = COALESCE($5, description),
            impact      = COALESCE($6, impact),
            bullets     = COALESCE($7, bullets),
            updated_at  = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(changes.title)
    .bind(changes.tech_stack)
    .bind(changes.description)
    .bind(changes.impact)
    .bind(changes.bullets)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }
    Ok(())
}
