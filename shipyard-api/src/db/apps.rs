use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AppsDbError {
    #[error("Error while interacting with Postgres for apps: {0}")]
    Database(#[from] sqlx::Error),
}

/// An app as registered with the API. Revisions of the app live in the
/// control plane and reference it by `id`.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct App {
    #[schema(example = 1)]
    pub id: i64,
    pub project_id: i64,
    pub cluster_id: i64,
    pub name: String,
    pub repo_name: Option<String>,
    pub git_branch: Option<String>,
    pub git_repo_id: Option<i64>,
    pub build_context: Option<String>,
    pub builder: Option<String>,
    /// Comma separated list.
    pub buildpacks: Option<String>,
    pub dockerfile: Option<String>,
    pub image_repo_uri: Option<String>,
    pub app_yaml_path: Option<String>,
    pub pull_request_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const APP_COLUMNS: &str = r#"
    id, project_id, cluster_id, name, repo_name, git_branch, git_repo_id,
    build_context, builder, buildpacks, dockerfile, image_repo_uri,
    app_yaml_path, pull_request_url, created_at, updated_at
"#;

/// Reads every live app named `name` across the clusters of a project.
pub async fn read_apps_by_project_id_and_name<'c, E>(
    executor: E,
    project_id: i64,
    name: &str,
) -> Result<Vec<App>, AppsDbError>
where
    E: PgExecutor<'c>,
{
    let query = format!(
        r#"
        select {APP_COLUMNS}
        from app.apps
        where project_id = $1 and name = $2 and deleted_at is null
        order by id
        "#
    );

    let apps = sqlx::query_as::<_, App>(&query)
        .bind(project_id)
        .bind(name)
        .fetch_all(executor)
        .await?;

    Ok(apps)
}

pub async fn read_app_by_cluster_id_and_name<'c, E>(
    executor: E,
    cluster_id: i64,
    name: &str,
) -> Result<Option<App>, AppsDbError>
where
    E: PgExecutor<'c>,
{
    let query = format!(
        r#"
        select {APP_COLUMNS}
        from app.apps
        where cluster_id = $1 and name = $2 and deleted_at is null
        "#
    );

    let app = sqlx::query_as::<_, App>(&query)
        .bind(cluster_id)
        .bind(name)
        .fetch_optional(executor)
        .await?;

    Ok(app)
}
