use sqlx::PgExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectsDbError {
    #[error("Error while interacting with Postgres for projects: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

pub async fn read_project<'c, E>(
    executor: E,
    project_id: i64,
) -> Result<Option<Project>, ProjectsDbError>
where
    E: PgExecutor<'c>,
{
    let project = sqlx::query_as::<_, Project>(
        r#"
        select id, name
        from app.projects
        where id = $1
        "#,
    )
    .bind(project_id)
    .fetch_optional(executor)
    .await?;

    Ok(project)
}
