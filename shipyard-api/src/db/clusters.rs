use sqlx::PgExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClustersDbError {
    #[error("Error while interacting with Postgres for clusters: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cluster {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    /// Kubeconfig context used to reach the cluster. `None` means the ambient
    /// configuration of the API process.
    pub kube_context: Option<String>,
}

/// Reads a cluster only if it belongs to `project_id`.
pub async fn read_cluster<'c, E>(
    executor: E,
    project_id: i64,
    cluster_id: i64,
) -> Result<Option<Cluster>, ClustersDbError>
where
    E: PgExecutor<'c>,
{
    let cluster = sqlx::query_as::<_, Cluster>(
        r#"
        select id, project_id, name, kube_context
        from app.clusters
        where project_id = $1 and id = $2
        "#,
    )
    .bind(project_id)
    .bind(cluster_id)
    .fetch_optional(executor)
    .await?;

    Ok(cluster)
}
