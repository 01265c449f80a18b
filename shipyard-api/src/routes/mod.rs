use actix_web::{
    HttpResponse,
    http::{StatusCode, header::ContentType},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::Repository;
use crate::db::clusters::{Cluster, ClustersDbError};
use crate::db::projects::{Project, ProjectsDbError};

pub mod app_revisions;
pub mod deployment_targets;
pub mod health_check;
pub mod metrics;
pub mod pods;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = "an error occurred in the api")]
    pub error: String,
}

/// Builds the JSON error body every route error renders as.
pub(crate) fn error_response(status: StatusCode, message: String) -> HttpResponse {
    let error_message = ErrorMessage { error: message };
    let body = serde_json::to_string(&error_message).expect("failed to serialize error message");
    HttpResponse::build(status)
        .insert_header(ContentType::json())
        .body(body)
}

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("The project with id {0} was not found")]
    ProjectNotFound(i64),

    #[error("The cluster with id {0} was not found")]
    ClusterNotFound(i64),

    #[error(transparent)]
    ProjectsDb(#[from] ProjectsDbError),

    #[error(transparent)]
    ClustersDb(#[from] ClustersDbError),
}

impl ScopeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScopeError::ProjectNotFound(_) | ScopeError::ClusterNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ScopeError::ProjectsDb(_) | ScopeError::ClustersDb(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            ScopeError::ProjectsDb(_) | ScopeError::ClustersDb(_) => {
                "internal server error".to_string()
            }
            e => e.to_string(),
        }
    }
}

/// Resolves the project and the cluster a `/projects/{project_id}/clusters/{cluster_id}`
/// request is scoped to. The cluster must belong to the project.
pub async fn resolve_scope(
    repository: &dyn Repository,
    project_id: i64,
    cluster_id: i64,
) -> Result<(Project, Cluster), ScopeError> {
    let project = repository
        .read_project(project_id)
        .await?
        .ok_or(ScopeError::ProjectNotFound(project_id))?;

    let cluster = repository
        .read_cluster(project.id, cluster_id)
        .await?
        .ok_or(ScopeError::ClusterNotFound(cluster_id))?;

    Ok((project, cluster))
}
