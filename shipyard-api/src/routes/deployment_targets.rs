use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::apps::deployment_target::{
    DeploymentTarget, DeploymentTargetError, deployment_target_details,
};
use crate::control_plane::ControlPlaneClient;
use crate::db::Repository;
use crate::routes::{ErrorMessage, ScopeError, error_response, resolve_scope};

#[derive(Debug, Error)]
pub enum DeploymentTargetsError {
    #[error(transparent)]
    DeploymentTarget(#[from] DeploymentTargetError),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl ResponseError for DeploymentTargetsError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeploymentTargetsError::DeploymentTarget(e) => e.status_code(),
            DeploymentTargetsError::Scope(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DeploymentTargetsError::Scope(e) => e.to_message(),
            e => e.to_string(),
        };
        error_response(self.status_code(), message)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadDeploymentTargetResponse {
    pub deployment_target: DeploymentTarget,
}

#[utoipa::path(
    summary = "Get a deployment target",
    description = "Returns a deployment target of the cluster as known to the control plane.",
    params(
        ("project_id" = i64, Path, description = "Id of the project"),
        ("cluster_id" = i64, Path, description = "Id of the cluster"),
        ("deployment_target_id" = String, Path, description = "Id of the deployment target"),
    ),
    responses(
        (status = 200, description = "Deployment target", body = ReadDeploymentTargetResponse),
        (status = 400, description = "Bad request", body = ErrorMessage),
        (status = 404, description = "Deployment target not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Deployment Targets"
)]
#[get("/projects/{project_id}/clusters/{cluster_id}/deployment-targets/{deployment_target_id}")]
#[tracing::instrument(
    name = "read_deployment_target",
    skip_all,
    fields(project_id = path.0, cluster_id = path.1, deployment_target_id = %path.2)
)]
pub async fn read_deployment_target(
    repository: Data<dyn Repository>,
    control_plane: Data<dyn ControlPlaneClient>,
    path: Path<(i64, i64, String)>,
) -> Result<impl Responder, DeploymentTargetsError> {
    let (project_id, cluster_id, deployment_target_id) = path.into_inner();

    let (project, cluster) = resolve_scope(&**repository, project_id, cluster_id).await?;

    let deployment_target =
        deployment_target_details(&**control_plane, project.id, cluster.id, &deployment_target_id)
            .await?;

    let response = ReadDeploymentTargetResponse { deployment_target };

    Ok(Json(response))
}
