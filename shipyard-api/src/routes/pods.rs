use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::Span;
use utoipa::IntoParams;

use crate::apps::deployment_target::{DeploymentTargetError, deployment_target_details};
use crate::control_plane::ControlPlaneClient;
use crate::db::Repository;
use crate::k8s::{K8sAgentGetter, K8sError, pod_label_selector};
use crate::routes::{ErrorMessage, ScopeError, error_response, resolve_scope};

#[derive(Debug, Error)]
pub enum PodsError {
    #[error("A deployment target id must be provided")]
    MissingDeploymentTargetId,

    #[error("Failed to get a kubernetes agent for the cluster: {0}")]
    Agent(#[source] K8sError),

    #[error("Failed to list the pods of the app: {0}")]
    ListPods(#[source] K8sError),

    #[error(transparent)]
    DeploymentTarget(#[from] DeploymentTargetError),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl PodsError {
    pub fn to_message(&self) -> String {
        match self {
            // Kubernetes errors can carry cluster internals
            PodsError::Agent(_) => "failed to get a kubernetes agent for the cluster".to_string(),
            PodsError::ListPods(_) => "failed to list the pods of the app".to_string(),
            PodsError::Scope(e) => e.to_message(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for PodsError {
    fn status_code(&self) -> StatusCode {
        match self {
            PodsError::MissingDeploymentTargetId => StatusCode::BAD_REQUEST,
            PodsError::Agent(_) | PodsError::ListPods(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PodsError::DeploymentTarget(e) => e.status_code(),
            PodsError::Scope(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.to_message())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PodStatusQuery {
    /// Id of the deployment target the app runs on.
    #[serde(default)]
    pub deployment_target_id: String,
    /// Restricts the result to the pods of one service.
    #[serde(default)]
    pub service: String,
}

#[utoipa::path(
    summary = "Get the pods of an app",
    description = "Returns the Kubernetes pods of an app on a deployment target, optionally restricted to one service.",
    params(
        ("project_id" = i64, Path, description = "Id of the project"),
        ("cluster_id" = i64, Path, description = "Id of the cluster"),
        ("app_name" = String, Path, description = "Name of the app"),
        PodStatusQuery,
    ),
    responses(
        (status = 200, description = "Pods of the app", body = Vec<serde_json::Value>),
        (status = 400, description = "Bad request", body = ErrorMessage),
        (status = 404, description = "Project, cluster or deployment target not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Apps"
)]
#[get("/projects/{project_id}/clusters/{cluster_id}/apps/{app_name}/pods")]
#[tracing::instrument(
    name = "pod_status",
    skip_all,
    fields(
        project_id = path.0,
        cluster_id = path.1,
        app_name = %path.2,
        service_name = %query.service,
        deployment_target_id = %query.deployment_target_id,
        namespace = tracing::field::Empty,
        pod_count = tracing::field::Empty,
    )
)]
pub async fn pod_status(
    repository: Data<dyn Repository>,
    control_plane: Data<dyn ControlPlaneClient>,
    agent_getter: Data<dyn K8sAgentGetter>,
    path: Path<(i64, i64, String)>,
    query: Query<PodStatusQuery>,
) -> Result<impl Responder, PodsError> {
    let (project_id, cluster_id, app_name) = path.into_inner();
    let query = query.into_inner();

    let (project, cluster) = resolve_scope(&**repository, project_id, cluster_id).await?;

    if query.deployment_target_id.is_empty() {
        return Err(PodsError::MissingDeploymentTargetId);
    }

    let deployment_target = deployment_target_details(
        &**control_plane,
        project.id,
        cluster.id,
        &query.deployment_target_id,
    )
    .await?;

    let span = Span::current();
    span.record("namespace", deployment_target.namespace.as_str());

    let agent = agent_getter
        .agent(&cluster)
        .await
        .map_err(PodsError::Agent)?;

    let selector = pod_label_selector(
        &deployment_target.id.to_string(),
        &app_name,
        Some(query.service.as_str()),
    );
    let pods = agent
        .list_pods_by_label(&deployment_target.namespace, &selector)
        .await
        .map_err(PodsError::ListPods)?;
    span.record("pod_count", pods.len());

    Ok(Json(pods))
}
