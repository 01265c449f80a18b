use actix_web::http::StatusCode;
use async_trait::async_trait;
use shipyard_proto::{AppRevision, DeploymentTarget};
use thiserror::Error;
use tonic::Code;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("The control plane rejected the call with {}: {}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),

    #[error("The control plane endpoint is invalid: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ControlPlaneError {
    /// HTTP status a failed call is passed through to the client as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ControlPlaneError::Status(status) => match status.code() {
                Code::NotFound => StatusCode::NOT_FOUND,
                Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
                    StatusCode::BAD_REQUEST
                }
                Code::Unavailable | Code::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ControlPlaneError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Calls the API makes to the cluster control plane.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Returns the revision currently applied for an app on a deployment target.
    async fn current_app_revision(
        &self,
        project_id: i64,
        app_id: i64,
        deployment_target_id: &str,
    ) -> Result<Option<AppRevision>, ControlPlaneError>;

    /// Returns the latest revision of every app on a deployment target.
    async fn latest_app_revisions(
        &self,
        project_id: i64,
        deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError>;

    /// Returns the revisions of an app on a deployment target, newest first.
    async fn list_app_revisions(
        &self,
        project_id: i64,
        app_id: i64,
        deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError>;

    async fn deployment_target_details(
        &self,
        project_id: i64,
        deployment_target_id: &str,
    ) -> Result<Option<DeploymentTarget>, ControlPlaneError>;
}
