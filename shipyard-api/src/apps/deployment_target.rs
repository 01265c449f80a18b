use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::control_plane::{ControlPlaneClient, ControlPlaneError};

#[derive(Debug, Error)]
pub enum DeploymentTargetError {
    #[error("The deployment target id {0} is not a valid uuid")]
    InvalidId(String),

    #[error("The deployment target id must not be the nil uuid")]
    NilId,

    #[error("The deployment target {0} was not found")]
    NotFound(Uuid),

    #[error("The deployment target {id} belongs to cluster {actual} instead of cluster {expected}")]
    ClusterMismatch { id: Uuid, expected: i64, actual: i64 },

    #[error("The control plane returned a deployment target with an invalid id {0}")]
    InvalidUpstreamId(String),

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

impl DeploymentTargetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeploymentTargetError::InvalidId(_)
            | DeploymentTargetError::NilId
            | DeploymentTargetError::ClusterMismatch { .. } => StatusCode::BAD_REQUEST,
            DeploymentTargetError::NotFound(_) => StatusCode::NOT_FOUND,
            DeploymentTargetError::InvalidUpstreamId(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeploymentTargetError::ControlPlane(err) => err.status_code(),
        }
    }
}

/// A deployment target resolved against the cluster of the request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub id: Uuid,
    #[schema(example = 1)]
    pub project_id: i64,
    #[schema(example = 1)]
    pub cluster_id: i64,
    #[schema(example = "default")]
    pub namespace: String,
    #[schema(example = "default")]
    pub name: String,
    pub is_preview: bool,
}

/// Parses a deployment target id, rejecting the nil uuid.
pub fn parse_deployment_target_id(id: &str) -> Result<Uuid, DeploymentTargetError> {
    let id = Uuid::parse_str(id).map_err(|_| DeploymentTargetError::InvalidId(id.to_string()))?;
    if id.is_nil() {
        return Err(DeploymentTargetError::NilId);
    }

    Ok(id)
}

/// Fetches a deployment target from the control plane and checks that it
/// belongs to `cluster_id`.
pub async fn deployment_target_details(
    client: &dyn ControlPlaneClient,
    project_id: i64,
    cluster_id: i64,
    deployment_target_id: &str,
) -> Result<DeploymentTarget, DeploymentTargetError> {
    let id = parse_deployment_target_id(deployment_target_id)?;

    let target = client
        .deployment_target_details(project_id, &id.to_string())
        .await?
        .ok_or(DeploymentTargetError::NotFound(id))?;

    if target.cluster_id != cluster_id {
        return Err(DeploymentTargetError::ClusterMismatch {
            id,
            expected: cluster_id,
            actual: target.cluster_id,
        });
    }

    let target_id = Uuid::parse_str(&target.id)
        .map_err(|_| DeploymentTargetError::InvalidUpstreamId(target.id.clone()))?;

    Ok(DeploymentTarget {
        id: target_id,
        project_id: target.project_id,
        cluster_id: target.cluster_id,
        namespace: target.namespace,
        name: target.name,
        is_preview: target.is_preview,
    })
}
