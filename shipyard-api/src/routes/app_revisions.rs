use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path, Query},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Span;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::apps::notifications::{Notification, collect_notifications};
use crate::apps::revision::{EncodeRevisionError, EncodedRevision};
use crate::control_plane::{ControlPlaneClient, ControlPlaneError};
use crate::db::Repository;
use crate::db::app_events::AppEventsDbError;
use crate::db::apps::{App, AppsDbError};
use crate::routes::{ErrorMessage, ScopeError, error_response, resolve_scope};

#[derive(Debug, Error)]
pub enum AppRevisionsError {
    #[error("The deployment target id {0} is not a valid uuid")]
    InvalidDeploymentTargetId(String),

    #[error("The deployment target id must not be the nil uuid")]
    NilDeploymentTargetId,

    #[error("No app named {0} was found in the project")]
    AppNotFound(String),

    #[error("{count} apps named {name} were found in the project; multi-cluster projects are not supported")]
    AmbiguousApp { name: String, count: usize },

    #[error("The app named {0} has no id")]
    MissingAppId(String),

    #[error("The control plane returned no current revision")]
    MissingRevision,

    #[error("The app revision {0} has an invalid id or app instance id")]
    InvalidRevisionIdentity(String),

    #[error("No app named {0} was found in the cluster")]
    SourceAppNotFound(String),

    #[error(transparent)]
    Encode(#[from] EncodeRevisionError),

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    AppsDb(#[from] AppsDbError),

    #[error(transparent)]
    AppEventsDb(#[from] AppEventsDbError),
}

impl AppRevisionsError {
    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            AppRevisionsError::AppsDb(_) | AppRevisionsError::AppEventsDb(_) => {
                "internal server error".to_string()
            }
            AppRevisionsError::Scope(e) => e.to_message(),
            // Every other message is ok, as they do not divulge sensitive information
            e => e.to_string(),
        }
    }
}

impl ResponseError for AppRevisionsError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppRevisionsError::InvalidDeploymentTargetId(_)
            | AppRevisionsError::NilDeploymentTargetId
            | AppRevisionsError::AppNotFound(_)
            | AppRevisionsError::AmbiguousApp { .. } => StatusCode::BAD_REQUEST,
            AppRevisionsError::MissingAppId(_)
            | AppRevisionsError::MissingRevision
            | AppRevisionsError::InvalidRevisionIdentity(_)
            | AppRevisionsError::SourceAppNotFound(_)
            | AppRevisionsError::Encode(_)
            | AppRevisionsError::AppsDb(_)
            | AppRevisionsError::AppEventsDb(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppRevisionsError::ControlPlane(e) => e.status_code(),
            AppRevisionsError::Scope(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.to_message())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeploymentTargetQuery {
    /// Id of the deployment target the revisions are deployed to.
    pub deployment_target_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LatestAppRevisionResponse {
    pub app_revision: EncodedRevision,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevisionWithSource {
    pub app_revision: EncodedRevision,
    pub source: App,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LatestAppRevisionsResponse {
    pub app_revisions: Vec<RevisionWithSource>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAppRevisionsResponse {
    pub app_revisions: Vec<EncodedRevision>,
}

fn parse_deployment_target_id(id: &str) -> Result<Uuid, AppRevisionsError> {
    Uuid::parse_str(id).map_err(|_| AppRevisionsError::InvalidDeploymentTargetId(id.to_string()))
}

/// Finds the id of the only app named `app_name` in the project.
async fn read_app_id(
    repository: &dyn Repository,
    project_id: i64,
    app_name: &str,
) -> Result<i64, AppRevisionsError> {
    let apps = repository
        .read_apps_by_project_id_and_name(project_id, app_name)
        .await?;

    let app = match apps.as_slice() {
        [] => return Err(AppRevisionsError::AppNotFound(app_name.to_string())),
        [app] => app,
        apps => {
            return Err(AppRevisionsError::AmbiguousApp {
                name: app_name.to_string(),
                count: apps.len(),
            });
        }
    };

    if app.id == 0 {
        return Err(AppRevisionsError::MissingAppId(app_name.to_string()));
    }

    Span::current().record("app_id", app.id);

    Ok(app.id)
}

#[utoipa::path(
    summary = "Get the current revision of an app",
    description = "Returns the revision currently applied for an app on a deployment target, with the notifications raised against it.",
    params(
        ("project_id" = i64, Path, description = "Id of the project"),
        ("cluster_id" = i64, Path, description = "Id of the cluster"),
        ("app_name" = String, Path, description = "Name of the app"),
        DeploymentTargetQuery,
    ),
    responses(
        (status = 200, description = "Current app revision", body = LatestAppRevisionResponse),
        (status = 400, description = "Bad request", body = ErrorMessage),
        (status = 404, description = "Project or cluster not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Apps"
)]
#[get("/projects/{project_id}/clusters/{cluster_id}/apps/{app_name}/latest")]
#[tracing::instrument(
    name = "latest_app_revision",
    skip_all,
    fields(
        project_id = path.0,
        cluster_id = path.1,
        app_name = %path.2,
        deployment_target_id = %query.deployment_target_id,
        app_id = tracing::field::Empty,
        app_revision_id = tracing::field::Empty,
        app_instance_id = tracing::field::Empty,
        notifications_dropped = tracing::field::Empty,
        notification_conversion_error = tracing::field::Empty,
    )
)]
pub async fn latest_app_revision(
    repository: Data<dyn Repository>,
    control_plane: Data<dyn ControlPlaneClient>,
    path: Path<(i64, i64, String)>,
    query: Query<DeploymentTargetQuery>,
) -> Result<impl Responder, AppRevisionsError> {
    let (project_id, cluster_id, app_name) = path.into_inner();
    let query = query.into_inner();

    let (project, _cluster) = resolve_scope(&**repository, project_id, cluster_id).await?;
    let deployment_target_id = parse_deployment_target_id(&query.deployment_target_id)?;

    let app_id = read_app_id(&**repository, project.id, &app_name).await?;

    let revision = control_plane
        .current_app_revision(project.id, app_id, &deployment_target_id.to_string())
        .await?
        .ok_or(AppRevisionsError::MissingRevision)?;

    let app_revision = EncodedRevision::from_proto(&revision)?;

    let span = Span::current();
    span.record("app_revision_id", app_revision.id.as_str());
    span.record("app_instance_id", app_revision.app_instance_id.as_str());

    let app_revision_id = Uuid::parse_str(&app_revision.id)
        .map_err(|_| AppRevisionsError::InvalidRevisionIdentity(app_revision.id.clone()))?;
    let app_instance_id = Uuid::parse_str(&app_revision.app_instance_id)
        .map_err(|_| AppRevisionsError::InvalidRevisionIdentity(app_revision.id.clone()))?;

    let events = repository
        .read_notifications_by_app_revision_id(app_instance_id, app_revision_id)
        .await?;
    let collected = collect_notifications(events);
    if collected.dropped > 0 {
        span.record("notifications_dropped", collected.dropped);
    }
    if let Some(reason) = &collected.last_drop_reason {
        span.record("notification_conversion_error", reason.as_str());
    }

    let response = LatestAppRevisionResponse {
        app_revision,
        notifications: collected.notifications,
    };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "Get the latest revision of every app",
    description = "Returns the latest revision of every app deployed to a deployment target, each with the app it belongs to.",
    params(
        ("project_id" = i64, Path, description = "Id of the project"),
        ("cluster_id" = i64, Path, description = "Id of the cluster"),
        DeploymentTargetQuery,
    ),
    responses(
        (status = 200, description = "Latest app revisions", body = LatestAppRevisionsResponse),
        (status = 400, description = "Bad request", body = ErrorMessage),
        (status = 404, description = "Project or cluster not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Apps"
)]
#[get("/projects/{project_id}/clusters/{cluster_id}/apps/revisions")]
#[tracing::instrument(
    name = "latest_app_revisions",
    skip_all,
    fields(
        project_id = path.0,
        cluster_id = path.1,
        deployment_target_id = %query.deployment_target_id,
        revision_count = tracing::field::Empty,
    )
)]
pub async fn latest_app_revisions(
    repository: Data<dyn Repository>,
    control_plane: Data<dyn ControlPlaneClient>,
    path: Path<(i64, i64)>,
    query: Query<DeploymentTargetQuery>,
) -> Result<impl Responder, AppRevisionsError> {
    let (project_id, cluster_id) = path.into_inner();
    let query = query.into_inner();

    let (project, cluster) = resolve_scope(&**repository, project_id, cluster_id).await?;

    let deployment_target_id = parse_deployment_target_id(&query.deployment_target_id)?;
    if deployment_target_id.is_nil() {
        return Err(AppRevisionsError::NilDeploymentTargetId);
    }

    let revisions = control_plane
        .latest_app_revisions(project.id, &deployment_target_id.to_string())
        .await?;
    Span::current().record("revision_count", revisions.len());

    let mut app_revisions = Vec::with_capacity(revisions.len());
    for revision in revisions {
        let app_revision = EncodedRevision::from_proto(&revision)?;

        let app_name = revision
            .app
            .as_ref()
            .map(|app| app.name.as_str())
            .unwrap_or_default();
        let source = repository
            .read_app_by_cluster_id_and_name(cluster.id, app_name)
            .await?
            .ok_or_else(|| AppRevisionsError::SourceAppNotFound(app_name.to_string()))?;

        app_revisions.push(RevisionWithSource {
            app_revision,
            source,
        });
    }

    let response = LatestAppRevisionsResponse { app_revisions };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "List the revisions of an app",
    description = "Returns the revision history of an app on a deployment target, newest first.",
    params(
        ("project_id" = i64, Path, description = "Id of the project"),
        ("cluster_id" = i64, Path, description = "Id of the cluster"),
        ("app_name" = String, Path, description = "Name of the app"),
        DeploymentTargetQuery,
    ),
    responses(
        (status = 200, description = "App revisions", body = ListAppRevisionsResponse),
        (status = 400, description = "Bad request", body = ErrorMessage),
        (status = 404, description = "Project or cluster not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage),
    ),
    tag = "Apps"
)]
#[get("/projects/{project_id}/clusters/{cluster_id}/apps/{app_name}/revisions")]
#[tracing::instrument(
    name = "list_app_revisions",
    skip_all,
    fields(
        project_id = path.0,
        cluster_id = path.1,
        app_name = %path.2,
        deployment_target_id = %query.deployment_target_id,
        app_id = tracing::field::Empty,
    )
)]
pub async fn list_app_revisions(
    repository: Data<dyn Repository>,
    control_plane: Data<dyn ControlPlaneClient>,
    path: Path<(i64, i64, String)>,
    query: Query<DeploymentTargetQuery>,
) -> Result<impl Responder, AppRevisionsError> {
    let (project_id, cluster_id, app_name) = path.into_inner();
    let query = query.into_inner();

    let (project, _cluster) = resolve_scope(&**repository, project_id, cluster_id).await?;
    let deployment_target_id = parse_deployment_target_id(&query.deployment_target_id)?;

    let app_id = read_app_id(&**repository, project.id, &app_name).await?;

    let revisions = control_plane
        .list_app_revisions(project.id, app_id, &deployment_target_id.to_string())
        .await?;

    let app_revisions = revisions
        .iter()
        .map(EncodedRevision::from_proto)
        .collect::<Result<Vec<_>, _>>()?;

    let response = ListAppRevisionsResponse { app_revisions };

    Ok(Json(response))
}
