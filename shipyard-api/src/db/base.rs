use async_trait::async_trait;
use uuid::Uuid;

use crate::db::app_events::{AppEvent, AppEventsDbError};
use crate::db::apps::{App, AppsDbError};
use crate::db::clusters::{Cluster, ClustersDbError};
use crate::db::projects::{Project, ProjectsDbError};

/// Read access to the records the API owns.
///
/// Handlers depend on this trait rather than on a pool so that the server can
/// run against an in-memory implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn read_project(&self, project_id: i64) -> Result<Option<Project>, ProjectsDbError>;

    /// Returns the cluster only if it belongs to `project_id`.
    async fn read_cluster(
        &self,
        project_id: i64,
        cluster_id: i64,
    ) -> Result<Option<Cluster>, ClustersDbError>;

    /// Returns every app of the project with this name. More than one app is
    /// returned when clusters of the project share app names.
    async fn read_apps_by_project_id_and_name(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Vec<App>, AppsDbError>;

    async fn read_app_by_cluster_id_and_name(
        &self,
        cluster_id: i64,
        name: &str,
    ) -> Result<Option<App>, AppsDbError>;

    /// Returns the notification events of one app revision, newest first.
    async fn read_notifications_by_app_revision_id(
        &self,
        app_instance_id: Uuid,
        app_revision_id: Uuid,
    ) -> Result<Vec<AppEvent>, AppEventsDbError>;
}
