use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::app_events::{self, AppEvent, AppEventsDbError};
use crate::db::apps::{self, App, AppsDbError};
use crate::db::clusters::{self, Cluster, ClustersDbError};
use crate::db::projects::{self, Project, ProjectsDbError};
use crate::db::Repository;

/// [`Repository`] backed by the API's Postgres database.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn read_project(&self, project_id: i64) -> Result<Option<Project>, ProjectsDbError> {
        projects::read_project(&self.pool, project_id).await
    }

    async fn read_cluster(
        &self,
        project_id: i64,
        cluster_id: i64,
    ) -> Result<Option<Cluster>, ClustersDbError> {
        clusters::read_cluster(&self.pool, project_id, cluster_id).await
    }

    async fn read_apps_by_project_id_and_name(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Vec<App>, AppsDbError> {
        apps::read_apps_by_project_id_and_name(&self.pool, project_id, name).await
    }

    async fn read_app_by_cluster_id_and_name(
        &self,
        cluster_id: i64,
        name: &str,
    ) -> Result<Option<App>, AppsDbError> {
        apps::read_app_by_cluster_id_and_name(&self.pool, cluster_id, name).await
    }

    async fn read_notifications_by_app_revision_id(
        &self,
        app_instance_id: Uuid,
        app_revision_id: Uuid,
    ) -> Result<Vec<AppEvent>, AppEventsDbError> {
        app_events::read_notifications_by_app_revision_id(
            &self.pool,
            app_instance_id,
            app_revision_id,
        )
        .await
    }
}
