#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use shipyard_api::control_plane::{ControlPlaneClient, ControlPlaneError};
use shipyard_api::db::Repository;
use shipyard_api::db::app_events::{AppEvent, AppEventsDbError, NOTIFICATION_EVENT_TYPE};
use shipyard_api::db::apps::{App, AppsDbError};
use shipyard_api::db::clusters::{Cluster, ClustersDbError};
use shipyard_api::db::projects::{Project, ProjectsDbError};
use shipyard_api::k8s::{K8sAgentGetter, K8sClient, K8sError};
use shipyard_proto::{AppRevision, AppRevisionStatus, DeploymentTarget, DeploymentTargetIdentifier};
use uuid::Uuid;

pub const PROJECT_ID: i64 = 1;
pub const CLUSTER_ID: i64 = 2;
pub const OTHER_CLUSTER_ID: i64 = 3;
pub const APP_ID: i64 = 7;
pub const APP_NAME: &str = "web";
pub const DEPLOYMENT_TARGET_ID: &str = "9f1c0e3a-4b7d-4d6e-8a1f-2b3c4d5e6f70";
pub const APP_INSTANCE_ID: &str = "5a4b3c2d-1e0f-4a9b-8c7d-6e5f4a3b2c1d";
pub const REVISION_ID: &str = "2b9f7c0e-1d3a-4e5f-9a8b-7c6d5e4f3a21";
pub const NAMESPACE: &str = "default";

/// Repository serving fixed records from memory.
#[derive(Default)]
pub struct InMemoryRepository {
    pub projects: Vec<Project>,
    pub clusters: Vec<Cluster>,
    pub apps: Vec<App>,
    pub events: Vec<AppEvent>,
    /// Makes every app event read fail.
    pub fail_events: bool,
}

impl InMemoryRepository {
    /// A project with one cluster and one app named [`APP_NAME`] on it.
    pub fn with_app() -> Self {
        Self {
            projects: vec![Project {
                id: PROJECT_ID,
                name: "shipyard".to_string(),
            }],
            clusters: vec![Cluster {
                id: CLUSTER_ID,
                project_id: PROJECT_ID,
                name: "main".to_string(),
                kube_context: None,
            }],
            apps: vec![app(APP_ID, CLUSTER_ID, APP_NAME)],
            ..Default::default()
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn read_project(&self, project_id: i64) -> Result<Option<Project>, ProjectsDbError> {
        Ok(self.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn read_cluster(
        &self,
        project_id: i64,
        cluster_id: i64,
    ) -> Result<Option<Cluster>, ClustersDbError> {
        Ok(self
            .clusters
            .iter()
            .find(|c| c.id == cluster_id && c.project_id == project_id)
            .cloned())
    }

    async fn read_apps_by_project_id_and_name(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<Vec<App>, AppsDbError> {
        Ok(self
            .apps
            .iter()
            .filter(|a| a.project_id == project_id && a.name == name)
            .cloned()
            .collect())
    }

    async fn read_app_by_cluster_id_and_name(
        &self,
        cluster_id: i64,
        name: &str,
    ) -> Result<Option<App>, AppsDbError> {
        Ok(self
            .apps
            .iter()
            .find(|a| a.cluster_id == cluster_id && a.name == name)
            .cloned())
    }

    async fn read_notifications_by_app_revision_id(
        &self,
        app_instance_id: Uuid,
        app_revision_id: Uuid,
    ) -> Result<Vec<AppEvent>, AppEventsDbError> {
        if self.fail_events {
            return Err(AppEventsDbError::Database(sqlx::Error::PoolTimedOut));
        }

        let revision_id = app_revision_id.to_string();
        let mut events: Vec<AppEvent> = self
            .events
            .iter()
            .filter(|e| e.event_type == NOTIFICATION_EVENT_TYPE)
            .filter(|e| e.app_instance_id == Some(app_instance_id))
            .filter(|e| e.metadata["app_revision_id"] == revision_id.as_str())
            .cloned()
            .collect();
        // Newest first, like the Postgres query.
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(events)
    }
}

/// Control plane answering from fixed revisions and deployment targets.
#[derive(Default)]
pub struct MockControlPlane {
    pub current: Option<AppRevision>,
    pub latest: Vec<AppRevision>,
    pub history: Vec<AppRevision>,
    pub deployment_targets: Vec<DeploymentTarget>,
    /// Makes every call fail with this code.
    pub failure: Option<tonic::Code>,
}

impl MockControlPlane {
    fn check(&self) -> Result<(), ControlPlaneError> {
        match self.failure {
            Some(code) => Err(tonic::Status::new(code, "mock control plane failure").into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ControlPlaneClient for MockControlPlane {
    async fn current_app_revision(
        &self,
        _project_id: i64,
        _app_id: i64,
        _deployment_target_id: &str,
    ) -> Result<Option<AppRevision>, ControlPlaneError> {
        self.check()?;
        Ok(self.current.clone())
    }

    async fn latest_app_revisions(
        &self,
        _project_id: i64,
        _deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError> {
        self.check()?;
        Ok(self.latest.clone())
    }

    async fn list_app_revisions(
        &self,
        _project_id: i64,
        _app_id: i64,
        _deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError> {
        self.check()?;
        Ok(self.history.clone())
    }

    async fn deployment_target_details(
        &self,
        _project_id: i64,
        deployment_target_id: &str,
    ) -> Result<Option<DeploymentTarget>, ControlPlaneError> {
        self.check()?;
        Ok(self
            .deployment_targets
            .iter()
            .find(|t| t.id == deployment_target_id)
            .cloned())
    }
}

/// Kubernetes client returning fixed pods and recording the selectors it was
/// asked for.
#[derive(Default)]
pub struct MockK8sClient {
    pub pods: Vec<Pod>,
    pub fail: bool,
    pub requests: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl K8sClient for MockK8sClient {
    async fn list_pods_by_label(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Pod>, K8sError> {
        self.requests
            .lock()
            .unwrap()
            .push((namespace.to_string(), selector.to_string()));

        if self.fail {
            return Err(K8sError::Kube(mock_kube_error()));
        }

        Ok(self.pods.clone())
    }
}

/// Hands out the same [`MockK8sClient`] for every cluster, or fails.
pub struct MockAgentGetter {
    pub client: Arc<MockK8sClient>,
    pub fail: bool,
}

impl MockAgentGetter {
    pub fn new(client: MockK8sClient) -> Self {
        Self {
            client: Arc::new(client),
            fail: false,
        }
    }
}

#[async_trait]
impl K8sAgentGetter for MockAgentGetter {
    async fn agent(&self, _cluster: &Cluster) -> Result<Arc<dyn K8sClient>, K8sError> {
        if self.fail {
            return Err(K8sError::Kube(mock_kube_error()));
        }

        Ok(self.client.clone())
    }
}

fn mock_kube_error() -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: "mock kubernetes failure".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    })
}

pub fn app(id: i64, cluster_id: i64, name: &str) -> App {
    let now = Utc::now();
    App {
        id,
        project_id: PROJECT_ID,
        cluster_id,
        name: name.to_string(),
        repo_name: Some("acme/web".to_string()),
        git_branch: Some("main".to_string()),
        git_repo_id: Some(42),
        build_context: Some("./".to_string()),
        builder: None,
        buildpacks: None,
        dockerfile: Some("./Dockerfile".to_string()),
        image_repo_uri: None,
        app_yaml_path: None,
        pull_request_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn revision(app_name: &str, revision_number: i32) -> AppRevision {
    AppRevision {
        id: REVISION_ID.to_string(),
        project_id: PROJECT_ID,
        app: Some(shipyard_proto::App {
            name: app_name.to_string(),
            ..Default::default()
        }),
        status: AppRevisionStatus::Deployed as i32,
        revision_number,
        created_at: Some(prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        }),
        updated_at: Some(prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        }),
        deployment_target: Some(DeploymentTargetIdentifier {
            id: DEPLOYMENT_TARGET_ID.to_string(),
            name: "default".to_string(),
        }),
        app_instance_id: APP_INSTANCE_ID.to_string(),
    }
}

pub fn deployment_target(cluster_id: i64) -> DeploymentTarget {
    DeploymentTarget {
        id: DEPLOYMENT_TARGET_ID.to_string(),
        project_id: PROJECT_ID,
        cluster_id,
        namespace: NAMESPACE.to_string(),
        name: "default".to_string(),
        is_preview: false,
    }
}

/// A notification event for [`REVISION_ID`] of [`APP_INSTANCE_ID`].
pub fn notification_event(metadata: serde_json::Value) -> AppEvent {
    let now = Utc::now();
    AppEvent {
        id: Uuid::new_v4(),
        app_id: APP_ID,
        event_type: NOTIFICATION_EVENT_TYPE.to_string(),
        status: "UNREAD".to_string(),
        app_instance_id: Some(Uuid::parse_str(APP_INSTANCE_ID).unwrap()),
        deployment_target_id: Some(Uuid::parse_str(DEPLOYMENT_TARGET_ID).unwrap()),
        metadata,
        created_at: now,
        updated_at: now,
    }
}

pub fn pod(name: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}
