#![allow(dead_code)]

use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use rand::random_range;
use reqwest::{IntoUrl, RequestBuilder};
use shipyard_api::control_plane::ControlPlaneClient;
use shipyard_api::db::Repository;
use shipyard_api::k8s::K8sAgentGetter;
use shipyard_api::{config::ApiConfig, startup::run};
use shipyard_config::{Environment, load_config};
use shipyard_telemetry::metrics::init_metrics_handle;

use crate::support::mocks::{
    CLUSTER_ID, InMemoryRepository, MockAgentGetter, MockControlPlane, MockK8sClient, PROJECT_ID,
};

/// In-memory backends the test server serves from.
pub struct TestBackends {
    pub repository: InMemoryRepository,
    pub control_plane: MockControlPlane,
    pub agent_getter: MockAgentGetter,
}

impl Default for TestBackends {
    fn default() -> Self {
        Self {
            repository: InMemoryRepository::with_app(),
            control_plane: MockControlPlane::default(),
            agent_getter: MockAgentGetter::new(MockK8sClient::default()),
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub api_key: String,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl TestApp {
    pub fn get_authenticated<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.api_client.get(url).bearer_auth(self.api_key.clone())
    }

    /// Url of a route under the scope of the test project and cluster.
    pub fn cluster_url(&self, path: &str) -> String {
        self.scoped_url(PROJECT_ID, CLUSTER_ID, path)
    }

    pub fn scoped_url(&self, project_id: i64, cluster_id: i64, path: &str) -> String {
        format!(
            "{}/v1/projects/{project_id}/clusters/{cluster_id}{path}",
            &self.address
        )
    }

    pub async fn latest_app_revision(
        &self,
        app_name: &str,
        deployment_target_id: &str,
    ) -> reqwest::Response {
        self.get_authenticated(self.cluster_url(&format!("/apps/{app_name}/latest")))
            .query(&[("deployment_target_id", deployment_target_id)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn latest_app_revisions(&self, deployment_target_id: &str) -> reqwest::Response {
        self.get_authenticated(self.cluster_url("/apps/revisions"))
            .query(&[("deployment_target_id", deployment_target_id)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn list_app_revisions(
        &self,
        app_name: &str,
        deployment_target_id: &str,
    ) -> reqwest::Response {
        self.get_authenticated(self.cluster_url(&format!("/apps/{app_name}/revisions")))
            .query(&[("deployment_target_id", deployment_target_id)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_deployment_target(&self, deployment_target_id: &str) -> reqwest::Response {
        self.get_authenticated(
            self.cluster_url(&format!("/deployment-targets/{deployment_target_id}")),
        )
        .send()
        .await
        .expect("Failed to execute request.")
    }

    pub async fn pod_status(
        &self,
        app_name: &str,
        deployment_target_id: &str,
        service: Option<&str>,
    ) -> reqwest::Response {
        let mut query = vec![("deployment_target_id", deployment_target_id)];
        if let Some(service) = service {
            query.push(("service", service));
        }

        self.get_authenticated(self.cluster_url(&format!("/apps/{app_name}/pods")))
            .query(&query)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with(TestBackends::default()).await
}

pub async fn spawn_test_app_with(backends: TestBackends) -> TestApp {
    // We set the environment to dev.
    Environment::Dev.set();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let config = load_config::<ApiConfig>().expect("Failed to read configuration");

    // We choose a random API key from the ones configured to show that rotation works.
    let api_key_index = random_range(0..config.api_keys.len());
    let api_key = config.api_keys[api_key_index].clone();

    let repository: Arc<dyn Repository> = Arc::new(backends.repository);
    let control_plane: Arc<dyn ControlPlaneClient> = Arc::new(backends.control_plane);
    let agent_getter: Arc<dyn K8sAgentGetter> = Arc::new(backends.agent_getter);
    let metrics_handle = init_metrics_handle().expect("failed to install metrics recorder");

    let server = run(
        config,
        listener,
        repository,
        control_plane,
        agent_getter,
        metrics_handle,
    )
    .await
    .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        api_key,
        server_handle,
    }
}
