use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use shipyard_config::shared::ControlPlaneConfig;
use shipyard_proto::{
    AppRevision, ClusterControlPlaneServiceClient, CurrentAppRevisionRequest, DeploymentTarget,
    DeploymentTargetDetailsRequest, LatestAppRevisionsRequest, ListAppRevisionsRequest,
};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, warn};

use crate::control_plane::{ControlPlaneClient, ControlPlaneError};
use crate::metrics::{
    CONTROL_PLANE_REQUEST_DURATION_SECONDS, CONTROL_PLANE_REQUESTS_TOTAL, METHOD, OUTCOME,
};

/// [`ControlPlaneClient`] over a lazily connected tonic channel.
#[derive(Clone)]
pub struct GrpcControlPlaneClient {
    client: ClusterControlPlaneServiceClient<Channel>,
    request_timeout: Duration,
}

impl GrpcControlPlaneClient {
    /// Builds the client without connecting. The channel connects on the first
    /// call and reconnects after failures.
    ///
    /// An `https://` url negotiates TLS against the webpki root certificates.
    pub fn connect_lazy(config: &ControlPlaneConfig) -> Result<Self, ControlPlaneError> {
        let mut endpoint = Endpoint::from_shared(config.url.clone())?
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout());
        if config.url.starts_with("https://") {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_webpki_roots())?;
        }
        let channel = endpoint.connect_lazy();

        Ok(Self {
            client: ClusterControlPlaneServiceClient::new(channel),
            request_timeout: config.request_timeout(),
        })
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.request_timeout);
        request
    }
}

/// Records the outcome of one call and converts its status.
fn observe<T>(
    method: &'static str,
    started: Instant,
    result: Result<tonic::Response<T>, tonic::Status>,
) -> Result<T, ControlPlaneError> {
    histogram!(CONTROL_PLANE_REQUEST_DURATION_SECONDS, METHOD => method)
        .record(started.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            counter!(CONTROL_PLANE_REQUESTS_TOTAL, METHOD => method, OUTCOME => "ok").increment(1);
            debug!(method, "control plane call succeeded");
            Ok(response.into_inner())
        }
        Err(status) => {
            let outcome = format!("{:?}", status.code());
            counter!(CONTROL_PLANE_REQUESTS_TOTAL, METHOD => method, OUTCOME => outcome)
                .increment(1);
            warn!(method, code = ?status.code(), message = status.message(), "control plane call failed");
            Err(status.into())
        }
    }
}

#[async_trait]
impl ControlPlaneClient for GrpcControlPlaneClient {
    async fn current_app_revision(
        &self,
        project_id: i64,
        app_id: i64,
        deployment_target_id: &str,
    ) -> Result<Option<AppRevision>, ControlPlaneError> {
        let request = self.request(CurrentAppRevisionRequest {
            project_id,
            app_id,
            deployment_target_id: deployment_target_id.to_string(),
        });

        let started = Instant::now();
        let result = self.client.clone().current_app_revision(request).await;
        let response = observe("current_app_revision", started, result)?;

        Ok(response.app_revision)
    }

    async fn latest_app_revisions(
        &self,
        project_id: i64,
        deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError> {
        let request = self.request(LatestAppRevisionsRequest {
            project_id,
            deployment_target_id: deployment_target_id.to_string(),
        });

        let started = Instant::now();
        let result = self.client.clone().latest_app_revisions(request).await;
        let response = observe("latest_app_revisions", started, result)?;

        Ok(response.app_revisions)
    }

    async fn list_app_revisions(
        &self,
        project_id: i64,
        app_id: i64,
        deployment_target_id: &str,
    ) -> Result<Vec<AppRevision>, ControlPlaneError> {
        let request = self.request(ListAppRevisionsRequest {
            project_id,
            app_id,
            deployment_target_id: deployment_target_id.to_string(),
        });

        let started = Instant::now();
        let result = self.client.clone().list_app_revisions(request).await;
        let response = observe("list_app_revisions", started, result)?;

        Ok(response.app_revisions)
    }

    async fn deployment_target_details(
        &self,
        project_id: i64,
        deployment_target_id: &str,
    ) -> Result<Option<DeploymentTarget>, ControlPlaneError> {
        let request = self.request(DeploymentTargetDetailsRequest {
            project_id,
            deployment_target_id: deployment_target_id.to_string(),
        });

        let started = Instant::now();
        let result = self.client.clone().deployment_target_details(request).await;
        let response = observe("deployment_target_details", started, result)?;

        Ok(response.deployment_target)
    }
}
