use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use thiserror::Error;

use crate::db::clusters::Cluster;

/// Label carrying the app name on workloads deployed by the control plane.
pub const APP_NAME_LABEL: &str = "porter.run/app-name";
/// Label carrying the deployment target id.
pub const DEPLOYMENT_TARGET_ID_LABEL: &str = "porter.run/deployment-target-id";
/// Label carrying the service name within the app.
pub const SERVICE_NAME_LABEL: &str = "porter.run/service-name";

#[derive(Debug, Error)]
pub enum K8sError {
    #[error("An error occurred with kube when dealing with K8s: {0}")]
    Kube(#[from] kube::Error),

    #[error("The kubeconfig could not be loaded: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

/// Kubernetes operations used by the API against a single cluster.
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Lists the pods of `namespace` matching a label `selector` such as
    /// `a=b,c=d`.
    async fn list_pods_by_label(&self, namespace: &str, selector: &str)
    -> Result<Vec<Pod>, K8sError>;
}

/// Hands out a [`K8sClient`] for a cluster.
#[async_trait]
pub trait K8sAgentGetter: Send + Sync {
    async fn agent(&self, cluster: &Cluster) -> Result<Arc<dyn K8sClient>, K8sError>;
}

/// Builds the label selector matching the pods of an app on a deployment
/// target, narrowed to one service when `service_name` is given.
pub fn pod_label_selector(
    deployment_target_id: &str,
    app_name: &str,
    service_name: Option<&str>,
) -> String {
    let selector =
        format!("{DEPLOYMENT_TARGET_ID_LABEL}={deployment_target_id},{APP_NAME_LABEL}={app_name}");

    match service_name {
        Some(service_name) if !service_name.is_empty() => {
            format!("{SERVICE_NAME_LABEL}={service_name},{selector}")
        }
        _ => selector,
    }
}
