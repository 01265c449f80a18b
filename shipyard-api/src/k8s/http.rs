use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config, api::ListParams};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::db::clusters::Cluster;
use crate::k8s::{K8sAgentGetter, K8sClient, K8sError};

/// [`K8sClient`] talking to the API server of one cluster.
#[derive(Clone)]
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Creates a client from the ambient configuration.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(HttpK8sClient { client })
    }

    /// Creates a client for a named context of the local kubeconfig.
    pub async fn for_context(context: &str) -> Result<HttpK8sClient, K8sError> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..KubeConfigOptions::default()
        };
        let config = Config::from_kubeconfig(&options).await?;
        let client = Client::try_from(config)?;

        Ok(HttpK8sClient { client })
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn list_pods_by_label(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Pod>, K8sError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods.list(&ListParams::default().labels(selector)).await?;
        debug!(namespace, selector, count = list.items.len(), "listed pods");

        Ok(list.items)
    }
}

/// [`K8sAgentGetter`] that builds one [`HttpK8sClient`] per kube context and
/// reuses it for every later request.
#[derive(Default)]
pub struct KubeAgentGetter {
    clients: RwLock<HashMap<Option<String>, Arc<dyn K8sClient>>>,
}

#[async_trait]
impl K8sAgentGetter for KubeAgentGetter {
    async fn agent(&self, cluster: &Cluster) -> Result<Arc<dyn K8sClient>, K8sError> {
        let key = cluster.kube_context.clone();

        if let Some(client) = self.clients.read().await.get(&key) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another request may have built the client while we waited for the lock.
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = match &key {
            Some(context) => HttpK8sClient::for_context(context).await?,
            None => HttpK8sClient::new().await?,
        };
        info!(
            cluster_id = cluster.id,
            kube_context = key.as_deref().unwrap_or("<ambient>"),
            "created kubernetes client"
        );

        let client: Arc<dyn K8sClient> = Arc::new(client);
        clients.insert(key, client.clone());

        Ok(client)
    }
}
