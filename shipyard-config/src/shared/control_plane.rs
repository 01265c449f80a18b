use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the cluster control plane gRPC service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControlPlaneConfig {
    /// Endpoint of the service, e.g. `http://ccp.internal:8080`.
    pub url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Deadline applied to every call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ControlPlaneConfig {
    /// Checks that the url has an http(s) scheme and that no timeout is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ValidationError::InvalidControlPlaneUrl(self.url.clone()));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("connect_timeout_secs"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("request_timeout_secs"));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
