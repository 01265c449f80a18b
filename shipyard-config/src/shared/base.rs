use thiserror::Error;

/// Errors raised when a loaded configuration is not usable.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,

    #[error("Invalid control plane config: `url` must start with http:// or https://, got `{0}`")]
    InvalidControlPlaneUrl(String),

    #[error("Invalid control plane config: `{0}` cannot be zero")]
    ZeroTimeout(&'static str),
}
