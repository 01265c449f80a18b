
use base64::{Engine, prelude::BASE64_STANDARD};
use serde::Deserialize;
use shipyard_config::Config;
use shipyard_config::shared::{ControlPlaneConfig, PgConnectionConfig, SentryConfig};
use thiserror::Error;

/// Required length in bytes for a valid API key.
const API_KEY_LENGTH_IN_BYTES: usize = 32;

/// Complete configuration of the API service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Database holding projects, clusters, apps and app events.
    pub database: PgConnectionConfig,
    /// Address the HTTP server binds to.
    pub application: ApplicationSettings,
    /// Cluster control plane serving app revisions and deployment targets.
    pub control_plane: ControlPlaneConfig,
    /// Base64-encoded API keys; every key in the list is accepted.
    pub api_keys: Vec<String>,
    /// Cross-origin settings. Any origin is allowed when absent.
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    pub sentry: Option<SentryConfig>,
}

impl Config for ApiConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["api_keys", "cors.allowed_origins"];
}

/// The part of the configuration the `migrate` command needs.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrateConfig {
    pub database: PgConnectionConfig,
}

impl Config for MigrateConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ApiKeyConversionError {
    #[error("api key is not base64 encoded")]
    NotBase64Encoded,

    #[error("expected length of api key is 32, but actual length is {0}")]
    LengthNot32Bytes(usize),
}

/// A decoded 32-byte API key.
#[derive(Debug)]
pub struct ApiKey {
    pub key: [u8; API_KEY_LENGTH_IN_BYTES],
}

impl TryFrom<&str> for ApiKey {
    type Error = ApiKeyConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let key = BASE64_STANDARD
            .decode(value)
            .map_err(|_| ApiKeyConversionError::NotBase64Encoded)?;

        let key: [u8; API_KEY_LENGTH_IN_BYTES] = key
            .try_into()
            .map_err(|key: Vec<u8>| ApiKeyConversionError::LengthNot32Bytes(key.len()))?;

        Ok(ApiKey { key })
    }
}
