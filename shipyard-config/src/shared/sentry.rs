use serde::{Deserialize, Serialize};

/// Sentry error reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    /// DSN the API reports errors and transactions to.
    pub dsn: String,
}
