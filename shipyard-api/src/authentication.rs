use actix_web::{Error, dev::ServiceRequest, web::Data};
use actix_web_httpauth::extractors::{
    AuthenticationError,
    bearer::{BearerAuth, Config},
};
use constant_time_eq::constant_time_eq_n;
use tracing::warn;

use crate::config::{ApiConfig, ApiKey};

/// Accepts a bearer token that matches any of the configured API keys.
///
/// Keys that do not decode are skipped so that a single bad entry does not
/// lock out every client during a rotation.
pub async fn auth_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let config = req
        .app_data::<Config>()
        .cloned()
        .unwrap_or_default()
        .scope("v1");

    let Some(api_config) = req.app_data::<Data<ApiConfig>>() else {
        warn!("api configuration missing from app data, rejecting request");
        return Err((AuthenticationError::from(config).into(), req));
    };

    let token: ApiKey = match credentials.token().try_into() {
        Ok(token) => token,
        Err(_) => return Err((AuthenticationError::from(config).into(), req)),
    };

    let authorized = api_config
        .api_keys
        .iter()
        .filter_map(|key| ApiKey::try_from(key.as_str()).ok())
        .any(|key| constant_time_eq_n(&key.key, &token.key));

    if !authorized {
        return Err((AuthenticationError::from(config).into(), req));
    }

    Ok(req)
}
