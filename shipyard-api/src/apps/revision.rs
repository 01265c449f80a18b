use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};
use shipyard_proto::{AppRevision, AppRevisionStatus};
use thiserror::Error;
use utoipa::ToSchema;

/// Prefix of the generated status names that is not part of the JSON value.
const STATUS_PREFIX: &str = "APP_REVISION_STATUS_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeRevisionError {
    #[error("The app revision {0} does not contain an app")]
    MissingApp(String),

    #[error("The app revision {0} has an unspecified status")]
    UnspecifiedStatus(String),

    #[error("The app revision {revision_id} has an unknown status {status}")]
    UnknownStatus { revision_id: String, status: i32 },

    #[error("The app revision {revision_id} is missing its {field} timestamp")]
    MissingTimestamp {
        revision_id: String,
        field: &'static str,
    },

    #[error("The {field} timestamp of app revision {revision_id} is out of range")]
    InvalidTimestamp {
        revision_id: String,
        field: &'static str,
    },

    #[error("The app revision {revision_id} has a negative revision number {revision_number}")]
    NegativeRevisionNumber {
        revision_id: String,
        revision_number: i32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeploymentTargetMeta {
    #[schema(example = "9f1c0e3a-4b7d-4d6e-8a1f-2b3c4d5e6f70")]
    pub id: String,
    #[schema(example = "default")]
    pub name: String,
}

/// An app revision as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EncodedRevision {
    /// Base64 encoding of the protobuf `App` message.
    pub app_proto: String,
    #[schema(example = "DEPLOYED")]
    pub status: String,
    #[schema(example = 4)]
    pub revision_number: u32,
    #[schema(example = "2b9f7c0e-1d3a-4e5f-9a8b-7c6d5e4f3a21")]
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub deployment_target: DeploymentTargetMeta,
    pub app_instance_id: String,
}

impl EncodedRevision {
    pub fn from_proto(revision: &AppRevision) -> Result<Self, EncodeRevisionError> {
        let app = revision
            .app
            .as_ref()
            .ok_or_else(|| EncodeRevisionError::MissingApp(revision.id.clone()))?;

        let status = status_name(revision)?;

        let revision_number = u32::try_from(revision.revision_number).map_err(|_| {
            EncodeRevisionError::NegativeRevisionNumber {
                revision_id: revision.id.clone(),
                revision_number: revision.revision_number,
            }
        })?;

        let created_at = rfc3339(revision, revision.created_at.as_ref(), "created_at")?;
        let updated_at = rfc3339(revision, revision.updated_at.as_ref(), "updated_at")?;

        let deployment_target = revision
            .deployment_target
            .as_ref()
            .map(|target| DeploymentTargetMeta {
                id: target.id.clone(),
                name: target.name.clone(),
            })
            .unwrap_or(DeploymentTargetMeta {
                id: String::new(),
                name: String::new(),
            });

        Ok(EncodedRevision {
            app_proto: BASE64_STANDARD.encode(app.encode_to_vec()),
            status,
            revision_number,
            id: revision.id.clone(),
            created_at,
            updated_at,
            deployment_target,
            app_instance_id: revision.app_instance_id.clone(),
        })
    }
}

fn status_name(revision: &AppRevision) -> Result<String, EncodeRevisionError> {
    let status = AppRevisionStatus::try_from(revision.status).map_err(|_| {
        EncodeRevisionError::UnknownStatus {
            revision_id: revision.id.clone(),
            status: revision.status,
        }
    })?;

    if status == AppRevisionStatus::Unspecified {
        return Err(EncodeRevisionError::UnspecifiedStatus(revision.id.clone()));
    }

    let name = status.as_str_name();
    Ok(name.strip_prefix(STATUS_PREFIX).unwrap_or(name).to_string())
}

fn rfc3339(
    revision: &AppRevision,
    timestamp: Option<&prost_types::Timestamp>,
    field: &'static str,
) -> Result<String, EncodeRevisionError> {
    let timestamp = timestamp.ok_or_else(|| EncodeRevisionError::MissingTimestamp {
        revision_id: revision.id.clone(),
        field,
    })?;

    let nanos = u32::try_from(timestamp.nanos).ok();
    let time: DateTime<Utc> = nanos
        .and_then(|nanos| DateTime::from_timestamp(timestamp.seconds, nanos))
        .ok_or_else(|| EncodeRevisionError::InvalidTimestamp {
            revision_id: revision.id.clone(),
            field,
        })?;

    Ok(time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
