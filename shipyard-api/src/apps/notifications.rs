use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::app_events::{AppEvent, NOTIFICATION_EVENT_TYPE};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("The app event {id} has type {event_type} instead of NOTIFICATION")]
    NotANotification { id: Uuid, event_type: String },

    #[error("The metadata of app event {id} is not a valid notification: {source}")]
    InvalidMetadata {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}

/// What a notification is about. Notifications written before scopes existed
/// carry no scope and deserialize as [`NotificationScope::Legacy`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum NotificationScope {
    #[serde(rename = "APPLICATION")]
    Application,
    #[serde(rename = "REVISION")]
    Revision,
    #[serde(rename = "SERVICE")]
    Service,
    #[default]
    #[serde(rename = "")]
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NotificationErrorDetails {
    #[schema(example = "IMAGE_PULL_BACKOFF")]
    pub code: String,
    pub message: String,
}

/// Shape of the `metadata` column of notification events.
#[derive(Debug, Deserialize)]
struct NotificationMetadata {
    app_revision_id: String,
    #[serde(default)]
    scope: NotificationScope,
    #[serde(default)]
    service_name: String,
    #[serde(default)]
    human_readable_summary: String,
    #[serde(default)]
    human_readable_detail: String,
    #[serde(default)]
    mitigation_steps: String,
    #[serde(default)]
    documentation: Vec<String>,
    #[serde(default)]
    error: Option<NotificationErrorDetails>,
}

/// A problem reported against an app, one of its revisions or one of its
/// services.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub app_id: i64,
    pub app_revision_id: String,
    pub app_instance_id: Option<Uuid>,
    pub deployment_target_id: Option<Uuid>,
    pub scope: NotificationScope,
    pub service_name: String,
    pub human_readable_summary: String,
    pub human_readable_detail: String,
    pub mitigation_steps: String,
    pub documentation: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub error: Option<NotificationErrorDetails>,
}

impl TryFrom<AppEvent> for Notification {
    type Error = NotificationError;

    fn try_from(event: AppEvent) -> Result<Self, Self::Error> {
        if event.event_type != NOTIFICATION_EVENT_TYPE {
            return Err(NotificationError::NotANotification {
                id: event.id,
                event_type: event.event_type,
            });
        }

        let metadata: NotificationMetadata = serde_json::from_value(event.metadata)
            .map_err(|source| NotificationError::InvalidMetadata {
                id: event.id,
                source,
            })?;

        Ok(Notification {
            id: event.id,
            app_id: event.app_id,
            app_revision_id: metadata.app_revision_id,
            app_instance_id: event.app_instance_id,
            deployment_target_id: event.deployment_target_id,
            scope: metadata.scope,
            service_name: metadata.service_name,
            human_readable_summary: metadata.human_readable_summary,
            human_readable_detail: metadata.human_readable_detail,
            mitigation_steps: metadata.mitigation_steps,
            documentation: metadata.documentation,
            timestamp: event.created_at,
            error: metadata.error,
        })
    }
}

/// Notifications decoded from a batch of events, with the number of events
/// that were skipped.
#[derive(Debug, Default)]
pub struct CollectedNotifications {
    pub notifications: Vec<Notification>,
    pub dropped: usize,
    /// Why the last skipped event was skipped.
    pub last_drop_reason: Option<String>,
}

impl CollectedNotifications {
    fn drop_event(&mut self, reason: String) {
        self.dropped += 1;
        self.last_drop_reason = Some(reason);
    }
}

/// Converts notification events, skipping events that do not decode and
/// notifications in the legacy format.
pub fn collect_notifications(events: Vec<AppEvent>) -> CollectedNotifications {
    let mut collected = CollectedNotifications::default();

    for event in events {
        let event_id = event.id;
        match Notification::try_from(event) {
            Ok(notification) if notification.scope == NotificationScope::Legacy => {
                debug!(%event_id, "skipping notification in the legacy format");
                collected.drop_event(format!("event {event_id} is in the legacy format"));
            }
            Ok(notification) => collected.notifications.push(notification),
            Err(err) => {
                debug!(%event_id, error = %err, "skipping notification that failed to convert");
                collected.drop_event(err.to_string());
            }
        }
    }

    collected
}
