use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use thiserror::Error;
use uuid::Uuid;

/// Event type of app events that carry a notification in their metadata.
pub const NOTIFICATION_EVENT_TYPE: &str = "NOTIFICATION";

#[derive(Debug, Error)]
pub enum AppEventsDbError {
    #[error("Error while interacting with Postgres for app events: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppEvent {
    pub id: Uuid,
    pub app_id: i64,
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub status: String,
    pub app_instance_id: Option<Uuid>,
    pub deployment_target_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reads the notification events raised for one revision of an app instance,
/// newest first.
pub async fn read_notifications_by_app_revision_id<'c, E>(
    executor: E,
    app_instance_id: Uuid,
    app_revision_id: Uuid,
) -> Result<Vec<AppEvent>, AppEventsDbError>
where
    E: PgExecutor<'c>,
{
    let events = sqlx::query_as::<_, AppEvent>(
        r#"
        select id, app_id, type, status, app_instance_id, deployment_target_id,
               metadata, created_at, updated_at
        from app.app_events
        where type = $1
          and app_instance_id = $2
          and metadata ->> 'app_revision_id' = $3
        order by created_at desc
        "#,
    )
    .bind(NOTIFICATION_EVENT_TYPE)
    .bind(app_instance_id)
    .bind(app_revision_id.to_string())
    .fetch_all(executor)
    .await?;

    Ok(events)
}
