#![allow(dead_code)]

use shipyard_api::config::ApiConfig;
use shipyard_api::startup::Application;
use shipyard_config::shared::{IntoConnectOptions, PgConnectionConfig};
use shipyard_config::{Environment, load_config};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

/// A throwaway database with the API schema applied. Dropped together with
/// the value.
pub struct TestDatabase {
    pub config: PgConnectionConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Creates a database with a random name on the server of the dev
    /// configuration and runs the migrations against it.
    pub async fn new() -> Self {
        Environment::Dev.set();
        let mut config = load_config::<ApiConfig>()
            .expect("Failed to read configuration")
            .database;
        config.name = format!("shipyard_test_{}", Uuid::new_v4());

        // Create the database via a single connection.
        let mut connection = PgConnection::connect_with(&config.without_db())
            .await
            .expect("Failed to connect to Postgres");
        connection
            .execute(&*format!(r#"create database "{}";"#, config.name))
            .await
            .expect("Failed to create database");

        Application::migrate_database(config.clone())
            .await
            .expect("Failed to migrate the database");

        let pool = PgPool::connect_with(config.with_db())
            .await
            .expect("Failed to connect to Postgres");

        Self { config, pool }
    }

    pub async fn insert_project(&self, name: &str) -> i64 {
        sqlx::query_scalar("insert into app.projects (name) values ($1) returning id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to insert project")
    }

    pub async fn insert_cluster(&self, project_id: i64, name: &str) -> i64 {
        sqlx::query_scalar(
            "insert into app.clusters (project_id, name, kube_context) values ($1, $2, $3) returning id",
        )
        .bind(project_id)
        .bind(name)
        .bind(format!("{name}-context"))
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert cluster")
    }

    pub async fn insert_app(&self, project_id: i64, cluster_id: i64, name: &str) -> i64 {
        sqlx::query_scalar(
            "insert into app.apps (project_id, cluster_id, name) values ($1, $2, $3) returning id",
        )
        .bind(project_id)
        .bind(cluster_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert app")
    }

    pub async fn soft_delete_app(&self, app_id: i64) {
        sqlx::query("update app.apps set deleted_at = now() where id = $1")
            .bind(app_id)
            .execute(&self.pool)
            .await
            .expect("Failed to delete app");
    }

    /// Inserts an app event created `age_secs` seconds ago and returns its id.
    pub async fn insert_event(
        &self,
        app_id: i64,
        event_type: &str,
        app_instance_id: Uuid,
        metadata: serde_json::Value,
        age_secs: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            insert into app.app_events
                (id, app_id, type, status, app_instance_id, metadata, created_at)
            values ($1, $2, $3, 'UNREAD', $4, $5, now() - make_interval(secs => $6))
            "#,
        )
        .bind(id)
        .bind(app_id)
        .bind(event_type)
        .bind(app_instance_id)
        .bind(metadata)
        .bind(age_secs as f64)
        .execute(&self.pool)
        .await
        .expect("Failed to insert app event");

        id
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Tests run on the multi thread runtime, so the current thread may block.
        let config = self.config.clone();
        let pool = self.pool.clone();
        tokio::task::block_in_place(move || {
            tokio::runtime::Handle::current().block_on(async move {
                pool.close().await;
                drop_database(&config).await;
            });
        });
    }
}

/// Drops the database after terminating the connections left on it.
async fn drop_database(config: &PgConnectionConfig) {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(&*format!(
            r#"
            select pg_terminate_backend(pg_stat_activity.pid)
            from pg_stat_activity
            where pg_stat_activity.datname = '{}'
            and pid <> pg_backend_pid();"#,
            config.name
        ))
        .await
        .expect("Failed to terminate database connections");

    connection
        .execute(&*format!(r#"drop database if exists "{}";"#, config.name))
        .await
        .expect("Failed to destroy database");
}
