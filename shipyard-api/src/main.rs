use std::env;
use std::sync::Arc;

use anyhow::anyhow;
use shipyard_api::{
    config::{ApiConfig, MigrateConfig},
    startup::Application,
};
use shipyard_config::{Environment, load_config, shared::PgConnectionConfig};
use shipyard_telemetry::tracing::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    // kube and sqlx both bring rustls; pick the provider before either needs it.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        info!("a rustls crypto provider was already installed");
    }

    // Sentry must be initialized before the async runtime starts.
    let _sentry_guard = init_sentry()?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            let config = load_config::<ApiConfig>()?;
            log_pg_connection_config(&config.database);
            info!(
                control_plane_url = config.control_plane.url,
                "control plane options"
            );
            let application = Application::build(config).await?;
            info!(port = application.port(), "starting api server");
            application.run_until_stopped().await?;
        }
        [command] => match command.as_str() {
            "migrate" => {
                let config = load_config::<MigrateConfig>()?;
                log_pg_connection_config(&config.database);
                Application::migrate_database(config.database).await?;
                info!("database migrated successfully");
            }
            _ => {
                let message = format!("invalid command: {command}");
                error!("{message}");
                return Err(anyhow!(message));
            }
        },
        _ => {
            let message = "invalid number of command line arguments";
            error!("{message}");
            return Err(anyhow!(message));
        }
    }

    Ok(())
}

fn init_sentry() -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    if let Ok(config) = load_config::<ApiConfig>()
        && let Some(sentry_config) = &config.sentry
    {
        info!("initializing sentry with supplied dsn");

        let environment = Environment::load()?;
        let guard = sentry::init(sentry::ClientOptions {
            dsn: Some(sentry_config.dsn.parse()?),
            environment: Some(environment.to_string().into()),
            traces_sample_rate: 1.0,
            integrations: vec![Arc::new(
                sentry::integrations::panic::PanicIntegration::new(),
            )],
            ..Default::default()
        });

        sentry::configure_scope(|scope| {
            scope.set_tag("service", "shipyard-api");
        });

        return Ok(Some(guard));
    }

    info!("sentry not configured, skipping initialization");

    Ok(None)
}

fn log_pg_connection_config(config: &PgConnectionConfig) {
    info!(
        host = config.host,
        port = config.port,
        dbname = config.name,
        username = config.username,
        tls_enabled = config.tls.enabled,
        "pg database options",
    );
}
