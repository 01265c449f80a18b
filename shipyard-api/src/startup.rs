use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    dev::Server,
    error::InternalError,
    http::{StatusCode, header},
    web,
};
use actix_web_httpauth::middleware::HttpAuthentication;
use metrics_exporter_prometheus::PrometheusHandle;
use shipyard_config::shared::{IntoConnectOptions, PgConnectionConfig};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::warn;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    apps::{
        deployment_target::DeploymentTarget,
        notifications::{Notification, NotificationErrorDetails, NotificationScope},
        revision::{DeploymentTargetMeta, EncodedRevision},
    },
    authentication::auth_validator,
    config::ApiConfig,
    control_plane::{ControlPlaneClient, grpc::GrpcControlPlaneClient},
    db::{Repository, apps::App as SourceApp, postgres::PgRepository},
    k8s::{K8sAgentGetter, http::KubeAgentGetter},
    metrics::register_metrics,
    routes::{
        ErrorMessage,
        app_revisions::{
            LatestAppRevisionResponse, LatestAppRevisionsResponse, ListAppRevisionsResponse,
            RevisionWithSource, latest_app_revision, latest_app_revisions, list_app_revisions,
        },
        deployment_targets::{ReadDeploymentTargetResponse, read_deployment_target},
        error_response,
        health_check::health_check,
        metrics::metrics,
        pods::pod_status,
    },
    span_builder::ApiRootSpanBuilder,
};

/// Seconds browsers may cache a preflight response.
const CORS_MAX_AGE_SECS: usize = 300;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: ApiConfig) -> Result<Self, anyhow::Error> {
        config.database.tls.validate()?;
        config.control_plane.validate()?;

        let connection_pool = get_connection_pool(&config.database);
        let repository: Arc<dyn Repository> = Arc::new(PgRepository::new(connection_pool));

        let control_plane: Arc<dyn ControlPlaneClient> =
            Arc::new(GrpcControlPlaneClient::connect_lazy(&config.control_plane)?);

        let agent_getter: Arc<dyn K8sAgentGetter> = Arc::new(KubeAgentGetter::default());

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let metrics_handle = shipyard_telemetry::metrics::init_metrics_handle()?;

        let server = run(
            config,
            listener,
            repository,
            control_plane,
            agent_getter,
            metrics_handle,
        )
        .await?;

        Ok(Self { port, server })
    }

    pub async fn migrate_database(config: PgConnectionConfig) -> Result<(), anyhow::Error> {
        let connection_pool = get_connection_pool(&config);

        sqlx::migrate!("./migrations").run(&connection_pool).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(config: &PgConnectionConfig) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(config.with_db())
}

fn cors(config: &ApiConfig) -> Cors {
    let cors = match &config.cors {
        Some(cors_config) if !cors_config.allowed_origins.is_empty() => cors_config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin)),
        _ => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .max_age(CORS_MAX_AGE_SECS)
}

/// Query strings that fail to decode are rejected with the JSON error body of
/// the routes.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("invalid query string: {err}");
        let response = error_response(StatusCode::BAD_REQUEST, message);
        InternalError::from_response(err, response).into()
    })
}

// The backends are passed in as trait objects so that tests can serve from
// in-memory implementations.
pub async fn run(
    config: ApiConfig,
    listener: TcpListener,
    repository: Arc<dyn Repository>,
    control_plane: Arc<dyn ControlPlaneClient>,
    agent_getter: Arc<dyn K8sAgentGetter>,
    metrics_handle: PrometheusHandle,
) -> Result<Server, anyhow::Error> {
    register_metrics();

    if config.api_keys.is_empty() {
        warn!("no api keys are configured, every authenticated request will be rejected");
    }

    let repository: web::Data<dyn Repository> = repository.into();
    let control_plane: web::Data<dyn ControlPlaneClient> = control_plane.into();
    let agent_getter: web::Data<dyn K8sAgentGetter> = agent_getter.into();
    let config = web::Data::new(config);

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::routes::health_check::health_check,
            crate::routes::metrics::metrics,
            crate::routes::app_revisions::latest_app_revision,
            crate::routes::app_revisions::latest_app_revisions,
            crate::routes::app_revisions::list_app_revisions,
            crate::routes::deployment_targets::read_deployment_target,
            crate::routes::pods::pod_status,
        ),
        components(schemas(
            ErrorMessage,
            EncodedRevision,
            DeploymentTargetMeta,
            Notification,
            NotificationScope,
            NotificationErrorDetails,
            SourceApp,
            RevisionWithSource,
            LatestAppRevisionResponse,
            LatestAppRevisionsResponse,
            ListAppRevisionsResponse,
            DeploymentTarget,
            ReadDeploymentTargetResponse,
        ))
    )]
    struct ApiDoc;

    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        let tracing_logger = TracingLogger::<ApiRootSpanBuilder>::new();
        let authentication = HttpAuthentication::bearer(auth_validator);
        App::new()
            .wrap(
                sentry::integrations::actix::Sentry::builder()
                    .capture_server_errors(true)
                    .start_transaction(true)
                    .finish(),
            )
            .wrap(tracing_logger)
            .wrap(cors(&config))
            .app_data(query_config())
            .service(health_check)
            .service(metrics)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("v1")
                    .wrap(authentication)
                    //app revisions
                    .service(latest_app_revisions)
                    .service(latest_app_revision)
                    .service(list_app_revisions)
                    //deployment targets
                    .service(read_deployment_target)
                    //pods
                    .service(pod_status),
            )
            .app_data(config.clone())
            .app_data(repository.clone())
            .app_data(control_plane.clone())
            .app_data(agent_getter.clone())
            .app_data(web::ThinData(metrics_handle.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
