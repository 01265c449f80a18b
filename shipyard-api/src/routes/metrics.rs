use actix_web::{Responder, get, web};
use metrics_exporter_prometheus::PrometheusHandle;

#[utoipa::path(
    summary = "Get prometheus metrics",
    description = "Renders the API metrics, including control plane call counts and latencies, in the Prometheus text format.",
    responses(
        (status = 200, description = "Metrics in the Prometheus text format", body = String),
    ),
    tag = "Metrics"
)]
#[get("/metrics")]
pub(crate) async fn metrics(metrics_handle: web::ThinData<PrometheusHandle>) -> impl Responder {
    metrics_handle.render()
}
