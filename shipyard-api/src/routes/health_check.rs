use actix_web::{HttpResponse, Responder, get};

/// Liveness check. Does not touch the database, the control plane or
/// Kubernetes.
#[utoipa::path(
    summary = "Check that the API is up",
    description = "Returns 'ok' while the HTTP server accepts requests. Backends are not checked.",
    responses(
        (status = 200, description = "The API is up; returns 'ok'.", body = String),
    ),
    tag = "Health",
)]
#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
