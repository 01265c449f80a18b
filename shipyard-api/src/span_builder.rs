use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

/// Root span builder that tags requests with the project and cluster they are
/// scoped to.
pub struct ApiRootSpanBuilder;

impl RootSpanBuilder for ApiRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        // Routing has not run yet, so the ids are read from the raw path.
        let (project_id, cluster_id) = scope_ids(request.path());
        tracing_actix_web::root_span!(request, project_id, cluster_id)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Extracts the segments following `projects` and `clusters` in `path`.
fn scope_ids(path: &str) -> (Option<&str>, Option<&str>) {
    let mut project_id = None;
    let mut cluster_id = None;

    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    while let Some(segment) = segments.next() {
        match segment {
            "projects" if project_id.is_none() => project_id = segments.next(),
            "clusters" if cluster_id.is_none() => cluster_id = segments.next(),
            _ => {}
        }
    }

    (project_id, cluster_id)
}
