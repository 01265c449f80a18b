use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};

static REGISTER_METRICS: Once = Once::new();

pub const CONTROL_PLANE_REQUESTS_TOTAL: &str = "control_plane_requests_total";
pub const CONTROL_PLANE_REQUEST_DURATION_SECONDS: &str = "control_plane_request_duration_seconds";
pub const METHOD: &str = "method";
pub const OUTCOME: &str = "outcome";

/// Describes the metrics emitted by the API. Safe to call more than once.
pub fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            CONTROL_PLANE_REQUESTS_TOTAL,
            Unit::Count,
            "Calls made to the cluster control plane, by method and outcome"
        );

        describe_histogram!(
            CONTROL_PLANE_REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "Time taken by calls to the cluster control plane"
        );
    });
}
