//! HTTP API of the Shipyard platform.
//!
//! Serves app revisions, deployment targets and pod status for the apps of a
//! project's clusters. Revisions and deployment targets are read from the
//! cluster control plane over gRPC, app records and notifications from
//! Postgres, and pods from the cluster's Kubernetes API.

pub mod apps;
pub mod authentication;
pub mod config;
pub mod control_plane;
pub mod db;
pub mod k8s;
pub mod metrics;
pub mod routes;
pub mod span_builder;
pub mod startup;
