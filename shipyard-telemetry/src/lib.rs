//! Logging, panic reporting and metrics setup shared by the Shipyard binaries.

pub mod metrics;
pub mod tracing;
