//! App domain logic shared by the route handlers.
//!
//! Converts control plane messages and stored app events into the JSON shapes
//! the API returns, and resolves deployment targets against the cluster of a
//! request.

pub mod deployment_target;
pub mod notifications;
pub mod revision;
