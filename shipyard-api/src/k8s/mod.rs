//! Kubernetes access for the API.
//!
//! Handlers depend on the [`K8sAgentGetter`] and [`K8sClient`] traits and never
//! on a transport. The default implementations in [`http`] are backed by the
//! [`kube`] crate and use either the ambient configuration (in-cluster or
//! `~/.kube/config`) or a named kubeconfig context per cluster. Tests swap in
//! in-memory implementations.

mod base;
pub mod http;

pub use base::*;
