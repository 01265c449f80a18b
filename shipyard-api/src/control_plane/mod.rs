//! Client of the cluster control plane.
//!
//! The control plane owns app revisions and deployment targets. Handlers use
//! the [`ControlPlaneClient`] trait; [`grpc::GrpcControlPlaneClient`] is the
//! production implementation over tonic.

mod base;
pub mod grpc;

pub use base::*;
