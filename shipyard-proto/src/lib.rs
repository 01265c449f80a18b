//! Messages and service stubs of the cluster control plane.
//!
//! The control plane owns app revisions and deployment targets; the API only
//! reads them. Generated from `proto/controlplane/v1`.

pub mod controlplane {
    pub mod v1 {
        tonic::include_proto!("controlplane.v1");
    }
}

pub use controlplane::v1::cluster_control_plane_service_client::ClusterControlPlaneServiceClient;
pub use controlplane::v1::cluster_control_plane_service_server::{
    ClusterControlPlaneService, ClusterControlPlaneServiceServer,
};
pub use controlplane::v1::*;
