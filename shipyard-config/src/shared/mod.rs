mod base;
mod connection;
mod control_plane;
mod sentry;

pub use base::*;
pub use connection::*;
pub use control_plane::*;
pub use sentry::*;
