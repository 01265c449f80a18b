//! Configuration for the Shipyard services.
//!
//! Detects the running environment, loads layered YAML configuration with
//! environment variable overrides, and hosts the configuration types shared
//! between crates.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
