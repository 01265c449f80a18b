//! Persistence of projects, clusters, apps and app events.
//!
//! Query functions are generic over [`sqlx::PgExecutor`] and grouped by table.
//! Handlers reach them through the [`Repository`] trait, implemented for
//! Postgres by [`postgres::PgRepository`].

mod base;

pub mod app_events;
pub mod apps;
pub mod clusters;
pub mod postgres;
pub mod projects;

pub use base::*;
