//! Roster Gateway - a JSON gateway over page-database collections
//!
//! Serves members, students and projects from an external page database,
//! mapping between its nested property format and a flat public schema, with
//! field projection by caller privilege and a cache-aside listing cache.

pub mod api;
pub mod cache;
pub mod collections;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod schema;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
