//! API Module
//!
//! HTTP surface of the gateway.
//!
//! # Endpoints
//! - `GET /:collection` - List records
//! - `GET /:collection/:id` - Fetch one record
//! - `POST /:collection` - Create a record (privileged)
//! - `PATCH /:collection/:id` - Update some fields of a record (privileged)
//! - `DELETE /:collection/:id` - Archive a record (privileged)
//! - `GET /health` - Health check endpoint

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::Caller;
pub use handlers::*;
pub use routes::create_router;
