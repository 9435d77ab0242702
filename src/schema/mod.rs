//! Schema Module
//!
//! Field tables per collection, the projection policy derived from them, and
//! the mapper between public and store record shapes.

mod fields;
pub mod mapper;
mod projection;


// Re-export public types
pub use fields::{CollectionSchema, FieldKind, FieldSpec, Visibility};
pub use mapper::{to_external_create, to_external_patch, to_public};
pub use projection::ProjectionPolicy;
