//! Record and request/response models
//!
//! `external` holds the store's nested, type-tagged record shape; `public`
//! holds the flat caller-facing shape. `requests`/`responses` are the HTTP DTOs.

pub mod external;
pub mod public;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use external::{
    DateValue, ExternalRecord, FormulaValue, PropertyMap, PropertyValue, RichText, SelectOption,
    UniqueId,
};
pub use public::{ProjectionLevel, PublicRecord};
pub use requests::RecordInput;
pub use responses::{ErrorResponse, HealthResponse};
