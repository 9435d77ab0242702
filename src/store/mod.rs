//! Record Store Module
//!
//! The source of truth for every collection. `NotionStore` talks to the page
//! database over HTTP; `MemoryStore` keeps pages in process.

mod memory;
mod notion;

use async_trait::async_trait;
use thiserror::Error;

use crate::collections::{Collection, ListingFilter};
use crate::models::{ExternalRecord, PropertyMap};

pub use memory::{MemoryStore, StoreCalls};
pub use notion::NotionStore;

// == Store Error ==
/// Failures reported by a record store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store asked us to slow down
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The store rejected the request body
    #[error("validation failed: {0}")]
    Validation(String),

    /// Database or page does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// Connection-level failure or the store is temporarily down
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not decode
    #[error("decode error: {0}")]
    Decode(String),

    /// Any other non-success response
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Listing Query ==
/// Parameters of a full listing: always sorted ascending by the unique-id
/// property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub database_id: String,
    pub sort_property: String,
    pub filter: Option<ListingFilter>,
}

impl ListingQuery {
    /// The listing callers read, with the collection's filter applied.
    pub fn for_collection(collection: &Collection) -> Self {
        Self {
            database_id: collection.database_id.clone(),
            sort_property: collection.schema.id_property().to_string(),
            filter: collection.filter.clone(),
        }
    }

    /// Every live record, used to resolve the target of a mutation.
    pub fn for_lookup(collection: &Collection) -> Self {
        Self {
            filter: None,
            ..Self::for_collection(collection)
        }
    }
}

// == Record Store Trait ==
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every live record matching `query`, ascending by id.
    async fn query_all(&self, query: &ListingQuery) -> StoreResult<Vec<ExternalRecord>>;

    /// Creates a page in `database_id` from a full property payload.
    async fn create(
        &self,
        database_id: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord>;

    /// Merges `properties` into the page with store handle `handle`.
    async fn update_by_id(
        &self,
        handle: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord>;

    /// Archives the page; it no longer appears in listings.
    async fn archive_by_id(&self, handle: &str) -> StoreResult<()>;
}
