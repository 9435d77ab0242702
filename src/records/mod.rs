//! Record Pipeline Module
//!
//! Reads go through the cache-aside retriever and the locator; writes go
//! through the schema mapper straight to the store.

mod locator;
mod retriever;
mod service;

pub use locator::find_by_public_id;
pub use retriever::CacheAsideRetriever;
pub use service::RecordService;
