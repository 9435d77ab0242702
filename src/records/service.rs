//! Record Service
//!
//! The per-collection operations behind the HTTP handlers. Authorization is
//! decided by the caller; mutating operations here assume a privileged caller
//! and always echo the privileged view.

use std::sync::Arc;

use tracing::info;

use super::{find_by_public_id, CacheAsideRetriever};
use crate::collections::Collection;
use crate::error::Result;
use crate::models::{ExternalRecord, ProjectionLevel, PublicRecord, RecordInput};
use crate::schema::{to_external_create, to_external_patch, to_public};
use crate::store::{ListingQuery, RecordStore};

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    retriever: CacheAsideRetriever,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, retriever: CacheAsideRetriever) -> Self {
        Self { store, retriever }
    }

    async fn listing(&self, collection: &Collection) -> Result<Vec<ExternalRecord>> {
        Ok(self
            .retriever
            .list_records(self.store.as_ref(), collection)
            .await?)
    }

    /// Listing used to find the target of a mutation. A filtered collection
    /// is read unfiltered so records hidden from listings stay editable.
    async fn lookup_listing(&self, collection: &Collection) -> Result<Vec<ExternalRecord>> {
        if collection.filter.is_none() {
            return self.listing(collection).await;
        }
        Ok(self
            .store
            .query_all(&ListingQuery::for_lookup(collection))
            .await?)
    }

    pub async fn list(
        &self,
        collection: &Collection,
        level: ProjectionLevel,
    ) -> Result<Vec<PublicRecord>> {
        self.listing(collection)
            .await?
            .iter()
            .map(|record| to_public(&collection.schema, record, level))
            .collect()
    }

    pub async fn get(
        &self,
        collection: &Collection,
        id: &str,
        level: ProjectionLevel,
    ) -> Result<PublicRecord> {
        let records = self.listing(collection).await?;
        let record = find_by_public_id(&records, collection.schema.id_property(), id)?;
        to_public(&collection.schema, record, level)
    }

    pub async fn create(&self, collection: &Collection, input: &RecordInput) -> Result<PublicRecord> {
        let properties = to_external_create(&collection.schema, input)?;
        let created = self
            .store
            .create(&collection.database_id, properties)
            .await?;

        info!("Created record {} in {}", created.id, collection.name);
        to_public(&collection.schema, &created, ProjectionLevel::Privileged)
    }

    pub async fn patch(
        &self,
        collection: &Collection,
        id: &str,
        input: &RecordInput,
    ) -> Result<PublicRecord> {
        let records = self.lookup_listing(collection).await?;
        let target = find_by_public_id(&records, collection.schema.id_property(), id)?;
        let properties = to_external_patch(&collection.schema, input)?;
        if properties.is_empty() {
            return to_public(&collection.schema, target, ProjectionLevel::Privileged);
        }

        let updated = self.store.update_by_id(&target.id, properties).await?;
        info!("Updated record {} in {}", id, collection.name);
        to_public(&collection.schema, &updated, ProjectionLevel::Privileged)
    }

    pub async fn delete(&self, collection: &Collection, id: &str) -> Result<()> {
        let records = self.lookup_listing(collection).await?;
        let target = find_by_public_id(&records, collection.schema.id_property(), id)?;

        self.store.archive_by_id(&target.id).await?;
        info!("Archived record {} in {}", id, collection.name);
        Ok(())
    }
}
