//! In-process record store
//!
//! Behaves like the page database for local runs and tests: assigns sequential
//! unique ids, fills every column from a per-database template on create, and
//! rejects writes to columns the database does not have.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{ListingQuery, RecordStore, StoreError, StoreResult};
use crate::collections::Collection;
use crate::models::{ExternalRecord, FormulaValue, PropertyMap, PropertyValue, UniqueId};
use crate::schema::FieldKind;

/// Number of calls made to each store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub queries: usize,
    pub creates: usize,
    pub updates: usize,
    pub archives: usize,
}

impl StoreCalls {
    pub fn mutations(&self) -> usize {
        self.creates + self.updates + self.archives
    }
}

#[derive(Debug)]
struct MemoryDatabase {
    id_property: String,
    prefix: Option<String>,
    /// Value of every column on a blank page
    template: PropertyMap,
    next_number: u64,
    pages: Vec<ExternalRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    databases: HashMap<String, MemoryDatabase>,
    next_handle: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    queries: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    archives: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty database laid out after `collection`'s field table.
    pub async fn add_collection(&self, collection: &Collection, prefix: Option<&str>) {
        let mut template = PropertyMap::new();
        for field in collection.schema.fields() {
            let blank = match field.kind {
                FieldKind::UniqueId => continue,
                FieldKind::Title => PropertyValue::Title { title: Vec::new() },
                FieldKind::RichText => PropertyValue::RichText {
                    rich_text: Vec::new(),
                },
                FieldKind::Select => PropertyValue::select(None),
                FieldKind::Status => PropertyValue::status(None),
                FieldKind::Date => PropertyValue::date(None),
                FieldKind::Checkbox => PropertyValue::Checkbox { checkbox: false },
                FieldKind::Formula => PropertyValue::Formula {
                    formula: FormulaValue::Number { number: None },
                },
            };
            template.insert(field.property.to_string(), blank);
        }

        let mut state = self.state.write().await;
        state.databases.insert(
            collection.database_id.clone(),
            MemoryDatabase {
                id_property: collection.schema.id_property().to_string(),
                prefix: prefix.map(str::to_string),
                template,
                next_number: 1,
                pages: Vec::new(),
            },
        );
    }

    /// Inserts a page without counting it as a store call.
    pub async fn seed(
        &self,
        database_id: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord> {
        let mut state = self.state.write().await;
        insert_page(&mut state, database_id, properties)
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            queries: self.queries.load(Ordering::SeqCst),
            creates: self.creates.load(Ordering::SeqCst),
            updates: self.updates.load(Ordering::SeqCst),
            archives: self.archives.load(Ordering::SeqCst),
        }
    }
}

fn insert_page(
    state: &mut MemoryState,
    database_id: &str,
    properties: PropertyMap,
) -> StoreResult<ExternalRecord> {
    state.next_handle += 1;
    let handle = format!("page-{}", state.next_handle);

    let database = state
        .databases
        .get_mut(database_id)
        .ok_or_else(|| StoreError::NotFound(format!("database {}", database_id)))?;

    let mut page_properties = database.template.clone();
    for (name, value) in properties {
        if !page_properties.contains_key(&name) {
            return Err(StoreError::Validation(format!(
                "{} is not a property that exists",
                name
            )));
        }
        page_properties.insert(name, value);
    }

    let number = database.next_number;
    database.next_number += 1;
    page_properties.insert(
        database.id_property.clone(),
        PropertyValue::UniqueId {
            unique_id: UniqueId {
                prefix: database.prefix.clone(),
                number: Some(number),
            },
        },
    );

    let page = ExternalRecord::new(handle, page_properties);
    database.pages.push(page.clone());
    Ok(page)
}

fn matches_filter(page: &ExternalRecord, query: &ListingQuery) -> bool {
    match &query.filter {
        Some(filter) => matches!(
            page.properties.get(&filter.checkbox_property),
            Some(PropertyValue::Checkbox { checkbox: true })
        ),
        None => true,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query_all(&self, query: &ListingQuery) -> StoreResult<Vec<ExternalRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        let database = state
            .databases
            .get(&query.database_id)
            .ok_or_else(|| StoreError::NotFound(format!("database {}", query.database_id)))?;

        let mut records: Vec<ExternalRecord> = database
            .pages
            .iter()
            .filter(|page| !page.archived && matches_filter(page, query))
            .cloned()
            .collect();
        records.sort_by_key(|page| {
            page.sequence_number(&query.sort_property)
                .unwrap_or(u64::MAX)
        });

        debug!(
            "Memory store returned {} records from {}",
            records.len(),
            query.database_id
        );
        Ok(records)
    }

    async fn create(
        &self,
        database_id: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        insert_page(&mut state, database_id, properties)
    }

    async fn update_by_id(
        &self,
        handle: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        let page = state
            .databases
            .values_mut()
            .flat_map(|db| db.pages.iter_mut())
            .find(|page| page.id == handle && !page.archived)
            .ok_or_else(|| StoreError::NotFound(format!("page {}", handle)))?;

        if let Some(unknown) = properties
            .keys()
            .find(|name| !page.properties.contains_key(*name))
        {
            return Err(StoreError::Validation(format!(
                "{} is not a property that exists",
                unknown
            )));
        }

        page.properties.extend(properties);
        Ok(page.clone())
    }

    async fn archive_by_id(&self, handle: &str) -> StoreResult<()> {
        self.archives.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        let page = state
            .databases
            .values_mut()
            .flat_map(|db| db.pages.iter_mut())
            .find(|page| page.id == handle && !page.archived)
            .ok_or_else(|| StoreError::NotFound(format!("page {}", handle)))?;

        page.archived = true;
        Ok(())
    }
}
