//! Collection registry
//!
//! Binds each served route segment (`members`, `students`, `projects`) to its
//! database, field table and listing behaviour.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::schema::CollectionSchema;

/// Checkbox property a record must have ticked to be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub checkbox_property: String,
}

// == Collection ==
#[derive(Debug, Clone)]
pub struct Collection {
    /// Route segment and cache key
    pub name: String,
    pub database_id: String,
    pub schema: CollectionSchema,
    /// Whether listings go through the cache-aside retriever's cache
    pub cached: bool,
    pub filter: Option<ListingFilter>,
}

impl Collection {
    pub fn members(database_id: impl Into<String>) -> Self {
        Self {
            name: "members".to_string(),
            database_id: database_id.into(),
            schema: CollectionSchema::roster(),
            cached: true,
            filter: None,
        }
    }

    pub fn students(database_id: impl Into<String>) -> Self {
        Self {
            name: "students".to_string(),
            ..Self::members(database_id)
        }
    }

    pub fn projects(database_id: impl Into<String>) -> Self {
        Self {
            name: "projects".to_string(),
            database_id: database_id.into(),
            schema: CollectionSchema::projects(),
            cached: false,
            filter: Some(ListingFilter {
                checkbox_property: "FCS Public API".to_string(),
            }),
        }
    }
}

// == Registry ==
/// Collections served by this instance, keyed by route segment.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, Arc<Collection>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every collection that has a database configured.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        if let Some(id) = &config.members_database_id {
            registry.register(Collection::members(id.clone()));
        }
        if let Some(id) = &config.students_database_id {
            registry.register(Collection::students(id.clone()));
        }
        if let Some(id) = &config.projects_database_id {
            registry.register(Collection::projects(id.clone()));
        }
        registry
    }

    pub fn register(&mut self, collection: Collection) {
        self.collections
            .insert(collection.name.clone(), Arc::new(collection));
    }

    /// Looks up a collection by route segment.
    pub fn get(&self, name: &str) -> Result<Arc<Collection>> {
        self.collections
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Unknown collection '{}'", name)))
    }

    pub fn names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Collection>> {
        self.collections.values()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
