//! Caller-facing record shape

use serde::Serialize;
use serde_json::{Map, Value};

// == Projection Level ==
/// How much of a record the caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionLevel {
    Privileged,
    Public,
}

impl ProjectionLevel {
    pub fn is_privileged(self) -> bool {
        matches!(self, ProjectionLevel::Privileged)
    }
}

// == Public Record ==
/// Flat field-name to scalar mapping, in collection field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PublicRecord(Map<String, Value>);

impl PublicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Removes `field`, keeping the remaining fields in order.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PublicRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
