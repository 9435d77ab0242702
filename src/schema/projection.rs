//! Projection Policy
//!
//! Strips privileged-only fields from records served to public callers.

use std::collections::BTreeSet;

use crate::models::{ProjectionLevel, PublicRecord};
use crate::schema::{FieldSpec, Visibility};

/// Per-collection set of fields hidden from public callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionPolicy {
    privileged_only: BTreeSet<String>,
}

impl ProjectionPolicy {
    pub fn new<I, S>(privileged_only: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_only: privileged_only.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy hiding every field whose visibility is `Privileged`.
    pub fn from_fields(fields: &[FieldSpec]) -> Self {
        Self::new(
            fields
                .iter()
                .filter(|f| f.visibility == Visibility::Privileged)
                .map(|f| f.name),
        )
    }

    pub fn is_visible(&self, field: &str, level: ProjectionLevel) -> bool {
        level.is_privileged() || !self.privileged_only.contains(field)
    }

    /// Copy of `record` without the fields `level` may not see.
    pub fn project(&self, record: &PublicRecord, level: ProjectionLevel) -> PublicRecord {
        let mut projected = record.clone();
        if !level.is_privileged() {
            for field in &self.privileged_only {
                projected.remove(field);
            }
        }
        projected
    }
}
