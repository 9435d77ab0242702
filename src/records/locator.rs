//! Record Locator
//!
//! Resolves a caller-facing id (`"3"` or `"MEM-3"`) to a record in a listing.

use crate::error::{ApiError, Result};
use crate::models::ExternalRecord;

/// Parses the sequence number out of a public id.
fn requested_number(id: &str) -> Option<u64> {
    let digits = id.rsplit('-').next().unwrap_or(id).trim();
    digits.parse().ok()
}

/// Finds the record whose unique-id number matches `id`.
pub fn find_by_public_id<'a>(
    records: &'a [ExternalRecord],
    id_property: &str,
    id: &str,
) -> Result<&'a ExternalRecord> {
    let not_found = || ApiError::NotFound(format!("No record with id '{}'", id));
    let number = requested_number(id).ok_or_else(not_found)?;

    records
        .iter()
        .find(|record| record.sequence_number(id_property) == Some(number))
        .ok_or_else(not_found)
}
