//! Schema Mapper
//!
//! Pure conversions between `ExternalRecord` properties and `PublicRecord`s.
//!
//! Create and patch are deliberately different operations: a create payload
//! carries every writable property, while a patch carries only the properties
//! whose public keys appear in the input.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::models::requests::json_kind;
use crate::models::{
    ExternalRecord, FormulaValue, ProjectionLevel, PropertyMap, PropertyValue, PublicRecord,
    RecordInput, RichText,
};
use crate::schema::{CollectionSchema, FieldKind, FieldSpec};

// == Inbound ==
/// Decodes the fields of `record` visible at `level`.
pub fn to_public(
    schema: &CollectionSchema,
    record: &ExternalRecord,
    level: ProjectionLevel,
) -> Result<PublicRecord> {
    let projection = schema.projection();
    let mut public = PublicRecord::new();

    for field in schema.fields() {
        if !projection.is_visible(field.name, level) {
            continue;
        }

        let value = record.properties.get(field.property).ok_or_else(|| {
            ApiError::MalformedRecord(format!(
                "record {} is missing property `{}`",
                record.id, field.property
            ))
        })?;

        public.insert(field.name, decode_property(field, value, &record.id)?);
    }

    Ok(public)
}

fn decode_property(field: &FieldSpec, value: &PropertyValue, record_id: &str) -> Result<Value> {
    let decoded = match (field.kind, value) {
        (FieldKind::Title, PropertyValue::Title { title }) => {
            if title.is_empty() {
                return Err(ApiError::MalformedRecord(format!(
                    "record {}: title property `{}` has no text",
                    record_id, field.property
                )));
            }
            Value::String(join_runs(title))
        }
        (FieldKind::RichText, PropertyValue::RichText { rich_text }) => {
            Value::String(join_runs(rich_text))
        }
        (FieldKind::Select, PropertyValue::Select { select: option })
        | (FieldKind::Status, PropertyValue::Status { status: option }) => option
            .as_ref()
            .map(|o| Value::String(o.name.clone()))
            .unwrap_or(Value::Null),
        (FieldKind::Date, PropertyValue::Date { date }) => date
            .as_ref()
            .map(|d| Value::String(d.start.clone()))
            .unwrap_or(Value::Null),
        (FieldKind::Checkbox, PropertyValue::Checkbox { checkbox }) => Value::Bool(*checkbox),
        (FieldKind::Formula, PropertyValue::Formula { formula }) => decode_formula(formula),
        (FieldKind::UniqueId, PropertyValue::UniqueId { unique_id }) => {
            let id = unique_id.display().ok_or_else(|| {
                ApiError::MalformedRecord(format!(
                    "record {}: unique id `{}` has no number",
                    record_id, field.property
                ))
            })?;
            Value::String(id)
        }
        (kind, other) => {
            return Err(ApiError::MalformedRecord(format!(
                "record {}: property `{}` should be `{}`, found `{}`",
                record_id,
                field.property,
                kind.tag(),
                other.kind()
            )))
        }
    };

    Ok(decoded)
}

fn join_runs(runs: &[RichText]) -> String {
    runs.iter().map(RichText::as_plain).collect()
}

fn decode_formula(formula: &FormulaValue) -> Value {
    match formula {
        FormulaValue::Number { number: Some(n) } => number_value(*n),
        FormulaValue::String { string: Some(s) } => Value::String(s.clone()),
        FormulaValue::Boolean { boolean: Some(b) } => Value::Bool(*b),
        FormulaValue::Date { date: Some(d) } => Value::String(d.start.clone()),
        _ => Value::Null,
    }
}

/// Whole numbers render without a fractional part (`21`, not `21.0`).
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

// == Outbound: Create ==
/// Full property payload for a new record.
pub fn to_external_create(schema: &CollectionSchema, input: &RecordInput) -> Result<PropertyMap> {
    let supplied = collect_input(schema, input)?;
    let mut properties = PropertyMap::new();

    for field in schema.writable_fields() {
        let value = supplied
            .iter()
            .find(|(spec, _)| spec.name == field.name)
            .map(|(_, value)| *value);

        let property = match value {
            Some(value) => encode_value(field, value)?,
            None if field.required => {
                return Err(ApiError::MalformedInput(format!(
                    "missing required field `{}`",
                    field.name
                )))
            }
            None => empty_value(field.kind),
        };

        properties.insert(field.property.to_string(), property);
    }

    Ok(properties)
}

// == Outbound: Patch ==
/// Sparse property payload containing only the keys present in `input`.
pub fn to_external_patch(schema: &CollectionSchema, input: &RecordInput) -> Result<PropertyMap> {
    let supplied = collect_input(schema, input)?;

    let mut properties = PropertyMap::new();
    for (field, value) in supplied {
        properties.insert(field.property.to_string(), encode_value(field, value)?);
    }

    Ok(properties)
}

/// Resolves body keys to writable fields, rejecting unknown, read-only and
/// repeated (via alias) fields.
fn collect_input<'a, 'b>(
    schema: &'a CollectionSchema,
    input: &'b RecordInput,
) -> Result<Vec<(&'a FieldSpec, &'b Value)>> {
    let mut seen = BTreeSet::new();
    let mut supplied = Vec::with_capacity(input.len());

    for (key, value) in input.iter() {
        let field = schema
            .input_field(key)
            .ok_or_else(|| ApiError::MalformedInput(format!("unknown field `{}`", key)))?;

        if !field.writable {
            return Err(ApiError::MalformedInput(format!(
                "field `{}` is read-only",
                field.name
            )));
        }
        if !seen.insert(field.name) {
            return Err(ApiError::MalformedInput(format!(
                "field `{}` given more than once",
                field.name
            )));
        }

        supplied.push((field, value));
    }

    Ok(supplied)
}

fn encode_value(field: &FieldSpec, value: &Value) -> Result<PropertyValue> {
    if value.is_null() {
        if field.required {
            return Err(ApiError::MalformedInput(format!(
                "field `{}` cannot be cleared",
                field.name
            )));
        }
        return match field.kind {
            FieldKind::Checkbox => Err(invalid_type(field, "a boolean", value)),
            FieldKind::RichText => Ok(PropertyValue::RichText {
                rich_text: Vec::new(),
            }),
            kind => Ok(empty_value(kind)),
        };
    }

    match field.kind {
        FieldKind::Title => Ok(PropertyValue::title(text_input(field, value)?)),
        FieldKind::RichText => Ok(PropertyValue::rich_text(text_input(field, value)?)),
        FieldKind::Select => Ok(PropertyValue::select(Some(text_input(field, value)?))),
        FieldKind::Status => Ok(PropertyValue::status(Some(text_input(field, value)?))),
        FieldKind::Date => Ok(PropertyValue::date(Some(date_input(field, value)?))),
        FieldKind::Checkbox => value
            .as_bool()
            .map(|checkbox| PropertyValue::Checkbox { checkbox })
            .ok_or_else(|| invalid_type(field, "a boolean", value)),
        FieldKind::UniqueId | FieldKind::Formula => Err(ApiError::MalformedInput(format!(
            "field `{}` is read-only",
            field.name
        ))),
    }
}

fn text_input(field: &FieldSpec, value: &Value) -> Result<String> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid_type(field, "a string", value))?;

    if field.required && text.trim().is_empty() {
        return Err(ApiError::MalformedInput(format!(
            "field `{}` cannot be empty",
            field.name
        )));
    }
    Ok(text.to_string())
}

fn date_input(field: &FieldSpec, value: &Value) -> Result<String> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid_type(field, "a date string", value))?;

    let valid = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(text).is_ok();
    if !valid {
        return Err(ApiError::MalformedInput(format!(
            "field `{}` is not an ISO 8601 date: {}",
            field.name, text
        )));
    }
    Ok(text.to_string())
}

fn invalid_type(field: &FieldSpec, expected: &str, value: &Value) -> ApiError {
    ApiError::MalformedInput(format!(
        "field `{}` must be {}, got {}",
        field.name,
        expected,
        json_kind(value)
    ))
}

/// Well-formed placeholder for a field absent from a create body.
fn empty_value(kind: FieldKind) -> PropertyValue {
    match kind {
        FieldKind::Title => PropertyValue::title(""),
        FieldKind::RichText => PropertyValue::rich_text(""),
        FieldKind::Select => PropertyValue::select(None),
        FieldKind::Status => PropertyValue::status(None),
        FieldKind::Date => PropertyValue::date(None),
        FieldKind::Checkbox => PropertyValue::Checkbox { checkbox: false },
        FieldKind::UniqueId | FieldKind::Formula => PropertyValue::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UniqueId;
    use serde_json::Map;

    fn input(value: Value) -> RecordInput {
        match value {
            Value::Object(map) => RecordInput::from(map),
            _ => RecordInput::from(Map::new()),
        }
    }

    fn stored_member() -> ExternalRecord {
        let mut properties = PropertyMap::new();
        properties.insert(
            "ID".into(),
            PropertyValue::UniqueId {
                unique_id: UniqueId {
                    prefix: Some("MEM".into()),
                    number: Some(3),
                },
            },
        );
        properties.insert("First name".into(), PropertyValue::title("Grace"));
        properties.insert("Middle name".into(), PropertyValue::rich_text("B"));
        properties.insert("Last name".into(), PropertyValue::rich_text("Hopper"));
        properties.insert(
            "Age".into(),
            PropertyValue::Formula {
                formula: FormulaValue::Number { number: Some(37.0) },
            },
        );
        properties.insert("Birth Date".into(), PropertyValue::date(None));
        properties.insert("Role".into(), PropertyValue::select(Some("Member".into())));
        properties.insert(
            "Date Joined".into(),
            PropertyValue::date(Some("2023-09-01".into())),
        );
        ExternalRecord::new("page-3", properties)
    }

    #[test]
    fn test_to_public_privileged() {
        let schema = CollectionSchema::roster();
        let public = to_public(&schema, &stored_member(), ProjectionLevel::Privileged).unwrap();

        assert_eq!(public.get("id"), Some(&json!("MEM-3")));
        assert_eq!(public.get("middleInitial"), Some(&json!("B")));
        assert_eq!(public.get("age"), Some(&json!(37)));
        assert_eq!(public.get("birthDate"), Some(&Value::Null));
        assert_eq!(public.get("role"), Some(&json!("Member")));
    }

    #[test]
    fn test_to_public_public_level_skips_privileged_properties() {
        let schema = CollectionSchema::roster();
        let mut record = stored_member();
        // Privileged-only properties are not needed for a public read
        record.properties.remove("Age");

        let public = to_public(&schema, &record, ProjectionLevel::Public).unwrap();
        assert!(!public.contains("age"));
        assert!(!public.contains("middleInitial"));
        assert_eq!(public.get("lastName"), Some(&json!("Hopper")));
    }

    #[test]
    fn test_missing_property_is_malformed() {
        let schema = CollectionSchema::roster();
        let mut record = stored_member();
        record.properties.remove("Last name");

        let result = to_public(&schema, &record, ProjectionLevel::Public);
        assert!(matches!(result, Err(ApiError::MalformedRecord(msg)) if msg.contains("Last name")));
    }

    #[test]
    fn test_empty_title_is_malformed() {
        let schema = CollectionSchema::roster();
        let mut record = stored_member();
        record
            .properties
            .insert("First name".into(), PropertyValue::Title { title: vec![] });

        let result = to_public(&schema, &record, ProjectionLevel::Public);
        assert!(matches!(result, Err(ApiError::MalformedRecord(_))));
    }

    #[test]
    fn test_wrong_tag_is_malformed() {
        let schema = CollectionSchema::roster();
        let mut record = stored_member();
        record
            .properties
            .insert("Role".into(), PropertyValue::rich_text("Member"));

        let result = to_public(&schema, &record, ProjectionLevel::Public);
        assert!(
            matches!(result, Err(ApiError::MalformedRecord(msg)) if msg.contains("`select`"))
        );
    }

    #[test]
    fn test_create_fills_absent_optional_fields() {
        let schema = CollectionSchema::roster();
        let properties = to_external_create(
            &schema,
            &input(json!({ "firstName": "Ada", "lastName": "Lovelace" })),
        )
        .unwrap();

        let keys: Vec<_> = properties.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "Birth Date",
                "Date Joined",
                "First name",
                "Last name",
                "Middle name",
                "Role"
            ]
        );
        assert_eq!(properties["Middle name"], PropertyValue::rich_text(""));
        assert_eq!(properties["Role"], PropertyValue::select(None));
        assert_eq!(properties["Birth Date"], PropertyValue::date(None));
    }

    #[test]
    fn test_create_requires_required_fields() {
        let schema = CollectionSchema::roster();
        let result = to_external_create(&schema, &input(json!({ "firstName": "Ada" })));
        assert!(matches!(result, Err(ApiError::MalformedInput(msg)) if msg.contains("lastName")));
    }

    #[test]
    fn test_create_checkbox_defaults_false() {
        let schema = CollectionSchema::projects();
        let properties = to_external_create(&schema, &input(json!({ "name": "Site" }))).unwrap();
        assert_eq!(
            properties["FCS Public API"],
            PropertyValue::Checkbox { checkbox: false }
        );
        assert_eq!(properties["Status"], PropertyValue::status(None));
    }

    #[test]
    fn test_patch_is_sparse() {
        let schema = CollectionSchema::roster();
        let properties = to_external_patch(&schema, &input(json!({ "role": "Officer" }))).unwrap();

        assert_eq!(properties.len(), 1);
        assert_eq!(
            properties["Role"],
            PropertyValue::select(Some("Officer".into()))
        );
    }

    #[test]
    fn test_patch_accepts_alias() {
        let schema = CollectionSchema::roster();
        let properties =
            to_external_patch(&schema, &input(json!({ "middleName": "Q" }))).unwrap();
        assert_eq!(properties["Middle name"], PropertyValue::rich_text("Q"));
    }

    #[test]
    fn test_patch_rejects_alias_and_name_together() {
        let schema = CollectionSchema::roster();
        let result = to_external_patch(
            &schema,
            &input(json!({ "middleName": "Q", "middleInitial": "R" })),
        );
        assert!(matches!(result, Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let schema = CollectionSchema::roster();
        let properties = to_external_patch(&schema, &input(json!({ "role": null }))).unwrap();
        assert_eq!(properties["Role"], PropertyValue::select(None));
    }

    #[test]
    fn test_patch_rejects_clearing_required_field() {
        let schema = CollectionSchema::roster();
        let result = to_external_patch(&schema, &input(json!({ "firstName": null })));
        assert!(matches!(result, Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn test_patch_rejects_read_only_and_unknown_fields() {
        let schema = CollectionSchema::roster();
        for body in [json!({ "id": "MEM-9" }), json!({ "age": 40 }), json!({ "shoe": 9 })] {
            let result = to_external_patch(&schema, &input(body));
            assert!(matches!(result, Err(ApiError::MalformedInput(_))));
        }
    }

    #[test]
    fn test_empty_patch_touches_nothing() {
        let schema = CollectionSchema::roster();
        let properties = to_external_patch(&schema, &input(json!({}))).unwrap();
        assert!(properties.is_empty());
    }

    #[test]
    fn test_patch_validates_types() {
        let schema = CollectionSchema::projects();
        let bad_checkbox = to_external_patch(&schema, &input(json!({ "publicAPI": "yes" })));
        let bad_date = to_external_patch(&schema, &input(json!({ "startDate": "next week" })));
        let bad_text = to_external_patch(&schema, &input(json!({ "status": 3 })));

        assert!(matches!(bad_checkbox, Err(ApiError::MalformedInput(_))));
        assert!(matches!(bad_date, Err(ApiError::MalformedInput(_))));
        assert!(matches!(bad_text, Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn test_date_accepts_rfc3339() {
        let schema = CollectionSchema::projects();
        let properties = to_external_patch(
            &schema,
            &input(json!({ "startDate": "2024-03-01T09:30:00+02:00" })),
        )
        .unwrap();
        assert_eq!(
            properties["Date Created"],
            PropertyValue::date(Some("2024-03-01T09:30:00+02:00".into()))
        );
    }

    #[test]
    fn test_fractional_formula_keeps_fraction() {
        assert_eq!(number_value(21.5), json!(21.5));
        assert_eq!(number_value(21.0), json!(21));
    }
}
