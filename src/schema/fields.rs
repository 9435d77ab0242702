//! Collection field tables
//!
//! A `CollectionSchema` lists, for every public field, the database property it
//! maps to, its kind, who may see it, and whether callers may write it.

use crate::schema::ProjectionPolicy;

// == Field Kind ==
/// Property kind a public field is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    UniqueId,
    Title,
    RichText,
    Select,
    Status,
    Date,
    Checkbox,
    Formula,
}

impl FieldKind {
    /// Wire tag of the matching property variant.
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::UniqueId => "unique_id",
            FieldKind::Title => "title",
            FieldKind::RichText => "rich_text",
            FieldKind::Select => "select",
            FieldKind::Status => "status",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Formula => "formula",
        }
    }
}

// == Visibility ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Privileged,
}

// == Field Spec ==
/// One row of a collection's field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Public field name
    pub name: &'static str,
    /// Database property name
    pub property: &'static str,
    pub kind: FieldKind,
    pub visibility: Visibility,
    /// Callers may set this field on create and patch
    pub writable: bool,
    /// Must be present (and non-empty) on create
    pub required: bool,
    /// Extra input keys accepted for this field
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    /// A public, writable, optional field.
    pub const fn new(name: &'static str, property: &'static str, kind: FieldKind) -> Self {
        let writable = !matches!(kind, FieldKind::UniqueId | FieldKind::Formula);
        Self {
            name,
            property,
            kind,
            visibility: Visibility::Public,
            writable,
            required: false,
            aliases: &[],
        }
    }

    pub const fn privileged(mut self) -> Self {
        self.visibility = Visibility::Privileged;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn aliased(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// True if `key` names this field in a request body.
    pub fn accepts(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }
}

// == Collection Schema ==
/// Field table plus the projection derived from it.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    id_property: &'static str,
    fields: Vec<FieldSpec>,
    projection: ProjectionPolicy,
}

impl CollectionSchema {
    /// Builds a schema. `id_property` names the unique-id property the record
    /// locator matches on.
    pub fn new(id_property: &'static str, fields: Vec<FieldSpec>) -> Self {
        let projection = ProjectionPolicy::from_fields(&fields);
        Self {
            id_property,
            fields,
            projection,
        }
    }

    /// Roster layout shared by members and students.
    pub fn roster() -> Self {
        Self::new(
            "ID",
            vec![
                FieldSpec::new("id", "ID", FieldKind::UniqueId),
                FieldSpec::new("firstName", "First name", FieldKind::Title).required(),
                FieldSpec::new("middleInitial", "Middle name", FieldKind::RichText)
                    .privileged()
                    .aliased(&["middleName"]),
                FieldSpec::new("lastName", "Last name", FieldKind::RichText).required(),
                FieldSpec::new("age", "Age", FieldKind::Formula).privileged(),
                FieldSpec::new("birthDate", "Birth Date", FieldKind::Date).privileged(),
                FieldSpec::new("role", "Role", FieldKind::Select),
                FieldSpec::new("dateJoined", "Date Joined", FieldKind::Date),
            ],
        )
    }

    /// Project board layout.
    pub fn projects() -> Self {
        Self::new(
            "ID",
            vec![
                FieldSpec::new("id", "ID", FieldKind::UniqueId),
                FieldSpec::new("name", "Project name", FieldKind::Title).required(),
                FieldSpec::new("startDate", "Date Created", FieldKind::Date).privileged(),
                FieldSpec::new("status", "Status", FieldKind::Status),
                FieldSpec::new("priority", "Priority", FieldKind::Select).privileged(),
                FieldSpec::new("summary", "Summary", FieldKind::RichText),
                FieldSpec::new("publicAPI", "FCS Public API", FieldKind::Checkbox).privileged(),
            ],
        )
    }

    pub fn id_property(&self) -> &str {
        self.id_property
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn projection(&self) -> &ProjectionPolicy {
        &self.projection
    }

    /// Field by public name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field a request-body key refers to, including aliases.
    pub fn input_field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.accepts(key))
    }

    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.writable)
    }
}
