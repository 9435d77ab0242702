//! Store-native record shapes
//!
//! Each property is a typed variant tagged by `type`, mirroring the page
//! database's wire format. Unknown property kinds decode to `Unsupported` so a
//! new column in the database never breaks listing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Properties keyed by the database column name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

// == External Record ==
/// A page as returned by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    /// Store-internal handle, never exposed to callers
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl ExternalRecord {
    pub fn new(id: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            id: id.into(),
            archived: false,
            properties,
        }
    }

    /// Sequence number of the record's unique-id property, if it has one.
    pub fn sequence_number(&self, id_property: &str) -> Option<u64> {
        match self.properties.get(id_property) {
            Some(PropertyValue::UniqueId { unique_id }) => unique_id.number,
            _ => None,
        }
    }
}

// == Property Value ==
/// One typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichText>,
    },
    RichText {
        rich_text: Vec<RichText>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Date {
        date: Option<DateValue>,
    },
    Checkbox {
        checkbox: bool,
    },
    Formula {
        formula: FormulaValue,
    },
    UniqueId {
        unique_id: UniqueId,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// Wire tag of this variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Select { .. } => "select",
            PropertyValue::Status { .. } => "status",
            PropertyValue::Date { .. } => "date",
            PropertyValue::Checkbox { .. } => "checkbox",
            PropertyValue::Formula { .. } => "formula",
            PropertyValue::UniqueId { .. } => "unique_id",
            PropertyValue::Unsupported => "unsupported",
        }
    }

    pub fn title(text: impl Into<String>) -> Self {
        PropertyValue::Title {
            title: vec![RichText::plain(text)],
        }
    }

    pub fn rich_text(text: impl Into<String>) -> Self {
        PropertyValue::RichText {
            rich_text: vec![RichText::plain(text)],
        }
    }

    pub fn select(name: Option<String>) -> Self {
        PropertyValue::Select {
            select: name.map(SelectOption::named),
        }
    }

    pub fn status(name: Option<String>) -> Self {
        PropertyValue::Status {
            status: name.map(SelectOption::named),
        }
    }

    pub fn date(start: Option<String>) -> Self {
        PropertyValue::Date {
            date: start.map(DateValue::starting),
        }
    }
}

// == Rich Text ==
/// One run of formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "type", default = "text_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

fn text_kind() -> String {
    "text".to_string()
}

impl RichText {
    /// Unformatted text run.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: text_kind(),
            text: Some(TextContent {
                content: content.into(),
                link: None,
            }),
            plain_text: None,
        }
    }

    /// Rendered text of the run. Stores fill `plain_text`; runs built locally
    /// only carry `text.content`.
    pub fn as_plain(&self) -> &str {
        match (&self.plain_text, &self.text) {
            (Some(plain), _) => plain,
            (None, Some(text)) => &text.content,
            (None, None) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default)]
    pub link: Option<serde_json::Value>,
}

// == Select Option ==
/// A select or status option. Writes carry only the name; the store resolves
/// the option id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn named(name: String) -> Self {
        Self {
            id: None,
            name,
            color: None,
        }
    }
}

// == Date ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl DateValue {
    pub fn starting(start: String) -> Self {
        Self {
            start,
            end: None,
            time_zone: None,
        }
    }
}

// == Formula ==
/// Computed column result. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    Number { number: Option<f64> },
    String { string: Option<String> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateValue> },
}

// == Unique Id ==
/// Store-assigned `<prefix>-<number>` identifier. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueId {
    #[serde(default)]
    pub prefix: Option<String>,
    pub number: Option<u64>,
}

impl UniqueId {
    /// Public identifier string.
    pub fn display(&self) -> Option<String> {
        let number = self.number?;
        Some(match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}-{}", prefix, number),
            _ => number.to_string(),
        })
    }
}
