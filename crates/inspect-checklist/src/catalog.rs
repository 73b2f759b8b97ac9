//! Catalog loading for the inspection checklist.
//!
//! Supports the checklist.yaml format with:
//! - Ordered categories, each with ordered fields
//! - `type` names from the inspection form (text, number, date, select,
//!   radio, checkbox, photo) and from the template editor (input,
//!   multi_select, boolean)
//! - Optional `photoCount` limits on photo fields

use inspect_core::{
    validate_categories, CategoryDefinition, FieldDefinition, FieldKind, InspectError, InspectResult,
};
use serde::Deserialize;

/// Options given to a `boolean` field that lists none
pub const BOOLEAN_OPTIONS: [&str; 2] = ["是", "否"];

/// Top-level catalog file structure
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub version: String,
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "items")]
    pub fields: Vec<RawField>,
}

/// A field as written in the file, before kind/options are reconciled
#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    pub id: String,
    pub name: String,
    pub r#type: RawKind,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "photoCount")]
    pub photo_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKind {
    #[serde(alias = "input")]
    Text,
    Number,
    Date,
    Select,
    Radio,
    #[serde(alias = "multi_select")]
    Checkbox,
    Boolean,
    Photo,
}

impl RawField {
    /// Resolve the raw `type`/`options`/`photoCount` triple into a [`FieldKind`]
    pub fn compile(self) -> InspectResult<FieldDefinition> {
        let RawField {
            id,
            name,
            r#type,
            options,
            required,
            placeholder,
            description,
            photo_count,
        } = self;

        if photo_count.is_some() && r#type != RawKind::Photo {
            return Err(InspectError::Validation(format!(
                "field '{}' sets photoCount but is not a photo field",
                id
            )));
        }

        let kind = match (r#type, options) {
            (RawKind::Select, options) => FieldKind::Select { options: options.unwrap_or_default() },
            (RawKind::Radio, options) => FieldKind::Radio { options: options.unwrap_or_default() },
            (RawKind::Checkbox, options) => FieldKind::Checkbox { options: options.unwrap_or_default() },
            (RawKind::Boolean, Some(options)) => FieldKind::Radio { options },
            (RawKind::Boolean, None) => FieldKind::Radio {
                options: BOOLEAN_OPTIONS.iter().map(|s| s.to_string()).collect(),
            },
            (_, Some(_)) => {
                return Err(InspectError::Validation(format!(
                    "field '{}' lists options but is not a choice field",
                    id
                )))
            }
            (RawKind::Text, None) => FieldKind::Text,
            (RawKind::Number, None) => FieldKind::Number,
            (RawKind::Date, None) => FieldKind::Date,
            (RawKind::Photo, None) => FieldKind::Photo { count: photo_count },
        };

        let field = FieldDefinition {
            id,
            name,
            kind,
            required,
            placeholder,
            description,
        };
        field.validate()?;
        Ok(field)
    }
}

impl CatalogFile {
    /// Parse a catalog from YAML content
    pub fn from_yaml(yaml: &str) -> InspectResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| InspectError::Catalog(format!("Failed to parse checklist YAML: {}", e)))
    }

    /// Compile every field and check checklist-wide uniqueness
    pub fn compile(self) -> InspectResult<(String, Vec<CategoryDefinition>)> {
        let mut categories = Vec::with_capacity(self.categories.len());

        for raw in self.categories {
            let fields = raw
                .fields
                .into_iter()
                .map(RawField::compile)
                .collect::<InspectResult<Vec<_>>>()?;
            categories.push(CategoryDefinition {
                id: raw.id,
                name: raw.name,
                fields,
            });
        }

        validate_categories(&categories)?;
        Ok((self.version, categories))
    }
}
