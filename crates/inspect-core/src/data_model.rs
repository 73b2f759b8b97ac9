//! Data Model: categories, field definitions and captured values
//!
//! A checklist is an ordered list of [`CategoryDefinition`]s, each holding
//! [`FieldDefinition`]s. The kind of a field decides which [`FieldValue`]
//! shapes it accepts; that decision lives in [`FieldDefinition::check_value`].

use crate::error::{InspectError, InspectResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Date format accepted by date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Vehicle power train a template is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Fuel,
    Electric,
}

impl VehicleType {
    pub const ALL: [VehicleType; 2] = [VehicleType::Fuel, VehicleType::Electric];

    /// Display label used by the back office
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Fuel => "燃油车",
            VehicleType::Electric => "新能源",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VehicleType::Fuel => write!(f, "fuel"),
            VehicleType::Electric => write!(f, "electric"),
        }
    }
}

impl FromStr for VehicleType {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuel" => Ok(VehicleType::Fuel),
            "electric" => Ok(VehicleType::Electric),
            other => Err(InspectError::Validation(format!("unknown vehicle type '{}'", other))),
        }
    }
}

/// Input kind of a field. Choice kinds carry their options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Select { options: Vec<String> },
    Radio { options: Vec<String> },
    /// Multi-select; values are an ordered set of options
    Checkbox { options: Vec<String> },
    Photo {
        /// Upper bound on references per value
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
    },
}

impl FieldKind {
    /// Short tag, matching the catalog `type` names
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Photo { .. } => "photo",
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            FieldKind::Select { options }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => Some(options),
            FieldKind::Text | FieldKind::Number | FieldKind::Date | FieldKind::Photo { .. } => None,
        }
    }

    pub fn is_choice(&self) -> bool {
        self.options().is_some()
    }

    fn validate(&self, field_id: &str) -> InspectResult<()> {
        if let Some(options) = self.options() {
            if options.is_empty() {
                return Err(InspectError::Validation(format!(
                    "field '{}' of kind {} needs at least one option",
                    field_id,
                    self.tag()
                )));
            }
            let mut seen = HashSet::new();
            for option in options {
                if option.trim().is_empty() {
                    return Err(InspectError::Validation(format!(
                        "field '{}' has a blank option",
                        field_id
                    )));
                }
                if !seen.insert(option.as_str()) {
                    return Err(InspectError::Validation(format!(
                        "field '{}' lists option '{}' twice",
                        field_id, option
                    )));
                }
            }
        }
        if let FieldKind::Photo { count: Some(0) } = self {
            return Err(InspectError::Validation(format!(
                "field '{}' allows zero photos",
                field_id
            )));
        }
        Ok(())
    }
}

/// A single inspection field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    /// Create an optional field; chain [`FieldDefinition::required`] to require it
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            required: false,
            placeholder: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Structural checks: non-blank id/name and the option rules of the kind
    pub fn validate(&self) -> InspectResult<()> {
        if self.id.trim().is_empty() {
            return Err(InspectError::Validation(format!(
                "field '{}' has a blank id",
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(InspectError::Validation(format!(
                "field '{}' has a blank name",
                self.id
            )));
        }
        self.kind.validate(&self.id)
    }

    /// Check that `value` has the shape this field's kind accepts
    pub fn check_value(&self, value: &FieldValue) -> InspectResult<()> {
        let mismatch = |reason: String| Err(InspectError::type_mismatch(&self.id, reason));

        match (&self.kind, value) {
            (FieldKind::Text, FieldValue::Text(_)) => Ok(()),
            (FieldKind::Number, FieldValue::Number(n)) => {
                if n.is_finite() {
                    Ok(())
                } else {
                    mismatch(format!("{} is not a finite number", n))
                }
            }
            (FieldKind::Date, FieldValue::Text(s)) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(_) => Ok(()),
                Err(_) => mismatch(format!("'{}' is not a YYYY-MM-DD date", s)),
            },
            (FieldKind::Select { options }, FieldValue::Text(s))
            | (FieldKind::Radio { options }, FieldValue::Text(s)) => {
                if options.iter().any(|o| o == s) {
                    Ok(())
                } else {
                    mismatch(format!("'{}' is not one of the options", s))
                }
            }
            (FieldKind::Checkbox { options }, FieldValue::Options(chosen)) => {
                let mut seen = HashSet::new();
                for choice in chosen {
                    if !options.iter().any(|o| o == choice) {
                        return mismatch(format!("'{}' is not one of the options", choice));
                    }
                    if !seen.insert(choice.as_str()) {
                        return mismatch(format!("'{}' selected twice", choice));
                    }
                }
                Ok(())
            }
            (FieldKind::Photo { count }, FieldValue::Photos(refs)) => {
                if refs.iter().any(|r| r.trim().is_empty()) {
                    return mismatch("blank photo reference".to_string());
                }
                match count {
                    Some(max) if refs.len() > *max as usize => {
                        mismatch(format!("{} photos exceed the limit of {}", refs.len(), max))
                    }
                    _ => Ok(()),
                }
            }
            (kind, value) => mismatch(format!(
                "a {} value does not fit a {} field",
                value.tag(),
                kind.tag()
            )),
        }
    }
}

/// A named, ordered group of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl CategoryDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Validate a whole category list: unique category ids, field ids unique
/// across every category, and each field well formed.
pub fn validate_categories(categories: &[CategoryDefinition]) -> InspectResult<()> {
    let mut category_ids = HashSet::new();
    let mut field_ids = HashSet::new();

    for category in categories {
        if category.id.trim().is_empty() {
            return Err(InspectError::Validation(format!(
                "category '{}' has a blank id",
                category.name
            )));
        }
        if !category_ids.insert(category.id.as_str()) {
            return Err(InspectError::Validation(format!(
                "duplicate category id '{}'",
                category.id
            )));
        }
        for field in &category.fields {
            field.validate()?;
            if !field_ids.insert(field.id.as_str()) {
                return Err(InspectError::Validation(format!(
                    "duplicate field id '{}' in category '{}'",
                    field.id, category.id
                )));
            }
        }
    }

    Ok(())
}

/// A captured answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Text, date and single-choice answers
    Text(String),
    Number(f64),
    /// Checkbox answers, an ordered set
    Options(Vec<String>),
    /// Opaque photo storage references
    Photos(Vec<String>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn options<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Options(items.into_iter().map(Into::into).collect())
    }

    pub fn photos<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Photos(refs.into_iter().map(Into::into).collect())
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Options(_) => "options",
            FieldValue::Photos(_) => "photos",
        }
    }

    /// True for values that carry no answer (blank text, empty lists)
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::Options(v) | FieldValue::Photos(v) => v.is_empty(),
        }
    }

    /// Convert raw form input into the value shape `field` expects.
    ///
    /// Multi-valued kinds split on ASCII and full-width commas. The result is
    /// not checked against options; pass it through [`FieldDefinition::check_value`].
    pub fn parse_for(field: &FieldDefinition, raw: &str) -> InspectResult<FieldValue> {
        let raw = raw.trim();
        let split = || {
            raw.split([',', '，'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        match &field.kind {
            FieldKind::Text
            | FieldKind::Date
            | FieldKind::Select { .. }
            | FieldKind::Radio { .. } => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Number => raw
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| InspectError::type_mismatch(&field.id, format!("'{}' is not a number", raw))),
            FieldKind::Checkbox { .. } => Ok(FieldValue::Options(split())),
            FieldKind::Photo { .. } => Ok(FieldValue::Photos(split())),
        }
    }
}
