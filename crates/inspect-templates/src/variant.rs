//! Template variants: vehicle-type scoped, independently editable checklists

use chrono::{DateTime, Utc};
use inspect_checklist::Checklist;
use inspect_core::{
    validate_categories, CategoryDefinition, FieldDefinition, InspectError, InspectResult, VehicleType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of generated field ids
pub const NEW_FIELD_PREFIX: &str = "new-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Active,
    Inactive,
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TemplateStatus::Active => write!(f, "active"),
            TemplateStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Which variant, if any, is active for one vehicle type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "variant_id", rename_all = "snake_case")]
pub enum ActiveSlot {
    Active(String),
    #[default]
    NoneActive,
}

impl ActiveSlot {
    pub fn variant_id(&self) -> Option<&str> {
        match self {
            ActiveSlot::Active(id) => Some(id),
            ActiveSlot::NoneActive => None,
        }
    }

    /// True when `variant_id` holds this slot
    pub fn is(&self, variant_id: &str) -> bool {
        self.variant_id() == Some(variant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariant {
    pub id: String,
    pub name: String,
    pub vehicle_type: VehicleType,
    /// Mirrors the store's active slot; never set directly
    pub status: TemplateStatus,
    pub categories: Vec<CategoryDefinition>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TemplateVariant {
    /// New inactive variant with a generated id
    pub fn new(name: impl Into<String>, vehicle_type: VehicleType, categories: Vec<CategoryDefinition>) -> Self {
        Self {
            id: format!("tpl-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            vehicle_type,
            status: TemplateStatus::Inactive,
            categories,
            updated_at: Utc::now(),
            description: None,
        }
    }

    /// Copy the checklist's categories into a new variant
    pub fn from_checklist(name: impl Into<String>, vehicle_type: VehicleType, checklist: &Checklist) -> Self {
        Self::new(name, vehicle_type, checklist.categories().to_vec())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == TemplateStatus::Active
    }

    pub fn category(&self, category_id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn field_count(&self) -> usize {
        self.categories.iter().map(|c| c.fields.len()).sum()
    }

    pub fn validate(&self) -> InspectResult<()> {
        if self.name.trim().is_empty() {
            return Err(InspectError::Validation(format!("template '{}' has a blank name", self.id)));
        }
        if self.categories.is_empty() {
            return Err(InspectError::Validation(format!("template '{}' has no categories", self.id)));
        }
        validate_categories(&self.categories)
    }

    /// Append a field to a category. A blank id gets a generated one.
    /// Returns the id the field was stored under.
    pub fn add_field(&mut self, category_id: &str, mut field: FieldDefinition) -> InspectResult<String> {
        if field.id.trim().is_empty() {
            field.id = format!("{}{}", NEW_FIELD_PREFIX, uuid::Uuid::new_v4());
        }
        field.validate()?;
        if self.contains_field(&field.id) {
            return Err(InspectError::Validation(format!(
                "field id '{}' already exists in template '{}'",
                field.id, self.id
            )));
        }

        let id = field.id.clone();
        self.category_mut(category_id)?.fields.push(field);
        Ok(id)
    }

    /// Replace a field in place, keeping its id and position
    pub fn edit_field(&mut self, category_id: &str, field_id: &str, mut field: FieldDefinition) -> InspectResult<()> {
        field.id = field_id.to_string();
        field.validate()?;

        let category = self.category_mut(category_id)?;
        let slot = category
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| InspectError::NotFound(format!("field '{}' in category '{}'", field_id, category_id)))?;
        *slot = field;
        Ok(())
    }

    pub fn remove_field(&mut self, category_id: &str, field_id: &str) -> InspectResult<FieldDefinition> {
        let category = self.category_mut(category_id)?;
        let index = category
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| InspectError::NotFound(format!("field '{}' in category '{}'", field_id, category_id)))?;
        Ok(category.fields.remove(index))
    }

    fn contains_field(&self, field_id: &str) -> bool {
        self.categories.iter().any(|c| c.field(field_id).is_some())
    }

    fn category_mut(&mut self, category_id: &str) -> InspectResult<&mut CategoryDefinition> {
        let template_id = &self.id;
        self.categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| InspectError::NotFound(format!("category '{}' in template '{}'", category_id, template_id)))
    }
}
