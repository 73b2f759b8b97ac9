//! Inspect Checklist: the canonical catalog of inspection categories
//!
//! The default catalog is embedded at build time from
//! `catalog/checklist.yaml` and parsed once. Deployments can point
//! [`InspectConfig::catalog_path`] at their own file instead.
//!
//! # Example
//!
//! ```
//! use inspect_checklist::default_checklist;
//!
//! let checklist = default_checklist().unwrap();
//! let (category, field) = checklist.field("doc_2").unwrap();
//! assert_eq!(category.name, "证件手续");
//! assert_eq!(field.name, "VIN码");
//! ```

pub mod catalog;

use catalog::CatalogFile;
use inspect_core::{CategoryDefinition, FieldDefinition, InspectConfig, InspectError, InspectResult};
use once_cell::sync::Lazy;
use serde::Serialize;

static EMBEDDED_CATALOG: &str = include_str!("../catalog/checklist.yaml");

static DEFAULT_CHECKLIST: Lazy<InspectResult<Checklist>> =
    Lazy::new(|| Checklist::from_yaml(EMBEDDED_CATALOG));

/// Validated, ordered checklist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checklist {
    version: String,
    categories: Vec<CategoryDefinition>,
}

impl Checklist {
    /// Build a checklist from categories, enforcing id uniqueness and option rules
    pub fn new(version: impl Into<String>, categories: Vec<CategoryDefinition>) -> InspectResult<Self> {
        inspect_core::validate_categories(&categories)?;
        Ok(Self {
            version: version.into(),
            categories,
        })
    }

    /// Parse and validate a catalog from YAML content
    pub fn from_yaml(yaml: &str) -> InspectResult<Self> {
        let (version, categories) = CatalogFile::from_yaml(yaml)?.compile()?;
        let checklist = Self { version, categories };
        tracing::debug!(
            version = %checklist.version,
            categories = checklist.categories.len(),
            fields = checklist.total_field_count(),
            "checklist loaded"
        );
        Ok(checklist)
    }

    /// Load and validate a catalog file
    pub fn load(path: &str) -> InspectResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InspectError::Catalog(format!("Failed to read checklist file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// The configured catalog, or the embedded one when none is configured
    pub fn from_config(config: &InspectConfig) -> InspectResult<Self> {
        match &config.catalog_path {
            Some(path) => Self::load(&path.to_string_lossy()),
            None => default_checklist().cloned(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn category(&self, category_id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Find a field anywhere in the checklist, with its category
    pub fn field(&self, field_id: &str) -> Option<(&CategoryDefinition, &FieldDefinition)> {
        self.categories
            .iter()
            .find_map(|c| c.field(field_id).map(|f| (c, f)))
    }

    /// Sum of field counts across all categories
    pub fn total_field_count(&self) -> usize {
        self.categories.iter().map(|c| c.fields.len()).sum()
    }

    pub fn required_field_count(&self) -> usize {
        self.categories.iter().map(|c| c.required_fields().count()).sum()
    }

    pub fn into_categories(self) -> Vec<CategoryDefinition> {
        self.categories
    }
}

/// The embedded checklist, parsed on first use
pub fn default_checklist() -> InspectResult<&'static Checklist> {
    (*DEFAULT_CHECKLIST).as_ref().map_err(Clone::clone)
}
