//! Configuration: catalog location, completion policy and limits
//!
//! Loaded from YAML, then overlaid with `INSPECT_*` environment variables.
//!
//! ```yaml
//! catalogPath: config/checklist.yaml
//! completion: required_fields
//! maxPhotosPerField: 9
//! auditLogCapacity: 10000
//! ```

use crate::error::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding [`InspectConfig::catalog_path`]
pub const ENV_CATALOG: &str = "INSPECT_CATALOG";
/// Environment variable overriding [`InspectConfig::completion`]
pub const ENV_COMPLETION: &str = "INSPECT_COMPLETION";

/// How a category counts as complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Complete once marked, whatever its fields hold
    Navigation,
    /// Complete once marked and every required field has a value
    #[default]
    RequiredFields,
}

impl FromStr for CompletionPolicy {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "navigation" => Ok(CompletionPolicy::Navigation),
            "required_fields" => Ok(CompletionPolicy::RequiredFields),
            other => Err(InspectError::Catalog(format!(
                "unknown completion policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectConfig {
    /// Catalog file to load instead of the embedded checklist
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub completion: CompletionPolicy,

    /// Photo references allowed on a photo field without its own limit
    #[serde(default = "default_max_photos")]
    pub max_photos_per_field: u32,

    /// Audit entries kept in memory before the oldest are dropped
    #[serde(default = "default_audit_capacity")]
    pub audit_log_capacity: usize,
}

fn default_max_photos() -> u32 {
    9
}

fn default_audit_capacity() -> usize {
    10_000
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            completion: CompletionPolicy::default(),
            max_photos_per_field: default_max_photos(),
            audit_log_capacity: default_audit_capacity(),
        }
    }
}

impl InspectConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &str) -> InspectResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InspectError::Catalog(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(yaml: &str) -> InspectResult<Self> {
        let config: InspectConfig = serde_yaml::from_str(yaml)
            .map_err(|e| InspectError::Catalog(format!("Failed to parse config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the environment
    pub fn from_env() -> InspectResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `INSPECT_CATALOG` / `INSPECT_COMPLETION` when set
    pub fn with_env_overrides(self) -> InspectResult<Self> {
        self.with_overrides(
            std::env::var(ENV_CATALOG).ok(),
            std::env::var(ENV_COMPLETION).ok(),
        )
    }

    fn with_overrides(mut self, catalog: Option<String>, completion: Option<String>) -> InspectResult<Self> {
        if let Some(path) = catalog.filter(|p| !p.trim().is_empty()) {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(policy) = completion {
            self.completion = policy.parse()?;
        }
        Ok(self)
    }

    fn validate(&self) -> InspectResult<()> {
        if self.max_photos_per_field == 0 {
            return Err(InspectError::Catalog("maxPhotosPerField must be at least 1".to_string()));
        }
        if self.audit_log_capacity == 0 {
            return Err(InspectError::Catalog("auditLogCapacity must be at least 1".to_string()));
        }
        Ok(())
    }
}
