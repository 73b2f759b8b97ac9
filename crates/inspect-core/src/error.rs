//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InspectError {
    #[error("VALIDATION/{0}")]
    Validation(String),

    #[error("TYPE/{field_id}: {reason}")]
    TypeMismatch { field_id: String, reason: String },

    #[error("CONFLICT/{0}")]
    Conflict(String),

    #[error("RANGE/{value} outside [{min}, {max}]")]
    Range { value: i64, min: i64, max: i64 },

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    #[error("CATALOG/{0}")]
    Catalog(String),

    #[error("STORAGE/{0}")]
    Storage(String),
}

impl InspectError {
    pub fn type_mismatch(field_id: impl Into<String>, reason: impl Into<String>) -> Self {
        InspectError::TypeMismatch {
            field_id: field_id.into(),
            reason: reason.into(),
        }
    }

    /// Range error for a value that must sit inside `[min, max]`
    pub fn out_of_range(value: i64, min: i64, max: i64) -> Self {
        InspectError::Range { value, min, max }
    }

    /// Short machine-readable kind, e.g. for audit entries
    pub fn kind(&self) -> &'static str {
        match self {
            InspectError::Validation(_) => "validation",
            InspectError::TypeMismatch { .. } => "type_mismatch",
            InspectError::Conflict(_) => "conflict",
            InspectError::Range { .. } => "range",
            InspectError::NotFound(_) => "not_found",
            InspectError::Catalog(_) => "catalog",
            InspectError::Storage(_) => "storage",
        }
    }
}

pub type InspectResult<T> = Result<T, InspectError>;
