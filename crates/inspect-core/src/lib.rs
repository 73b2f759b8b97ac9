//! Inspect Core: data model, errors and configuration
//!
//! Shared vocabulary for the inspection checklist crates. Categories and
//! fields are described here together with the single rule that decides
//! whether a captured value fits a field.

pub mod config;
pub mod context;
pub mod data_model;
pub mod error;

pub use config::{CompletionPolicy, InspectConfig};
pub use context::SessionContext;
pub use data_model::{
    validate_categories, CategoryDefinition, FieldDefinition, FieldKind, FieldValue, VehicleType,
};
pub use error::{InspectError, InspectResult};

/// Version of the inspection core
pub const INSPECT_VERSION: &str = "1.0.0";
