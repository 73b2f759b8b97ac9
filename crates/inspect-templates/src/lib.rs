//! Inspect Templates: per vehicle type checklist variants
//!
//! A template variant is an editable copy of the checklist scoped to fuel or
//! electric vehicles. At most one variant per vehicle type is active; the
//! active one decides which categories an inspection uses.
//!
//! # Example
//!
//! ```
//! use inspect_templates::{MemoryVariantStore, TemplateManager};
//! use inspect_core::{CategoryDefinition, VehicleType};
//!
//! let categories = vec![CategoryDefinition::new("document", "证件手续")];
//! let manager = TemplateManager::new(MemoryVariantStore::new());
//! let t1 = manager.create("燃油车标准模板", VehicleType::Fuel, categories.clone()).unwrap();
//! let t2 = manager.create("燃油车精简模板", VehicleType::Fuel, categories).unwrap();
//!
//! manager.activate(&t1.id).unwrap();
//! manager.activate(&t2.id).unwrap();
//!
//! assert!(!manager.get(&t1.id).unwrap().is_active());
//! assert!(manager.get(&t2.id).unwrap().is_active());
//! ```

pub mod manager;
pub mod store;
pub mod variant;

pub use manager::TemplateManager;
pub use store::{MemoryVariantStore, VariantStore};
pub use variant::{ActiveSlot, TemplateStatus, TemplateVariant};
