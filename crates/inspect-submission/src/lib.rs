//! Inspect Submission: filling a checklist for one work order
//!
//! The [`SubmissionBuilder`] owns the categories an inspection runs against,
//! the answers captured so far and a cursor over the categories. Values are
//! checked against their field kind on every write; missing required fields
//! are reported, never enforced.
//!
//! # Example
//!
//! ```
//! use inspect_core::{CategoryDefinition, FieldDefinition, FieldKind, FieldValue};
//! use inspect_submission::SubmissionBuilder;
//!
//! let categories = vec![CategoryDefinition::new("document", "证件手续")
//!     .with_field(FieldDefinition::new("doc_2", "VIN码", FieldKind::Text).required())];
//!
//! let mut builder = SubmissionBuilder::new("WO-20240101-001", categories).unwrap();
//! assert_eq!(builder.validate_for_submission(), vec!["doc_2".to_string()]);
//!
//! builder.set_value("doc_2", FieldValue::text("LHGCR1620H8000008")).unwrap();
//! assert!(builder.is_ready());
//! ```

pub mod cursor;
pub mod store;
pub mod submission;

pub use cursor::CategoryCursor;
pub use store::{MemorySubmissionStore, SubmissionStore};
pub use submission::{SessionSnapshot, Submission, SubmissionBuilder};
