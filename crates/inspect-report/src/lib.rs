//! Inspect Report: grading, report derivation, audit and archives
//!
//! # Example
//!
//! ```
//! use inspect_report::{build_report, derive_grade, Grade, ReportNotes};
//! use inspect_submission::Submission;
//!
//! assert_eq!(derive_grade(89).unwrap(), Grade::B);
//!
//! let submission = Submission::new("WO-20240318-001");
//! let a = build_report(&submission, vec![], vec![], 91, ReportNotes::default()).unwrap();
//! let b = build_report(&submission, vec![], vec![], 91, ReportNotes::default()).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.grade, Grade::A);
//! ```

pub mod archive;
pub mod audit;
pub mod grade;
pub mod report;

pub use archive::{normalize_vin, ArchiveIndex, ArchiveStatus, VehicleArchive};
pub use audit::{AuditAction, AuditLog, AuditRecord, AuditReview, AuditStats, Auditor, WorkOrderStatus};
pub use grade::{derive_grade, Grade};
pub use report::{
    build_report, link_to_archive, unlink, Defect, InspectionItemResult, ItemStatus, ReportNotes, ReportResult,
    ReportSummary, Severity,
};
