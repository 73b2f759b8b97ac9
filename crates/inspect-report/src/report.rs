//! Report derivation
//!
//! [`build_report`] turns a finished submission plus the inspector's defect
//! and item annotations into a [`ReportResult`]. It reads no clock and draws
//! no random ids, so the same inputs always give the same report and the
//! same [`ReportResult::fingerprint`].

use crate::grade::{derive_grade, Grade};
use inspect_core::{FieldValue, InspectError, InspectResult};
use inspect_submission::Submission;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const REPORT_ID_PREFIX: &str = "RPT-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

/// An anomaly found during inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub id: String,
    pub category: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Defect {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            description: description.into(),
            severity,
            location: None,
            photos: Vec::new(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_photos<I, S>(mut self, photos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.photos = photos.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pass,
    Fail,
    Warning,
    NotChecked,
}

/// Outcome of one inspected item, annotated by inspector and auditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItemResult {
    pub category: String,
    pub name: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditor_comment: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl InspectionItemResult {
    pub fn new(category: impl Into<String>, name: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            status,
            inspector_comment: None,
            auditor_comment: None,
            photos: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.inspector_comment = Some(comment.into());
        self
    }
}

/// Operator-authored text carried onto the report as given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportNotes {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl ReportNotes {
    pub fn new<I, S>(tags: I, summary: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub id: String,
    pub work_order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub score: u8,
    pub grade: Grade,
    pub tags: Vec<String>,
    pub summary: String,
    pub defects: Vec<Defect>,
    pub inspection_items: Vec<InspectionItemResult>,
    pub answers: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_id: Option<String>,
}

/// Build a report. Fails with a range error for a score outside `[0, 100]`
/// and a validation error for a blank defect description or item name.
pub fn build_report(
    submission: &Submission,
    defects: Vec<Defect>,
    inspection_items: Vec<InspectionItemResult>,
    score: i64,
    notes: ReportNotes,
) -> InspectResult<ReportResult> {
    let grade = derive_grade(score)?;

    if let Some(defect) = defects.iter().find(|d| d.description.trim().is_empty()) {
        return Err(InspectError::Validation(format!("defect '{}' has no description", defect.id)));
    }
    if inspection_items.iter().any(|i| i.name.trim().is_empty()) {
        return Err(InspectError::Validation("inspection item without a name".to_string()));
    }

    Ok(ReportResult {
        id: format!("{}{}", REPORT_ID_PREFIX, submission.work_order_id),
        work_order_id: submission.work_order_id.clone(),
        template_id: submission.template_id.clone(),
        // derive_grade bounded it to 0..=100
        score: score as u8,
        grade,
        tags: notes.tags,
        summary: notes.summary,
        defects,
        inspection_items,
        answers: submission.values.clone(),
        archive_id: None,
    })
}

impl ReportResult {
    /// Content hash over the serialized report, `blake3:<hex>`
    pub fn fingerprint(&self) -> InspectResult<String> {
        let bytes = serde_json::to_vec(self).map_err(|e| InspectError::Storage(e.to_string()))?;
        Ok(format!("blake3:{}", blake3::hash(&bytes)))
    }

    pub fn summary_counts(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            items: self.inspection_items.len(),
            defects: self.defects.len(),
            ..ReportSummary::default()
        };
        for item in &self.inspection_items {
            match item.status {
                ItemStatus::Pass => summary.passed += 1,
                ItemStatus::Fail => summary.failed += 1,
                ItemStatus::Warning => summary.warnings += 1,
                ItemStatus::NotChecked => summary.not_checked += 1,
            }
        }
        for defect in &self.defects {
            match defect.severity {
                Severity::Minor => summary.minor += 1,
                Severity::Moderate => summary.moderate += 1,
                Severity::Severe => summary.severe += 1,
            }
        }
        summary
    }

    pub fn is_linked(&self) -> bool {
        self.archive_id.is_some()
    }
}

/// Associate a report with a vehicle archive. Relinking replaces the
/// previous association.
pub fn link_to_archive(report: &mut ReportResult, archive_id: impl Into<String>) -> InspectResult<()> {
    let archive_id = archive_id.into();
    if archive_id.trim().is_empty() {
        return Err(InspectError::Validation("archive id is blank".to_string()));
    }
    report.archive_id = Some(archive_id);
    Ok(())
}

/// Drop the archive association, returning the archive id it had
pub fn unlink(report: &mut ReportResult) -> Option<String> {
    report.archive_id.take()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub items: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub not_checked: usize,
    pub defects: usize,
    pub minor: usize,
    pub moderate: usize,
    pub severe: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        let mut submission = Submission::new("WO-20240318-001");
        submission
            .values
            .insert("doc_2".to_string(), FieldValue::text("LHGCR1620H8000008"));
        submission
    }

    #[test]
    fn test_score_out_of_range() {
        let err = build_report(&submission(), vec![], vec![], 101, ReportNotes::default()).unwrap_err();
        assert!(matches!(err, InspectError::Range { value: 101, .. }));
    }

    #[test]
    fn test_blank_defect_rejected() {
        let defects = vec![Defect::new("d1", "外观", "  ", Severity::Minor)];
        let err = build_report(&submission(), defects, vec![], 85, ReportNotes::default()).unwrap_err();
        assert!(matches!(err, InspectError::Validation(_)));
    }

    #[test]
    fn test_report_fields() {
        let report = build_report(
            &submission(),
            vec![],
            vec![],
            92,
            ReportNotes::new(["准新车", "无事故"], "车况优秀"),
        )
        .unwrap();
        assert_eq!(report.id, "RPT-WO-20240318-001");
        assert_eq!(report.grade, Grade::A);
        assert_eq!(report.score, 92);
        assert_eq!(report.tags, vec!["准新车".to_string(), "无事故".to_string()]);
        assert_eq!(report.answers.len(), 1);
    }

    #[test]
    fn test_link_and_unlink() {
        let mut report = build_report(&submission(), vec![], vec![], 75, ReportNotes::default()).unwrap();
        assert!(link_to_archive(&mut report, " ").is_err());
        link_to_archive(&mut report, "arc-1").unwrap();
        assert!(report.is_linked());
        assert_eq!(unlink(&mut report), Some("arc-1".to_string()));
        assert_eq!(unlink(&mut report), None);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut report = build_report(&submission(), vec![], vec![], 75, ReportNotes::default()).unwrap();
        let before = report.fingerprint().unwrap();
        assert!(before.starts_with("blake3:"));
        report.summary = "右后翼子板有钣金修复".to_string();
        assert_ne!(report.fingerprint().unwrap(), before);
    }
}
