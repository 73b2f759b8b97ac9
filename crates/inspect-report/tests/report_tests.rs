//! Integration tests for report derivation, audit review and archives.
//!
//! Reports are built from submissions filled against the embedded
//! checklist, then carried through review and into a vehicle archive.

use chrono::NaiveDate;
use inspect_checklist::default_checklist;
use inspect_core::{FieldValue, InspectError};
use inspect_report::{
    build_report, derive_grade, AuditAction, AuditLog, AuditReview, Auditor, ArchiveIndex, Defect, Grade,
    InspectionItemResult, ItemStatus, ReportNotes, ReportResult, Severity, VehicleArchive, WorkOrderStatus,
};
use inspect_submission::SubmissionBuilder;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn filled_report(score: i64) -> ReportResult {
    let checklist = default_checklist().unwrap();
    let mut builder = SubmissionBuilder::new("WO-20240318-001", checklist.categories().to_vec())
        .unwrap()
        .with_template("tpl-fuel-std");
    builder.set_value("doc_2", FieldValue::text("LHGCR1620H8000008")).unwrap();
    builder.set_value("info_5", FieldValue::Number(2.0)).unwrap();
    builder.set_value("eng_1", FieldValue::text("正常")).unwrap();

    build_report(
        builder.submission(),
        vec![
            Defect::new("d1", "外观", "右后翼子板钣金修复", Severity::Moderate)
                .at("右后翼子板")
                .with_photos(["oss://wo-1/d1.jpg"]),
            Defect::new("d2", "内饰", "主驾座椅轻微磨损", Severity::Minor),
        ],
        vec![
            InspectionItemResult::new("发动机舱", "水箱框架", ItemStatus::Pass),
            InspectionItemResult::new("外观", "右后翼子板", ItemStatus::Warning).with_comment("有补漆痕迹"),
            InspectionItemResult::new("底盘", "减震器", ItemStatus::NotChecked),
        ],
        score,
        ReportNotes::new(["无重大事故", "有钣金"], "整体车况良好"),
    )
    .unwrap()
}

// =============================================================================
// Grading and derivation
// =============================================================================

#[test]
fn test_grade_bands() {
    for (score, grade) in [(90, Grade::A), (89, Grade::B), (70, Grade::C), (69, Grade::D), (100, Grade::A)] {
        assert_eq!(derive_grade(score).unwrap(), grade, "score {}", score);
    }
    assert!(matches!(derive_grade(-1), Err(InspectError::Range { .. })));
    assert!(matches!(derive_grade(101), Err(InspectError::Range { .. })));
}

#[test]
fn test_build_is_deterministic() {
    let a = filled_report(86);
    let b = filled_report(86);
    assert_eq!(a, b);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn test_report_carries_submission() {
    let report = filled_report(86);
    assert_eq!(report.grade, Grade::B);
    assert_eq!(report.template_id.as_deref(), Some("tpl-fuel-std"));
    assert_eq!(report.answers.get("info_5"), Some(&FieldValue::Number(2.0)));
    assert_eq!(report.answers.len(), 3);
    assert!(!report.is_linked());
}

#[test]
fn test_summary_counts() {
    let summary = filled_report(86).summary_counts();
    assert_eq!(summary.items, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.not_checked, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.defects, 2);
    assert_eq!(summary.moderate, 1);
    assert_eq!(summary.minor, 1);
    assert_eq!(summary.severe, 0);
}

#[test]
fn test_serialized_shape() {
    let json = serde_json::to_value(filled_report(86)).unwrap();
    assert_eq!(json["workOrderId"], "WO-20240318-001");
    assert_eq!(json["grade"], "B");
    assert_eq!(json["defects"][0]["severity"], "moderate");
    assert_eq!(json["inspectionItems"][2]["status"], "not_checked");
    assert_eq!(json["inspectionItems"][1]["inspectorComment"], "有补漆痕迹");
}

// =============================================================================
// Audit review
// =============================================================================

#[test]
fn test_annotate_then_approve() {
    init_tracing();
    let mut review = AuditReview::open(filled_report(86), WorkOrderStatus::UnderReview).unwrap();
    review.annotate(1, "确认为钣金修复").unwrap();
    assert!(matches!(review.annotate(3, "越界"), Err(InspectError::Range { .. })));

    let auditor = Auditor::new("aud-01", "李审核");
    let record = review.approve(&auditor).unwrap().clone();
    assert_eq!(record.action, AuditAction::Approve);
    assert_eq!(record.auditor_name, "李审核");
    assert_eq!(review.status(), WorkOrderStatus::Completed);
    assert_eq!(record.report_fingerprint, review.report().fingerprint().unwrap());

    // frozen once decided
    assert!(matches!(review.annotate(0, "补充"), Err(InspectError::Conflict(_))));
    assert!(matches!(review.reject(&auditor, "重拍"), Err(InspectError::Conflict(_))));

    let (report, _) = review.into_approved().unwrap();
    assert_eq!(
        report.inspection_items[1].auditor_comment.as_deref(),
        Some("确认为钣金修复")
    );
}

#[test]
fn test_reject_needs_reason() {
    let auditor = Auditor::new("aud-01", "李审核");
    let mut review = AuditReview::open(filled_report(72), WorkOrderStatus::UnderReview).unwrap();

    assert!(matches!(review.reject(&auditor, "   "), Err(InspectError::Validation(_))));
    assert_eq!(review.status(), WorkOrderStatus::UnderReview);

    let record = review.reject(&auditor, " 发动机舱照片缺失 ").unwrap();
    assert_eq!(record.reason.as_deref(), Some("发动机舱照片缺失"));
    assert_eq!(review.status(), WorkOrderStatus::Rejected);
    assert!(matches!(review.into_approved(), Err(InspectError::Conflict(_))));
}

#[test]
fn test_review_requires_under_review() {
    for status in [WorkOrderStatus::InProgress, WorkOrderStatus::Completed] {
        assert!(matches!(
            AuditReview::open(filled_report(80), status),
            Err(InspectError::Conflict(_))
        ));
    }
}

#[test]
fn test_audit_log_collects_decisions() {
    let auditor = Auditor::new("aud-02", "王审核");
    let mut log = AuditLog::with_max_records(10);
    let mut review = AuditReview::open(filled_report(95), WorkOrderStatus::UnderReview).unwrap();
    log.log(review.approve(&auditor).unwrap().clone());

    assert_eq!(log.by_auditor("aud-02").len(), 1);
    assert_eq!(log.for_work_order("WO-20240318-001").len(), 1);
    assert_eq!(log.stats().approval_rate, 1.0);
}

// =============================================================================
// Archives
// =============================================================================

#[test]
fn test_link_report_to_archive() {
    let mut index = ArchiveIndex::new();
    let archive = VehicleArchive::new("LHGCR1620H8000008", "本田", "雅阁", 2017)
        .unwrap()
        .with_plate("沪A12345")
        .with_mileage(56000);
    let archive_id = archive.id.clone();
    index.insert(archive).unwrap();

    let mut report = filled_report(86);
    let day = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
    index.link_report(&archive_id, &mut report, day).unwrap();
    // linking twice is idempotent
    index.link_report(&archive_id, &mut report, day).unwrap();

    let stored = index.get(&archive_id).unwrap();
    assert_eq!(stored.report_ids, vec![report.id.clone()]);
    assert_eq!(stored.last_inspection_date, Some(day));
    assert_eq!(report.archive_id.as_deref(), Some(archive_id.as_str()));
    assert_eq!(index.archive_of(&report.id).unwrap().id, archive_id);

    assert!(index.unlink_report(&mut report).unwrap());
    assert!(!index.unlink_report(&mut report).unwrap());
    assert!(index.get(&archive_id).unwrap().report_ids.is_empty());
    assert!(index.archive_of(&report.id).is_none());
}

#[test]
fn test_report_linked_elsewhere_conflicts() {
    let mut index = ArchiveIndex::new();
    let first = VehicleArchive::new("LHGCR1620H8000008", "本田", "雅阁", 2017).unwrap();
    let second = VehicleArchive::new("LSVAU2180N2000001", "大众", "帕萨特", 2022).unwrap();
    let (first_id, second_id) = (first.id.clone(), second.id.clone());
    index.insert(first).unwrap();
    index.insert(second).unwrap();

    let mut report = filled_report(86);
    let day = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
    index.link_report(&first_id, &mut report, day).unwrap();
    assert!(matches!(
        index.link_report(&second_id, &mut report, day),
        Err(InspectError::Conflict(_))
    ));
    assert!(matches!(
        index.link_report("arc-missing", &mut filled_report(70), day),
        Err(InspectError::NotFound(_))
    ));
}
