//! Integration tests for building submissions.
//!
//! Covers value checks, missing field reporting, both completion policies
//! and saving a session through the store, against hand-built categories
//! and the embedded checklist.

use inspect_checklist::default_checklist;
use inspect_core::{
    CategoryDefinition, CompletionPolicy, FieldDefinition, FieldKind, FieldValue, InspectError, SessionContext,
    VehicleType,
};
use inspect_submission::{MemorySubmissionStore, SessionSnapshot, Submission, SubmissionBuilder, SubmissionStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn document_only() -> Vec<CategoryDefinition> {
    vec![CategoryDefinition::new("document", "证件手续")
        .with_field(FieldDefinition::new("doc_2", "VIN码", FieldKind::Text).required())]
}

fn two_categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::new("vehicleInfo", "车型信息")
            .with_field(
                FieldDefinition::new("info_6", "排放标准", FieldKind::Select {
                    options: vec!["国五".to_string(), "国六".to_string()],
                })
                .required(),
            )
            .with_field(FieldDefinition::new("info_7", "备注", FieldKind::Text)),
        CategoryDefinition::new("mechanical", "机械部件")
            .with_field(
                FieldDefinition::new("mech_area", "检查区域", FieldKind::Checkbox {
                    options: vec!["左前区域".to_string(), "左后区域".to_string()],
                })
                .required(),
            )
            .with_field(FieldDefinition::new("mech_date", "检查日期", FieldKind::Date).required()),
    ]
}

// =============================================================================
// Missing required fields
// =============================================================================

#[test]
fn test_vin_scenario() {
    init_tracing();
    let mut builder = SubmissionBuilder::new("WO-1", document_only()).unwrap();
    assert_eq!(builder.validate_for_submission(), vec!["doc_2".to_string()]);

    builder.set_value("doc_2", FieldValue::text("LHGCR1620H8000008")).unwrap();
    assert!(builder.validate_for_submission().is_empty());
    assert!(builder.is_ready());
}

#[test]
fn test_missing_fields_in_checklist_order() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();
    assert_eq!(
        builder.validate_for_submission(),
        vec!["info_6".to_string(), "mech_area".to_string(), "mech_date".to_string()]
    );

    builder.set_value("mech_date", FieldValue::text("2024-03-18")).unwrap();
    assert_eq!(
        builder.missing_in_category("mechanical").unwrap(),
        vec!["mech_area".to_string()]
    );
    assert!(matches!(
        builder.missing_in_category("trunk"),
        Err(InspectError::NotFound(_))
    ));
}

// =============================================================================
// Value checks
// =============================================================================

#[test]
fn test_select_membership() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();

    let err = builder.set_value("info_6", FieldValue::text("国三")).unwrap_err();
    assert!(matches!(err, InspectError::TypeMismatch { ref field_id, .. } if field_id == "info_6"));
    assert!(builder.value("info_6").is_none());

    builder.set_value("info_6", FieldValue::text("国六")).unwrap();
    assert_eq!(builder.value("info_6"), Some(&FieldValue::text("国六")));
}

#[test]
fn test_wrong_shape_rejected() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();
    assert!(builder.set_value("info_6", FieldValue::Number(5.0)).is_err());
    assert!(builder.set_value("mech_date", FieldValue::text("18/03/2024")).is_err());
    assert!(builder
        .set_value("mech_area", FieldValue::options(["左前区域", "左前区域"]))
        .is_err());
}

#[test]
fn test_blank_values_are_checked_not_cleared() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();

    let err = builder.set_value("info_6", FieldValue::text("")).unwrap_err();
    assert!(matches!(err, InspectError::TypeMismatch { ref field_id, .. } if field_id == "info_6"));
    assert!(builder.set_value("mech_date", FieldValue::text(" ")).is_err());

    builder.set_value("info_7", FieldValue::text("   ")).unwrap();
    assert_eq!(builder.value("info_7"), Some(&FieldValue::text("   ")));
}

#[test]
fn test_blank_required_value_still_missing() {
    let mut builder = SubmissionBuilder::new("WO-1", document_only()).unwrap();
    builder.set_value("doc_2", FieldValue::text("  ")).unwrap();
    assert_eq!(builder.validate_for_submission(), vec!["doc_2".to_string()]);
}

#[test]
fn test_raw_checkbox_input() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();
    builder.set_raw("mech_area", "左前区域，左后区域").unwrap();
    assert_eq!(
        builder.value("mech_area"),
        Some(&FieldValue::options(["左前区域", "左后区域"]))
    );
}

// =============================================================================
// Completion and navigation
// =============================================================================

#[test]
fn test_required_fields_policy() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();
    builder.mark_category_complete("vehicleInfo").unwrap();
    assert!(!builder.is_category_complete("vehicleInfo"));
    assert_eq!(builder.progress(), 0.0);

    builder.set_value("info_6", FieldValue::text("国五")).unwrap();
    assert!(builder.is_category_complete("vehicleInfo"));
    assert_eq!(builder.progress(), 0.5);
}

#[test]
fn test_navigation_policy() {
    let ctx = SessionContext::new("WO-1", VehicleType::Fuel).with_completion(CompletionPolicy::Navigation);
    let mut builder = SubmissionBuilder::for_session(&ctx, two_categories()).unwrap();

    assert_eq!(builder.current_category().id, "vehicleInfo");
    assert!(builder.advance());
    assert!(builder.is_category_complete("vehicleInfo"));
    assert_eq!(builder.current_category().id, "mechanical");

    assert!(matches!(builder.jump_to(2), Err(InspectError::Range { .. })));
    assert!(builder.prev());
    assert!(!builder.prev());
}

#[test]
fn test_mark_unknown_category() {
    let mut builder = SubmissionBuilder::new("WO-1", two_categories()).unwrap();
    assert!(matches!(
        builder.mark_category_complete("trunk"),
        Err(InspectError::NotFound(_))
    ));
}

#[test]
fn test_empty_category_list_rejected() {
    assert!(SubmissionBuilder::new("WO-1", vec![]).is_err());
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_snapshot_resume_through_store() {
    let store = MemorySubmissionStore::new();
    let mut builder = SubmissionBuilder::new("WO-7", two_categories()).unwrap().with_template("tpl-1");
    builder.set_value("info_6", FieldValue::text("国六")).unwrap();
    builder.advance();

    let snapshot = builder.snapshot();
    store.save_submission(&snapshot.submission).unwrap();

    let loaded = store.load_submission("WO-7").unwrap().unwrap();
    assert_eq!(loaded.template_id.as_deref(), Some("tpl-1"));

    let resumed = SubmissionBuilder::resume(
        SessionSnapshot {
            submission: loaded,
            cursor: snapshot.cursor,
        },
        two_categories(),
    )
    .unwrap();
    assert_eq!(resumed.current_category().id, "mechanical");
    assert_eq!(resumed.value("info_6"), Some(&FieldValue::text("国六")));
    assert!(store.load_submission("WO-8").unwrap().is_none());
}

#[test]
fn test_resume_drops_stale_values() {
    init_tracing();
    let mut builder = SubmissionBuilder::new("WO-7", two_categories()).unwrap();
    builder.set_value("info_6", FieldValue::text("国五")).unwrap();
    builder.set_value("info_7", FieldValue::text("右前轮胎磨损")).unwrap();
    let snapshot = builder.snapshot();

    // Template edited since: info_7 removed and 国五 dropped from the options
    let edited = vec![CategoryDefinition::new("vehicleInfo", "车型信息").with_field(
        FieldDefinition::new("info_6", "排放标准", FieldKind::Select {
            options: vec!["国六".to_string()],
        })
        .required(),
    )];
    let resumed = SubmissionBuilder::resume(snapshot, edited).unwrap();
    assert!(resumed.submission().values.is_empty());
}

#[test]
fn test_resume_with_empty_answers_reports_them_missing() {
    let mut submission = Submission::new("WO-7");
    submission
        .values
        .insert("mech_area".to_string(), FieldValue::Options(vec![]));
    submission
        .values
        .insert("mech_date".to_string(), FieldValue::text(""));
    submission.values.insert("info_6".to_string(), FieldValue::text("国六"));
    submission.completed_categories.insert("mechanical".to_string());

    let resumed = SubmissionBuilder::resume(SessionSnapshot { submission, cursor: 1 }, two_categories()).unwrap();
    assert_eq!(
        resumed.validate_for_submission(),
        vec!["mech_area".to_string(), "mech_date".to_string()]
    );
    assert!(!resumed.is_category_complete("mechanical"));
}

#[test]
fn test_resume_cursor_out_of_range() {
    let builder = SubmissionBuilder::new("WO-7", two_categories()).unwrap();
    let mut snapshot = builder.snapshot();
    snapshot.cursor = 5;
    assert!(matches!(
        SubmissionBuilder::resume(snapshot, two_categories()),
        Err(InspectError::Range { .. })
    ));
}

// =============================================================================
// Embedded checklist
// =============================================================================

#[test]
fn test_full_checklist_submission() {
    let checklist = default_checklist().unwrap();
    let mut builder = SubmissionBuilder::new("WO-9", checklist.categories().to_vec()).unwrap();

    assert_eq!(builder.validate_for_submission().len(), checklist.required_field_count());
    assert_eq!(builder.categories().len(), 18);

    builder.set_value("doc_2", FieldValue::text("LHGCR1620H8000008")).unwrap();
    builder
        .set_value("mech_area", FieldValue::options(["左前区域", "右前区域"]))
        .unwrap();
    assert_eq!(
        builder.validate_for_submission().len(),
        checklist.required_field_count() - 2
    );

    builder.jump_to(17).unwrap();
    assert_eq!(builder.current_category().id, "video");
    assert!(!builder.advance());
}
