//! Inspection submission and its builder
//!
//! A [`Submission`] is plain data: captured values keyed by field id plus
//! the set of categories marked complete. The [`SubmissionBuilder`] binds a
//! submission to the categories it is filled against and enforces value
//! types on every write.

use crate::cursor::CategoryCursor;
use inspect_core::{
    validate_categories, CategoryDefinition, CompletionPolicy, FieldDefinition, FieldKind, FieldValue,
    InspectConfig, InspectError, InspectResult, SessionContext,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Captured answers for one work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub work_order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub completed_categories: BTreeSet<String>,
}

impl Submission {
    pub fn new(work_order_id: impl Into<String>) -> Self {
        Self {
            work_order_id: work_order_id.into(),
            template_id: None,
            values: BTreeMap::new(),
            completed_categories: BTreeSet::new(),
        }
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    /// Every photo reference captured, in field id order
    pub fn photo_refs(&self) -> Vec<&str> {
        self.values
            .values()
            .filter_map(|v| match v {
                FieldValue::Photos(refs) => Some(refs),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// Serializable session state: the submission plus where the inspector is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub submission: Submission,
    pub cursor: usize,
}

pub struct SubmissionBuilder {
    categories: Vec<CategoryDefinition>,
    /// field id -> (category index, field index)
    index: HashMap<String, (usize, usize)>,
    submission: Submission,
    cursor: CategoryCursor,
    completion: CompletionPolicy,
    max_photos: u32,
    trace_id: Option<String>,
}

impl SubmissionBuilder {
    /// Start an empty submission over `categories`
    pub fn new(work_order_id: impl Into<String>, categories: Vec<CategoryDefinition>) -> InspectResult<Self> {
        Self::build(Submission::new(work_order_id), categories, 0)
    }

    /// Start an empty submission for a session, taking its completion policy
    pub fn for_session(ctx: &SessionContext, categories: Vec<CategoryDefinition>) -> InspectResult<Self> {
        let mut builder = Self::new(ctx.work_order_id.clone(), categories)?;
        builder.completion = ctx.completion;
        builder.trace_id = Some(ctx.trace_id.clone());
        Ok(builder)
    }

    /// Continue a saved session. Values whose field no longer exists, or no
    /// longer fits its field, are dropped.
    pub fn resume(snapshot: SessionSnapshot, categories: Vec<CategoryDefinition>) -> InspectResult<Self> {
        let mut builder = Self::build(snapshot.submission, categories, snapshot.cursor)?;

        let stale: Vec<String> = builder
            .submission
            .values
            .iter()
            .filter(|(id, value)| match builder.field(id) {
                Some(field) => field.check_value(value).is_err(),
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            tracing::warn!(work_order_id = %builder.submission.work_order_id, field_id = %id, "dropping stale value");
            builder.submission.values.remove(id);
        }

        let categories = &builder.categories;
        builder
            .submission
            .completed_categories
            .retain(|id| categories.iter().any(|c| &c.id == id));

        Ok(builder)
    }

    fn build(submission: Submission, categories: Vec<CategoryDefinition>, cursor: usize) -> InspectResult<Self> {
        validate_categories(&categories)?;
        let cursor = CategoryCursor::at(cursor, categories.len())?;

        let mut index = HashMap::new();
        for (ci, category) in categories.iter().enumerate() {
            for (fi, field) in category.fields.iter().enumerate() {
                index.insert(field.id.clone(), (ci, fi));
            }
        }

        let defaults = InspectConfig::default();
        Ok(Self {
            categories,
            index,
            submission,
            cursor,
            completion: defaults.completion,
            max_photos: defaults.max_photos_per_field,
            trace_id: None,
        })
    }

    /// Take completion policy and photo limit from configuration
    pub fn with_config(mut self, config: &InspectConfig) -> Self {
        self.completion = config.completion;
        self.max_photos = config.max_photos_per_field;
        self
    }

    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.submission.template_id = Some(template_id.into());
        self
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.index
            .get(field_id)
            .map(|&(ci, fi)| &self.categories[ci].fields[fi])
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn into_submission(self) -> Submission {
        self.submission
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            submission: self.submission.clone(),
            cursor: self.cursor.index(),
        }
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Record a value after checking it against the field's kind. Accepted
    /// values are stored as given; use [`Self::clear_value`] to remove one.
    pub fn set_value(&mut self, field_id: &str, value: FieldValue) -> InspectResult<()> {
        let field = self
            .field(field_id)
            .ok_or_else(|| InspectError::NotFound(format!("field '{}'", field_id)))?;
        let checked = field.check_value(&value).and_then(|_| self.check_photo_limit(field, &value));
        if let Err(err) = checked {
            tracing::debug!(
                trace_id = self.trace_id.as_deref().unwrap_or("-"),
                field_id,
                error = %err,
                "value rejected"
            );
            return Err(err);
        }

        self.submission.values.insert(field_id.to_string(), value);
        Ok(())
    }

    /// Parse raw form input for the field, then [`Self::set_value`]
    pub fn set_raw(&mut self, field_id: &str, raw: &str) -> InspectResult<()> {
        let field = self
            .field(field_id)
            .ok_or_else(|| InspectError::NotFound(format!("field '{}'", field_id)))?;
        let value = FieldValue::parse_for(field, raw)?;
        self.set_value(field_id, value)
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.submission.value(field_id)
    }

    pub fn clear_value(&mut self, field_id: &str) -> Option<FieldValue> {
        self.submission.values.remove(field_id)
    }

    fn check_photo_limit(&self, field: &FieldDefinition, value: &FieldValue) -> InspectResult<()> {
        match (&field.kind, value) {
            (FieldKind::Photo { count: None }, FieldValue::Photos(refs)) if refs.len() > self.max_photos as usize => {
                Err(InspectError::type_mismatch(
                    &field.id,
                    format!("{} photos exceed the limit of {}", refs.len(), self.max_photos),
                ))
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    pub fn mark_category_complete(&mut self, category_id: &str) -> InspectResult<()> {
        self.category(category_id)?;
        self.submission.completed_categories.insert(category_id.to_string());
        Ok(())
    }

    /// Under [`CompletionPolicy::Navigation`] this is the mark alone; under
    /// [`CompletionPolicy::RequiredFields`] the category's required fields
    /// must also be filled.
    pub fn is_category_complete(&self, category_id: &str) -> bool {
        if !self.submission.completed_categories.contains(category_id) {
            return false;
        }
        match self.completion {
            CompletionPolicy::Navigation => true,
            CompletionPolicy::RequiredFields => self
                .category(category_id)
                .map(|c| self.missing_in(c).is_empty())
                .unwrap_or(false),
        }
    }

    /// Completed categories over total categories
    pub fn progress(&self) -> f64 {
        let done = self
            .categories
            .iter()
            .filter(|c| self.is_category_complete(&c.id))
            .count();
        done as f64 / self.categories.len() as f64
    }

    /// Required field ids without a value, in checklist order. Empty means
    /// ready to submit; nothing here blocks submission.
    pub fn validate_for_submission(&self) -> Vec<String> {
        self.categories.iter().flat_map(|c| self.missing_in(c)).collect()
    }

    pub fn missing_in_category(&self, category_id: &str) -> InspectResult<Vec<String>> {
        Ok(self.missing_in(self.category(category_id)?))
    }

    pub fn is_ready(&self) -> bool {
        self.validate_for_submission().is_empty()
    }

    /// Blank text and empty lists count as missing
    fn missing_in(&self, category: &CategoryDefinition) -> Vec<String> {
        category
            .required_fields()
            .filter(|f| self.submission.value(&f.id).map_or(true, FieldValue::is_empty))
            .map(|f| f.id.clone())
            .collect()
    }

    fn category(&self, category_id: &str) -> InspectResult<&CategoryDefinition> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| InspectError::NotFound(format!("category '{}'", category_id)))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn cursor(&self) -> CategoryCursor {
        self.cursor
    }

    pub fn current_category(&self) -> &CategoryDefinition {
        &self.categories[self.cursor.index()]
    }

    pub fn next(&mut self) -> bool {
        self.cursor.next()
    }

    pub fn prev(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn jump_to(&mut self, index: usize) -> InspectResult<()> {
        self.cursor.jump_to(index)
    }

    /// Mark the current category complete and move on. At the last
    /// category nothing happens; submitting is the caller's move.
    pub fn advance(&mut self) -> bool {
        if self.cursor.is_last() {
            return false;
        }
        let id = self.current_category().id.clone();
        self.submission.completed_categories.insert(id);
        self.cursor.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<CategoryDefinition> {
        vec![
            CategoryDefinition::new("vehicleInfo", "车型信息")
                .with_field(FieldDefinition::new("info_5", "钥匙数量", FieldKind::Number).required())
                .with_field(
                    FieldDefinition::new("info_6", "排放标准", FieldKind::Select {
                        options: vec!["国五".to_string(), "国六".to_string()],
                    })
                    .required(),
                ),
            CategoryDefinition::new("video", "工况视频拍摄")
                .with_field(FieldDefinition::new("video_1", "整车外观视频", FieldKind::Photo { count: None }).required()),
        ]
    }

    #[test]
    fn test_unknown_field() {
        let mut builder = SubmissionBuilder::new("WO-1", categories()).unwrap();
        let err = builder.set_value("info_9", FieldValue::Number(2.0)).unwrap_err();
        assert!(matches!(err, InspectError::NotFound(_)));
    }

    #[test]
    fn test_blank_select_rejected() {
        let mut builder = SubmissionBuilder::new("WO-1", categories()).unwrap();
        builder.set_value("info_6", FieldValue::text("国六")).unwrap();
        let err = builder.set_value("info_6", FieldValue::text("")).unwrap_err();
        assert!(matches!(err, InspectError::TypeMismatch { .. }));
        assert_eq!(builder.value("info_6"), Some(&FieldValue::text("国六")));

        assert_eq!(builder.clear_value("info_6"), Some(FieldValue::text("国六")));
        assert!(builder.value("info_6").is_none());
    }

    #[test]
    fn test_config_photo_limit() {
        let config = InspectConfig {
            max_photos_per_field: 2,
            ..InspectConfig::default()
        };
        let mut builder = SubmissionBuilder::new("WO-1", categories()).unwrap().with_config(&config);
        assert!(builder.set_value("video_1", FieldValue::photos(["a", "b"])).is_ok());
        assert!(matches!(
            builder.set_value("video_1", FieldValue::photos(["a", "b", "c"])),
            Err(InspectError::TypeMismatch { .. })
        ));
        assert_eq!(builder.value("video_1"), Some(&FieldValue::photos(["a", "b"])));
    }

    #[test]
    fn test_set_raw_number() {
        let mut builder = SubmissionBuilder::new("WO-1", categories()).unwrap();
        builder.set_raw("info_5", "2").unwrap();
        assert_eq!(builder.value("info_5"), Some(&FieldValue::Number(2.0)));
        assert!(builder.set_raw("info_5", "two").is_err());
    }

    #[test]
    fn test_advance_marks_and_stops_at_last() {
        let mut builder = SubmissionBuilder::new("WO-1", categories())
            .unwrap()
            .with_completion(CompletionPolicy::Navigation);
        assert!(builder.advance());
        assert!(builder.is_category_complete("vehicleInfo"));
        assert!(!builder.advance());
        assert!(!builder.is_category_complete("video"));
        assert_eq!(builder.progress(), 0.5);
    }

    #[test]
    fn test_photo_refs() {
        let mut builder = SubmissionBuilder::new("WO-1", categories()).unwrap();
        builder.set_value("video_1", FieldValue::photos(["oss://v/1.mp4"])).unwrap();
        assert_eq!(builder.submission().photo_refs(), vec!["oss://v/1.mp4"]);
    }
}
