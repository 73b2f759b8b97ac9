//! Persistence seam for submissions

use crate::submission::Submission;
use inspect_core::{InspectError, InspectResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Persistence collaborator for submissions, atomic per work order
pub trait SubmissionStore: Send + Sync {
    fn load_submission(&self, work_order_id: &str) -> InspectResult<Option<Submission>>;

    fn save_submission(&self, submission: &Submission) -> InspectResult<()>;
}

impl<T: SubmissionStore + ?Sized> SubmissionStore for Arc<T> {
    fn load_submission(&self, work_order_id: &str) -> InspectResult<Option<Submission>> {
        (**self).load_submission(work_order_id)
    }

    fn save_submission(&self, submission: &Submission) -> InspectResult<()> {
        (**self).save_submission(submission)
    }
}

#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    submissions: RwLock<HashMap<String, Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn load_submission(&self, work_order_id: &str) -> InspectResult<Option<Submission>> {
        let submissions = self
            .submissions
            .read()
            .map_err(|_| InspectError::Storage("submission store lock poisoned".to_string()))?;
        Ok(submissions.get(work_order_id).cloned())
    }

    fn save_submission(&self, submission: &Submission) -> InspectResult<()> {
        let mut submissions = self
            .submissions
            .write()
            .map_err(|_| InspectError::Storage("submission store lock poisoned".to_string()))?;
        submissions.insert(submission.work_order_id.clone(), submission.clone());
        Ok(())
    }
}
