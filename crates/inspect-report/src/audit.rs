//! Audit review of draft reports
//!
//! A work order under review carries a draft report. The auditor may
//! annotate inspection items, then approves or rejects. Either decision
//! freezes the draft and yields an [`AuditRecord`]; the [`AuditLog`] keeps
//! a bounded history of those records.

use crate::report::ReportResult;
use chrono::{DateTime, Utc};
use inspect_core::{InspectConfig, InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Created,
    PendingDispatch,
    Dispatched,
    InProgress,
    UnderReview,
    Completed,
    Rejected,
    Cancelled,
}

impl WorkOrderStatus {
    /// Status after an audit decision. Only a work order under review can
    /// be decided.
    pub fn after_review(self, action: AuditAction) -> InspectResult<WorkOrderStatus> {
        match (self, action) {
            (WorkOrderStatus::UnderReview, AuditAction::Approve) => Ok(WorkOrderStatus::Completed),
            (WorkOrderStatus::UnderReview, AuditAction::Reject) => Ok(WorkOrderStatus::Rejected),
            (other, action) => Err(InspectError::Conflict(format!(
                "cannot {} a work order that is {}",
                action, other
            ))),
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            WorkOrderStatus::Completed | WorkOrderStatus::Rejected | WorkOrderStatus::Cancelled
        )
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkOrderStatus::Created => "created",
            WorkOrderStatus::PendingDispatch => "pending_dispatch",
            WorkOrderStatus::Dispatched => "dispatched",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::UnderReview => "under_review",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Rejected => "rejected",
            WorkOrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Approve,
    Reject,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Approve => f.write_str("approve"),
            AuditAction::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auditor {
    pub id: String,
    pub name: String,
}

impl Auditor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One approve or reject decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    pub work_order_id: String,
    pub auditor_id: String,
    pub auditor_name: String,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Fingerprint of the report as decided
    pub report_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// A draft report awaiting an audit decision
#[derive(Debug, Clone)]
pub struct AuditReview {
    status: WorkOrderStatus,
    draft: ReportResult,
    decision: Option<AuditRecord>,
}

impl AuditReview {
    /// Open a review. The work order must be under review.
    pub fn open(draft: ReportResult, status: WorkOrderStatus) -> InspectResult<Self> {
        if status != WorkOrderStatus::UnderReview {
            return Err(InspectError::Conflict(format!(
                "work order {} is {}, not under review",
                draft.work_order_id, status
            )));
        }
        Ok(Self {
            status,
            draft,
            decision: None,
        })
    }

    pub fn status(&self) -> WorkOrderStatus {
        self.status
    }

    pub fn report(&self) -> &ReportResult {
        &self.draft
    }

    pub fn decision(&self) -> Option<&AuditRecord> {
        self.decision.as_ref()
    }

    /// Set the auditor comment on item `index`; a blank comment clears it
    pub fn annotate(&mut self, index: usize, comment: impl Into<String>) -> InspectResult<()> {
        self.ensure_open()?;
        let len = self.draft.inspection_items.len();
        let item = self
            .draft
            .inspection_items
            .get_mut(index)
            .ok_or_else(|| InspectError::out_of_range(index as i64, 0, len as i64 - 1))?;

        let comment = comment.into();
        item.auditor_comment = if comment.trim().is_empty() {
            None
        } else {
            Some(comment)
        };
        Ok(())
    }

    pub fn approve(&mut self, auditor: &Auditor) -> InspectResult<&AuditRecord> {
        self.decide(auditor, AuditAction::Approve, None)
    }

    pub fn reject(&mut self, auditor: &Auditor, reason: &str) -> InspectResult<&AuditRecord> {
        if reason.trim().is_empty() {
            return Err(InspectError::Validation("rejection needs a reason".to_string()));
        }
        self.decide(auditor, AuditAction::Reject, Some(reason.trim().to_string()))
    }

    /// The report, once approved
    pub fn into_approved(self) -> InspectResult<(ReportResult, AuditRecord)> {
        match self.decision {
            Some(record) if record.action == AuditAction::Approve => Ok((self.draft, record)),
            _ => Err(InspectError::Conflict(format!(
                "report {} was not approved",
                self.draft.id
            ))),
        }
    }

    fn ensure_open(&self) -> InspectResult<()> {
        match &self.decision {
            Some(record) => Err(InspectError::Conflict(format!(
                "work order {} already decided: {}",
                record.work_order_id, record.action
            ))),
            None => Ok(()),
        }
    }

    fn decide(
        &mut self,
        auditor: &Auditor,
        action: AuditAction,
        reason: Option<String>,
    ) -> InspectResult<&AuditRecord> {
        self.ensure_open()?;
        let next = self.status.after_review(action)?;

        let record = AuditRecord {
            id: format!("aud-{}", uuid::Uuid::new_v4()),
            work_order_id: self.draft.work_order_id.clone(),
            auditor_id: auditor.id.clone(),
            auditor_name: auditor.name.clone(),
            action,
            reason,
            report_fingerprint: self.draft.fingerprint()?,
            created_at: Utc::now(),
        };
        tracing::info!(
            work_order_id = %record.work_order_id,
            auditor_id = %record.auditor_id,
            action = %action,
            status = %next,
            "audit decision"
        );

        self.status = next;
        Ok(self.decision.insert(record))
    }
}

/// Bounded history of audit decisions; the oldest records go first
pub struct AuditLog {
    records: Vec<AuditRecord>,
    max_records: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_max_records(InspectConfig::default().audit_log_capacity)
    }

    pub fn with_max_records(max: usize) -> Self {
        Self {
            records: Vec::new(),
            max_records: max,
        }
    }

    pub fn from_config(config: &InspectConfig) -> Self {
        Self::with_max_records(config.audit_log_capacity)
    }

    pub fn log(&mut self, record: AuditRecord) {
        self.records.push(record);

        if self.records.len() > self.max_records {
            let drain_count = self.records.len() - self.max_records;
            self.records.drain(0..drain_count);
        }
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn for_work_order(&self, work_order_id: &str) -> Vec<&AuditRecord> {
        self.records
            .iter()
            .filter(|r| r.work_order_id == work_order_id)
            .collect()
    }

    pub fn by_auditor(&self, auditor_id: &str) -> Vec<&AuditRecord> {
        self.records.iter().filter(|r| r.auditor_id == auditor_id).collect()
    }

    pub fn since(&self, at: DateTime<Utc>) -> Vec<&AuditRecord> {
        self.records.iter().filter(|r| r.created_at >= at).collect()
    }

    /// Export as JSON Lines
    pub fn to_jsonl(&self) -> InspectResult<String> {
        let lines = self
            .records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InspectError::Storage(e.to_string()))?;
        Ok(lines.join("\n"))
    }

    pub fn stats(&self) -> AuditStats {
        let total = self.records.len();
        let approved = self
            .records
            .iter()
            .filter(|r| r.action == AuditAction::Approve)
            .count();

        AuditStats {
            total,
            approved,
            rejected: total - approved,
            approval_rate: if total > 0 { approved as f64 / total as f64 } else { 0.0 },
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub approval_rate: f64,
}
