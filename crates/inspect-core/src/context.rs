//! Session Context: who is inspecting what, threaded explicitly by callers
use crate::config::CompletionPolicy;
use crate::data_model::VehicleType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub work_order_id: String,
    pub vehicle_type: VehicleType,
    pub inspector_id: Option<String>,
    /// Correlates log events of one inspection session
    pub trace_id: String,
    pub completion: CompletionPolicy,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SessionContext {
    pub fn new(work_order_id: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            work_order_id: work_order_id.into(),
            vehicle_type,
            inspector_id: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
            completion: CompletionPolicy::default(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_inspector(mut self, inspector_id: impl Into<String>) -> Self {
        self.inspector_id = Some(inspector_id.into());
        self
    }

    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }
}
