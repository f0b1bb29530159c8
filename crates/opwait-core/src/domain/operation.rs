//! Operation snapshot: the observable state of a remote operation at one
//! point in time.
//!
//! Snapshots are plain values. The handle replaces its snapshot as a whole
//! on every successful refresh; nothing mutates one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::OperationId;
use super::status::{RpcStatus, Status};

/// Lifecycle status reported by the backend.
///
/// `Done` and `Invalid` are terminal. `Invalid` covers operations the
/// backend gave up on or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
    Invalid,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Done | OperationStatus::Invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub id: OperationId,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_by: String,

    /// Resource the operation acts on (cluster, topic, transfer, ...).
    #[serde(default)]
    pub resource_id: String,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    pub status: OperationStatus,

    /// Present only on a terminal, unsuccessful operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcStatus>,
}

impl OperationSnapshot {
    /// A freshly observed running operation.
    pub fn new(id: impl Into<OperationId>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            created_by: String::new(),
            resource_id: String::new(),
            created_at: Utc::now(),
            metadata: HashMap::new(),
            status: OperationStatus::Running,
            error: None,
        }
    }

    pub fn done(id: impl Into<OperationId>) -> Self {
        Self::new(id).with_status(OperationStatus::Done)
    }

    pub fn failed(id: impl Into<OperationId>, status: Status) -> Self {
        Self::new(id)
            .with_status(OperationStatus::Done)
            .with_error(status)
    }

    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_error(mut self, status: Status) -> Self {
        self.error = Some(status.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// An error may only be recorded once the operation is terminal.
    pub fn is_consistent(&self) -> bool {
        self.error.is_none() || self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::Code;
    use chrono::TimeZone;

    #[test]
    fn terminal_statuses() {
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::Running.is_terminal());
        assert!(OperationStatus::Done.is_terminal());
        assert!(OperationStatus::Invalid.is_terminal());
    }

    #[test]
    fn error_on_running_operation_is_inconsistent() {
        let ok = OperationSnapshot::failed("cho1", Status::internal("boom"));
        assert!(ok.is_consistent());

        let broken = OperationSnapshot::new("cho1").with_error(Status::internal("boom"));
        assert!(!broken.is_consistent());
    }

    #[test]
    fn snapshot_json_shape() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let snapshot = OperationSnapshot::failed("kfo42", Status::new(Code::Aborted, "rollback"))
            .with_created_at(created_at)
            .with_description("Create topic")
            .with_metadata("topic", "events");

        let v = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(v["id"], "kfo42");
        assert_eq!(v["status"], "DONE");
        assert_eq!(v["error"]["code"], 10);
        assert_eq!(v["metadata"]["topic"], "events");
        assert_eq!(v["created_at"], "2024-01-01T12:00:00Z");

        let back: OperationSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let v = serde_json::json!({
            "id": "dtj1",
            "created_at": "2024-01-01T00:00:00Z",
            "status": "PENDING",
        });
        let snapshot: OperationSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(snapshot.status, OperationStatus::Pending);
        assert!(snapshot.metadata.is_empty());
        assert!(snapshot.error.is_none());
        assert!(snapshot.description.is_empty());
    }
}
