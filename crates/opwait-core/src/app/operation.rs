//! Operation handle - 実行中の操作を追跡するハンドル
//!
//! The handle owns the latest known snapshot of one remote operation plus
//! the routing table used to query its status. Accessors only read the
//! current snapshot; `refresh` is the single place that replaces it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::errors::RefreshError;
use crate::domain::ids::{OperationFamily, OperationId};
use crate::domain::operation::{OperationSnapshot, OperationStatus};
use crate::domain::status::Status;
use crate::ports::operation_client::{GetOperationRequest, OperationClients, ResponseMetadata};

/// Handle to a long-running remote operation.
///
/// # 使用例
/// ```ignore
/// let mut op = Operation::new(clients, created.operation);
/// op.wait(&cancel).await?;
/// println!("{} finished", op.id());
/// ```
///
/// `refresh` and the wait loop take `&mut self`, so one handle cannot be
/// refreshed from two places at once. Independent handles share nothing
/// but the (stateless) clients.
#[derive(Debug, Clone)]
pub struct Operation {
    snapshot: OperationSnapshot,
    clients: OperationClients,
}

impl Operation {
    pub fn new(clients: OperationClients, snapshot: OperationSnapshot) -> Self {
        Self { snapshot, clients }
    }

    /// Build a handle from a response whose operation field is optional.
    ///
    /// # Panics
    /// Panics when `snapshot` is `None`: a create call that returned no
    /// operation is a programming error, not something to wait on.
    pub fn from_proto(clients: OperationClients, snapshot: Option<OperationSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self::new(clients, snapshot),
            None => panic!("nil operation"),
        }
    }

    pub fn snapshot(&self) -> &OperationSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> OperationSnapshot {
        self.snapshot
    }

    pub fn clients(&self) -> &OperationClients {
        &self.clients
    }

    pub fn id(&self) -> &OperationId {
        &self.snapshot.id
    }

    pub fn family(&self) -> OperationFamily {
        self.snapshot.id.family()
    }

    pub fn description(&self) -> &str {
        &self.snapshot.description
    }

    pub fn created_by(&self) -> &str {
        &self.snapshot.created_by
    }

    pub fn resource_id(&self) -> &str {
        &self.snapshot.resource_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.snapshot.created_at
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.snapshot.metadata
    }

    pub fn status(&self) -> OperationStatus {
        self.snapshot.status
    }

    /// Recorded failure decoded into a typed status, if any.
    pub fn error_status(&self) -> Option<Status> {
        self.snapshot.error.as_ref().map(|e| e.decode())
    }

    /// Same as [`Operation::error_status`]; `Status` is the error type.
    pub fn error(&self) -> Option<Status> {
        self.error_status()
    }

    pub fn done(&self) -> bool {
        self.snapshot.is_terminal()
    }

    pub fn ok(&self) -> bool {
        self.done() && self.snapshot.error.is_none()
    }

    pub fn failed(&self) -> bool {
        self.done() && self.snapshot.error.is_some()
    }

    /// Fetch the current state once and replace the snapshot on success.
    ///
    /// On error the previous snapshot is kept untouched.
    pub async fn refresh(&mut self) -> Result<(), RefreshError> {
        self.poll().await.map(|_| ())
    }

    /// Like `refresh`, but also hands back the response headers (the wait
    /// loop reads its poll-interval hint from them).
    pub(crate) async fn poll(&mut self) -> Result<ResponseMetadata, RefreshError> {
        let id = self.snapshot.id.clone();
        let family = id.family();
        if !family.is_known() {
            return Err(RefreshError::UnknownOperationType { id, source: None });
        }
        let client = self
            .clients
            .client_for(family)
            .ok_or_else(|| RefreshError::ClientUnavailable {
                id: id.clone(),
                family,
            })?;

        let response = client
            .get(GetOperationRequest::new(id.clone()))
            .await
            .map_err(|status| RefreshError::UnknownOperationType {
                id: id.clone(),
                source: Some(status),
            })?;

        if !response.operation.is_consistent() {
            tracing::warn!(
                operation_id = %id,
                status = ?response.operation.status,
                "operation carries an error while not terminal"
            );
        }
        // 新しい snapshot は完成済みの値として丸ごと差し替える
        self.snapshot = response.operation;
        Ok(response.metadata)
    }
}
