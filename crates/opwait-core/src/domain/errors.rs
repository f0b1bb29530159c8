//! Errors - refresh / wait のエラー分類
//!
//! Three things can go wrong while waiting, and callers need to tell
//! them apart:
//! - we could not observe the operation (`WaitError::Poll`)
//! - the caller gave up (`WaitError::Cancelled`)
//! - the operation itself failed (`WaitError::Operation`)
//!
//! Every variant keeps the underlying [`Status`] reachable, both through
//! `std::error::Error::source` and the typed `status()` accessors.

use thiserror::Error;

use super::ids::{OperationFamily, OperationId};
use super::status::Status;

/// Failure of a single status query.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The id matched no family, or the family's query failed.
    #[error("operation (id={id}) unknown type")]
    UnknownOperationType {
        id: OperationId,
        #[source]
        source: Option<Status>,
    },

    /// The id classified fine but no client was wired for its family.
    #[error("operation (id={id}) has no {family} operation client")]
    ClientUnavailable {
        id: OperationId,
        family: OperationFamily,
    },
}

impl RefreshError {
    /// Status returned by the backend, if the query got that far.
    pub fn status(&self) -> Option<&Status> {
        match self {
            RefreshError::UnknownOperationType { source, .. } => source.as_ref(),
            RefreshError::ClientUnavailable { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status().is_some_and(Status::is_not_found)
    }
}

/// Outcome of a wait that did not end in success.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("operation (id={id}) poll fail")]
    Poll {
        id: OperationId,
        #[source]
        source: RefreshError,
    },

    #[error("operation (id={id}) wait context done")]
    Cancelled { id: OperationId },

    #[error("operation (id={id}) failed")]
    Operation {
        id: OperationId,
        #[source]
        status: Status,
    },
}

impl WaitError {
    pub fn id(&self) -> &OperationId {
        match self {
            WaitError::Poll { id, .. }
            | WaitError::Cancelled { id }
            | WaitError::Operation { id, .. } => id,
        }
    }

    /// The status behind the failure: the query's for `Poll`, the recorded
    /// one for `Operation`.
    pub fn status(&self) -> Option<&Status> {
        match self {
            WaitError::Poll { source, .. } => source.status(),
            WaitError::Cancelled { .. } => None,
            WaitError::Operation { status, .. } => Some(status),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    pub fn is_poll_failure(&self) -> bool {
        matches!(self, WaitError::Poll { .. })
    }

    pub fn is_operation_failure(&self) -> bool {
        matches!(self, WaitError::Operation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::Code;
    use std::error::Error as _;

    #[test]
    fn refresh_error_exposes_query_status() {
        let err = RefreshError::UnknownOperationType {
            id: OperationId::new("cho1"),
            source: Some(Status::not_found("gone")),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "operation (id=cho1) unknown type");
        assert!(err.source().is_some());
    }

    #[test]
    fn unmatched_id_has_no_status() {
        let err = RefreshError::UnknownOperationType {
            id: OperationId::new("???"),
            source: None,
        };
        assert!(err.status().is_none());
        assert!(!err.is_not_found());
        assert!(err.source().is_none());
    }

    #[test]
    fn wait_errors_are_distinguishable() {
        let poll = WaitError::Poll {
            id: OperationId::new("kfo1"),
            source: RefreshError::UnknownOperationType {
                id: OperationId::new("kfo1"),
                source: Some(Status::new(Code::Internal, "db down")),
            },
        };
        let op = WaitError::Operation {
            id: OperationId::new("kfo1"),
            status: Status::new(Code::Internal, "db down"),
        };
        let cancelled = WaitError::Cancelled {
            id: OperationId::new("kfo1"),
        };

        // 同じ Status でも「観測失敗」と「操作失敗」は区別できる
        assert_eq!(poll.status(), op.status());
        assert_ne!(poll.to_string(), op.to_string());
        assert!(poll.is_poll_failure() && !poll.is_operation_failure());
        assert!(op.is_operation_failure() && !op.is_poll_failure());
        assert!(cancelled.is_cancelled());
        assert!(cancelled.status().is_none());
        assert_eq!(cancelled.id().as_str(), "kfo1");
    }

    #[test]
    fn wait_error_source_chain_reaches_status() {
        let err = WaitError::Poll {
            id: OperationId::new("cho9"),
            source: RefreshError::UnknownOperationType {
                id: OperationId::new("cho9"),
                source: Some(Status::not_found("missing")),
            },
        };

        let refresh = err.source().expect("poll error has a source");
        let status = refresh.source().expect("refresh error has a source");
        let status = status.downcast_ref::<Status>().expect("source is a Status");
        assert_eq!(status.code(), Code::NotFound);
    }
}
