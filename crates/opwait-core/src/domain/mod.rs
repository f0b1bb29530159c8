//! Domain model (ids, snapshots, statuses, errors).
//!
//! - ids: `OperationId` と family 判定
//! - operation: `OperationSnapshot`, `OperationStatus`
//! - status: `Code`, `Status`, `RpcStatus`
//! - errors: `RefreshError`, `WaitError`

pub mod errors;
pub mod ids;
pub mod operation;
pub mod status;

pub use self::errors::{RefreshError, WaitError};
pub use self::ids::{OperationFamily, OperationId};
pub use self::operation::{OperationSnapshot, OperationStatus};
pub use self::status::{Code, RpcStatus, Status};
