//! opwait-core
//!
//! Client-side tracking of long-running remote operations: classify an
//! operation id, route status queries to the owning backend family, and
//! wait until the operation finishes or the caller cancels.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, operation, status, errors）
//! - **ports**: 抽象化レイヤー（OperationServiceClient, OperationClients）
//! - **app**: Operation ハンドルと wait ループ
//! - **impls**: 実装（ScriptedOperationClient など開発用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Operation, WaitPolicy};
pub use domain::{
    Code, OperationFamily, OperationId, OperationSnapshot, OperationStatus, RefreshError,
    RpcStatus, Status, WaitError,
};
pub use ports::{OperationClients, OperationServiceClient};
pub use tokio_util::sync::CancellationToken;
