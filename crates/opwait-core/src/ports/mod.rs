//! Ports - 抽象化レイヤー
//!
//! 各 backend（ClickHouse, Kafka, Transfer, Network）の
//! `OperationService.Get` への入口を trait として定義します。
//! transport（gRPC, TLS, auth, channel retry）は実装側の責務です。

pub mod operation_client;

pub use self::operation_client::{
    GetOperationRequest, OperationClients, OperationResponse, OperationServiceClient,
    POLL_INTERVAL_METADATA_KEY, ResponseMetadata,
};
