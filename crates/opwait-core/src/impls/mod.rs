//! Impls - 実装（開発用・テスト用）
//!
//! 本番では gRPC クライアントが `OperationServiceClient` を実装します。
//! ここには backend なしで動かすための実装だけを置きます。

pub mod scripted;

pub use self::scripted::ScriptedOperationClient;
