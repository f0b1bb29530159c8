//! App - アプリケーション層
//!
//! ports を組み合わせて操作の追跡を実装します。
//!
//! # 主要コンポーネント
//! - **Operation**: snapshot を保持し `refresh` で最新化するハンドル
//! - **WaitPolicy**: poll 間隔と not-found 許容回数
//! - **wait**: 終了状態・キャンセルまで poll し続けるループ

pub mod operation;
pub mod policy;
pub mod wait;

pub use self::operation::Operation;
pub use self::policy::{DEFAULT_MAX_NOT_FOUND_RETRIES, DEFAULT_POLL_INTERVAL, WaitPolicy};
