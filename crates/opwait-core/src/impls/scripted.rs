//! ScriptedOperationClient - 開発用・テスト用のステータス応答
//!
//! # 学習ポイント
//! - `&self` のまま script を積めるよう Mutex で内部可変性を持たせる
//! - 呼び出し回数と要求 ID を記録して routing を検証できる

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ids::OperationId;
use crate::domain::operation::OperationSnapshot;
use crate::domain::status::Status;
use crate::ports::operation_client::{
    GetOperationRequest, OperationResponse, OperationServiceClient, ResponseMetadata,
};

type Reply = Result<OperationResponse, Status>;

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    last: Option<Reply>,
    requests: Vec<OperationId>,
}

/// Replays a fixed sequence of replies, one per `get`.
///
/// Once the script runs out the last reply is repeated, so "stays running
/// forever" is a single `push_ok`. With nothing scripted at all every call
/// fails with `Unavailable`.
///
/// # 使用例
/// ```ignore
/// let client = Arc::new(ScriptedOperationClient::new());
/// client.push_err(Status::not_found("replica lag"));
/// client.push_ok(OperationSnapshot::done("cho1"));
/// let clients = OperationClients::new().with_clickhouse(client.clone());
/// ```
#[derive(Default)]
pub struct ScriptedOperationClient {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl ScriptedOperationClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // poison されても script 自体は壊れていないのでそのまま使う
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, reply: Result<OperationResponse, Status>) {
        self.script().replies.push_back(reply);
    }

    pub fn push_ok(&self, snapshot: OperationSnapshot) {
        self.push(Ok(OperationResponse::new(snapshot)));
    }

    pub fn push_ok_with_metadata(&self, snapshot: OperationSnapshot, metadata: ResponseMetadata) {
        self.push(Ok(OperationResponse::new(snapshot).with_metadata(metadata)));
    }

    pub fn push_err(&self, status: Status) {
        self.push(Err(status));
    }

    /// Number of `get` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Operation ids requested, in call order.
    pub fn requests(&self) -> Vec<OperationId> {
        self.script().requests.clone()
    }
}

#[async_trait]
impl OperationServiceClient for ScriptedOperationClient {
    async fn get(&self, request: GetOperationRequest) -> Result<OperationResponse, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script();
        script.requests.push(request.operation_id);

        match script.replies.pop_front() {
            Some(reply) => {
                script.last = Some(reply.clone());
                reply
            }
            None => script
                .last
                .clone()
                .unwrap_or_else(|| Err(Status::unavailable("no scripted reply"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::Code;

    fn request(id: &str) -> GetOperationRequest {
        GetOperationRequest::new(OperationId::new(id))
    }

    #[tokio::test]
    async fn replies_in_order_then_repeats_last() {
        let client = ScriptedOperationClient::new();
        client.push_err(Status::not_found("lag"));
        client.push_ok(OperationSnapshot::new("cho1"));

        let first = client.get(request("cho1")).await;
        let second = client.get(request("cho1")).await;
        let third = client.get(request("cho1")).await;

        assert_eq!(first.unwrap_err().code(), Code::NotFound);
        assert_eq!(second.unwrap().operation.id.as_str(), "cho1");
        assert_eq!(third.unwrap().operation.id.as_str(), "cho1");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn empty_script_is_unavailable() {
        let client = ScriptedOperationClient::new();

        let err = client.get(request("kfo1")).await.unwrap_err();

        assert_eq!(err.code(), Code::Unavailable);
        assert_eq!(client.requests(), vec![OperationId::new("kfo1")]);
    }
}
