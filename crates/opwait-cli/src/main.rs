use std::env;
use std::sync::Arc;
use std::time::Duration;

use opwait_core::domain::Code;
use opwait_core::impls::ScriptedOperationClient;
use opwait_core::ports::{POLL_INTERVAL_METADATA_KEY, ResponseMetadata};
use opwait_core::{
    CancellationToken, Operation, OperationClients, OperationSnapshot, Status, WaitPolicy,
};
use tracing_subscriber::EnvFilter;

const OPERATION_ID: &str = "cho8d1v3a5n2q7e0";

/// 環境変数で WaitPolicy の既定値を上書きする
fn policy_from_env() -> Result<WaitPolicy, Box<dyn std::error::Error>> {
    let mut policy = WaitPolicy::default_v1();
    if let Ok(ms) = env::var("OPWAIT_POLL_INTERVAL_MS") {
        policy = policy.with_poll_interval(Duration::from_millis(ms.parse()?));
    }
    if let Ok(n) = env::var("OPWAIT_NOT_FOUND_RETRIES") {
        policy = policy.with_max_not_found_retries(n.parse()?);
    }
    Ok(policy)
}

/// backend の代わり：作成直後の replica 遅延 → running ×2 → done
fn scripted_backend(fail: bool) -> Arc<ScriptedOperationClient> {
    let client = ScriptedOperationClient::new();
    client.push_err(Status::not_found("operation not replicated yet"));
    client.push_ok(
        OperationSnapshot::new(OPERATION_ID)
            .with_description("Create ClickHouse cluster")
            .with_resource_id("chcq1w2e3r4t5y6u"),
    );
    client.push_ok_with_metadata(
        OperationSnapshot::new(OPERATION_ID)
            .with_description("Create ClickHouse cluster")
            .with_resource_id("chcq1w2e3r4t5y6u"),
        ResponseMetadata::new().with(POLL_INTERVAL_METADATA_KEY, "1"),
    );
    let last = OperationSnapshot::done(OPERATION_ID)
        .with_description("Create ClickHouse cluster")
        .with_resource_id("chcq1w2e3r4t5y6u")
        .with_metadata("cluster_id", "chcq1w2e3r4t5y6u");
    client.push_ok(if fail {
        last.with_error(Status::new(Code::ResourceExhausted, "cluster quota exceeded"))
    } else {
        last
    });
    Arc::new(client)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // (A) 設定と backend を用意
    let policy = policy_from_env()?;
    let fail = env::args().any(|arg| arg == "--fail");
    let backend = scripted_backend(fail);
    let clients = OperationClients::new().with_clickhouse(backend.clone());

    // (B) 作成 API が返した直後の snapshot からハンドルを作る
    let created = Some(OperationSnapshot::new(OPERATION_ID).with_created_by("demo@opwait"));
    let mut op = Operation::from_proto(clients, created);
    tracing::info!(operation_id = %op.id(), family = %op.family(), "waiting for operation");

    // (C) Ctrl-C でキャンセル
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    // (D) 終了まで待つ
    let result = op.wait_with(&cancel, &policy).await;
    tracing::info!(polls = backend.calls(), "wait returned");

    // (E) 最終 snapshot を表示
    println!("{}", serde_json::to_string_pretty(op.snapshot())?);
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{err}");
            if let Some(status) = err.status() {
                eprintln!("  caused by: {status}");
            }
            Err(err.into())
        }
    }
}
