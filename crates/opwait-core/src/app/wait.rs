//! Wait loop - 終了状態まで poll し続ける
//!
//! # フロー
//! 1. poll（refresh + response headers）
//! 2. done なら終了（記録された error があればそれを返す）
//! 3. not-found は上限回数まで即座に再 poll（sleep しない）
//! 4. interval を決めて sleep、キャンセルと競合させる

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::operation::Operation;
use super::policy::WaitPolicy;
use crate::domain::errors::WaitError;

impl Operation {
    /// Wait until the operation is done, polling every second unless the
    /// server suggests otherwise.
    pub async fn wait(&mut self, cancel: &CancellationToken) -> Result<(), WaitError> {
        self.wait_with(cancel, &WaitPolicy::default()).await
    }

    /// Wait with a custom base poll interval.
    pub async fn wait_interval(
        &mut self,
        cancel: &CancellationToken,
        poll_interval: Duration,
    ) -> Result<(), WaitError> {
        let policy = WaitPolicy::default().with_poll_interval(poll_interval);
        self.wait_with(cancel, &policy).await
    }

    /// Drive refreshes until the operation is done or `cancel` fires.
    ///
    /// Returns `Ok(())` when the operation finished without a recorded
    /// error. Cancellation is only observed between polls: a query already
    /// in flight is allowed to complete.
    #[tracing::instrument(
        name = "operation.wait",
        skip_all,
        fields(operation_id = %self.id(), family = %self.family())
    )]
    pub async fn wait_with(
        &mut self,
        cancel: &CancellationToken,
        policy: &WaitPolicy,
    ) -> Result<(), WaitError> {
        let mut not_found_count = 0u32;

        while !self.done() {
            let metadata = match self.poll().await {
                Ok(metadata) => metadata,
                Err(err)
                    if err.is_not_found() && not_found_count < policy.max_not_found_retries =>
                {
                    // replica にまだ載っていない可能性があるので即座にやり直す
                    not_found_count += 1;
                    tracing::warn!(
                        attempt = not_found_count,
                        max_retries = policy.max_not_found_retries,
                        "operation not found yet, polling again"
                    );
                    continue;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "operation poll failed");
                    return Err(WaitError::Poll {
                        id: self.id().clone(),
                        source: err,
                    });
                }
            };

            if self.done() {
                break;
            }

            let interval = policy.next_interval(&metadata);
            tracing::debug!(
                status = ?self.status(),
                interval_ms = interval.as_millis() as u64,
                "operation still running"
            );
            if interval.is_zero() {
                continue;
            }

            // cancel 側を優先し、sleep future は drop でタイマーごと解放される
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("operation wait cancelled");
                    return Err(WaitError::Cancelled {
                        id: self.id().clone(),
                    });
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        match self.error_status() {
            None => {
                tracing::info!(status = ?self.status(), "operation finished");
                Ok(())
            }
            Some(status) => {
                tracing::info!(
                    code = %status.code(),
                    reason = status.message(),
                    "operation failed"
                );
                Err(WaitError::Operation {
                    id: self.id().clone(),
                    status,
                })
            }
        }
    }
}
