//! OperationServiceClient port - ステータス問い合わせの抽象化
//!
//! Each backend family (ClickHouse, Kafka, Transfer, Network) exposes its
//! own `OperationService.Get`. The wire format is not our concern: callers
//! plug in whatever transport they use by implementing
//! [`OperationServiceClient`], and wire one client per family into
//! [`OperationClients`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ids::{OperationFamily, OperationId};
use crate::domain::operation::OperationSnapshot;
use crate::domain::status::Status;

/// Response header carrying the server-suggested poll interval, in seconds.
pub const POLL_INTERVAL_METADATA_KEY: &str = "x-operation-poll-interval";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOperationRequest {
    pub operation_id: OperationId,
}

impl GetOperationRequest {
    pub fn new(operation_id: OperationId) -> Self {
        Self { operation_id }
    }
}

/// Response headers of a status query.
///
/// Multi-valued like gRPC metadata; keys are stored lowercase so lookups
/// are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    entries: HashMap<String, Vec<String>>,
}

impl ResponseMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// All values for `key`, in insertion order. Empty when absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse {
    pub operation: OperationSnapshot,
    pub metadata: ResponseMetadata,
}

impl OperationResponse {
    pub fn new(operation: OperationSnapshot) -> Self {
        Self {
            operation,
            metadata: ResponseMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Status query for one backend family.
///
/// # Thread Safety
/// - `Send + Sync`: one client is shared by every handle of its family
/// - Implementations are expected to be stateless from our point of view
#[async_trait]
pub trait OperationServiceClient: Send + Sync {
    async fn get(&self, request: GetOperationRequest) -> Result<OperationResponse, Status>;
}

/// Routing table: at most one client per family.
///
/// Cloning is cheap (the clients are `Arc`s), so every handle keeps its
/// own copy.
#[derive(Clone, Default)]
pub struct OperationClients {
    clickhouse: Option<Arc<dyn OperationServiceClient>>,
    kafka: Option<Arc<dyn OperationServiceClient>>,
    transfer: Option<Arc<dyn OperationServiceClient>>,
    network: Option<Arc<dyn OperationServiceClient>>,
}

impl OperationClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clickhouse(mut self, client: Arc<dyn OperationServiceClient>) -> Self {
        self.clickhouse = Some(client);
        self
    }

    pub fn with_kafka(mut self, client: Arc<dyn OperationServiceClient>) -> Self {
        self.kafka = Some(client);
        self
    }

    pub fn with_transfer(mut self, client: Arc<dyn OperationServiceClient>) -> Self {
        self.transfer = Some(client);
        self
    }

    pub fn with_network(mut self, client: Arc<dyn OperationServiceClient>) -> Self {
        self.network = Some(client);
        self
    }

    pub fn client_for(&self, family: OperationFamily) -> Option<&Arc<dyn OperationServiceClient>> {
        match family {
            OperationFamily::Clickhouse => self.clickhouse.as_ref(),
            OperationFamily::Kafka => self.kafka.as_ref(),
            OperationFamily::Transfer => self.transfer.as_ref(),
            OperationFamily::Network => self.network.as_ref(),
            OperationFamily::Unknown => None,
        }
    }
}

impl std::fmt::Debug for OperationClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationClients")
            .field("clickhouse", &self.clickhouse.is_some())
            .field("kafka", &self.kafka.is_some())
            .field("transfer", &self.transfer.is_some())
            .field("network", &self.network.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverCalled;

    #[async_trait]
    impl OperationServiceClient for NeverCalled {
        async fn get(&self, _request: GetOperationRequest) -> Result<OperationResponse, Status> {
            Err(Status::unavailable("not wired"))
        }
    }

    #[test]
    fn metadata_lookup_is_case_insensitive() {
        let md = ResponseMetadata::new()
            .with("X-Operation-Poll-Interval", "5")
            .with(POLL_INTERVAL_METADATA_KEY, "7");

        assert_eq!(md.get(POLL_INTERVAL_METADATA_KEY), ["5", "7"]);
        assert_eq!(md.first("x-OPERATION-poll-interval"), Some("5"));
        assert!(md.get("missing").is_empty());
        assert_eq!(md.first("missing"), None);
    }

    #[test]
    fn clients_route_by_family() {
        let clients = OperationClients::new().with_kafka(Arc::new(NeverCalled));

        assert!(clients.client_for(OperationFamily::Kafka).is_some());
        assert!(clients.client_for(OperationFamily::Clickhouse).is_none());
        assert!(clients.client_for(OperationFamily::Unknown).is_none());
        assert_eq!(
            format!("{clients:?}"),
            "OperationClients { clickhouse: false, kafka: true, transfer: false, network: false }"
        );
    }
}
