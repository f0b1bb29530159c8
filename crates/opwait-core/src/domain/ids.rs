//! Operation identifiers and family classification.
//!
//! An operation id is opaque to the client, but its shape tells us which
//! backend service owns it:
//! - `cho...` は ClickHouse、`kfo...` は Kafka
//! - `dtj...` / `dte...` は Transfer（jobs と endpoints）
//! - 接頭辞なしの UUID は Network
//!
//! Classification is an ordered table evaluated top to bottom; the first
//! matching rule wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const CLICKHOUSE_OPERATION_PREFIX: &str = "cho";
pub const KAFKA_OPERATION_PREFIX: &str = "kfo";
pub const TRANSFER_OPERATION_PREFIX: &str = "dtj";
pub const TRANSFER_ENDPOINTS_OPERATION_PREFIX: &str = "dte";

/// Identifier of a remote operation.
///
/// Assigned by the backend and stable for the whole lifetime of the
/// operation. There is no setter: a new id means a new operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Which backend service answers status queries for this id.
    pub fn family(&self) -> OperationFamily {
        OperationFamily::classify(&self.0)
    }
}

impl AsRef<str> for OperationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OperationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend service family an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationFamily {
    Clickhouse,
    Kafka,
    Transfer,
    Network,
    /// No rule matched; nothing can be queried for this id.
    Unknown,
}

type Rule = (fn(&str) -> bool, OperationFamily);

fn is_clickhouse(id: &str) -> bool {
    id.starts_with(CLICKHOUSE_OPERATION_PREFIX)
}

fn is_kafka(id: &str) -> bool {
    id.starts_with(KAFKA_OPERATION_PREFIX)
}

fn is_transfer(id: &str) -> bool {
    id.starts_with(TRANSFER_OPERATION_PREFIX)
}

fn is_transfer_endpoints(id: &str) -> bool {
    id.starts_with(TRANSFER_ENDPOINTS_OPERATION_PREFIX)
}

fn is_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

// Order matters: prefixes are checked before the UUID fallback.
const RULES: &[Rule] = &[
    (is_clickhouse, OperationFamily::Clickhouse),
    (is_kafka, OperationFamily::Kafka),
    (is_transfer, OperationFamily::Transfer),
    (is_transfer_endpoints, OperationFamily::Transfer),
    (is_uuid, OperationFamily::Network),
];

impl OperationFamily {
    /// Classify a raw identifier.
    pub fn classify(id: &str) -> Self {
        RULES
            .iter()
            .find(|(matches, _)| matches(id))
            .map(|(_, family)| *family)
            .unwrap_or(OperationFamily::Unknown)
    }

    pub fn is_known(self) -> bool {
        self != OperationFamily::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationFamily::Clickhouse => "clickhouse",
            OperationFamily::Kafka => "kafka",
            OperationFamily::Transfer => "transfer",
            OperationFamily::Network => "network",
            OperationFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OperationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cho4f2kq1b0a9c7e", OperationFamily::Clickhouse)]
    #[case("kfo1s0m3t8h1n9g2", OperationFamily::Kafka)]
    #[case("dtjq7ce2ub4lu0h3", OperationFamily::Transfer)]
    #[case("dte9hl0mb5v4kd6a", OperationFamily::Transfer)]
    #[case("6f1c9e3a-7b2d-4c8e-9a10-2f5b3c4d5e6f", OperationFamily::Network)]
    #[case("6F1C9E3A7B2D4C8E9A102F5B3C4D5E6F", OperationFamily::Network)]
    #[case("xyz123", OperationFamily::Unknown)]
    #[case("", OperationFamily::Unknown)]
    #[case("ch", OperationFamily::Unknown)]
    fn classify_by_prefix_then_uuid(#[case] id: &str, #[case] expected: OperationFamily) {
        assert_eq!(OperationFamily::classify(id), expected);
        assert_eq!(OperationId::new(id).family(), expected);
    }

    #[test]
    fn prefix_wins_over_uuid_shape() {
        // "cho" 始まりでも UUID としてはパースできない形なので prefix 判定のみが効く
        let id = OperationId::new("cho00000-0000-0000-0000-000000000000");
        assert_eq!(id.family(), OperationFamily::Clickhouse);
    }

    #[test]
    fn operation_id_is_serialized_transparently() {
        let id = OperationId::new("kfo123");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"kfo123\"");

        let back: OperationId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "kfo123");
    }

    #[test]
    fn unknown_family_is_not_known() {
        assert!(!OperationFamily::Unknown.is_known());
        assert!(OperationFamily::Network.is_known());
        assert_eq!(OperationFamily::Transfer.to_string(), "transfer");
    }
}
