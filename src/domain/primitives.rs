//! Identifier newtypes and tracked portfolio sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub i64);

impl ProjectId {
    pub fn new(id: i64) -> Self {
        ProjectId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a tracked portfolio source (e.g. a wallet address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortfolioSourceId(pub String);

impl PortfolioSourceId {
    pub fn new(id: impl Into<String>) -> Self {
        PortfolioSourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortfolioSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a financial entity: a token, a protocol, a protocol position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a content-feed source. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedSourceId(pub String);

impl FeedSourceId {
    pub fn new(id: impl Into<String>) -> Self {
        FeedSourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the evidence of a portfolio source comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortfolioSourceKind {
    Wallet,
    ExternalApi,
}

/// One tracked origin of financial evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortfolioSource {
    pub kind: PortfolioSourceKind,
    pub id: PortfolioSourceId,
}

impl PortfolioSource {
    pub fn new(kind: PortfolioSourceKind, id: PortfolioSourceId) -> Self {
        Self { kind, id }
    }

    pub fn wallet(address: impl Into<String>) -> Self {
        Self::new(PortfolioSourceKind::Wallet, PortfolioSourceId::new(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_source_kind_serialization() {
        let json = serde_json::to_string(&PortfolioSourceKind::ExternalApi).unwrap();
        assert_eq!(json, "\"external-api\"");

        let kind: PortfolioSourceKind = serde_json::from_str("\"wallet\"").unwrap();
        assert_eq!(kind, PortfolioSourceKind::Wallet);
    }

    #[test]
    fn test_portfolio_source_json_shape() {
        let source: PortfolioSource =
            serde_json::from_str(r#"{"kind":"wallet","id":"0xabc"}"#).unwrap();
        assert_eq!(source, PortfolioSource::wallet("0xabc"));
    }

    #[test]
    fn test_project_id_as_map_key() {
        let map: BTreeMap<ProjectId, String> =
            serde_json::from_str(r#"{"2":"b","10":"c","1":"a"}"#).unwrap();
        let keys: Vec<i64> = map.keys().map(ProjectId::as_i64).collect();
        assert_eq!(keys, vec![1, 2, 10]);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":"a","2":"b","10":"c"}"#);
    }

    #[test]
    fn test_project_id_ordering() {
        assert!(ProjectId::new(1) < ProjectId::new(2));
    }
}
