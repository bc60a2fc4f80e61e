//! Evidence linking a portfolio source to a project.

use crate::domain::{EntityId, PortfolioSourceId, ProjectId, Usd};
use serde::{Deserialize, Serialize};

/// Kind of a protocol sub-balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationSubtype {
    Supply,
    Reward,
}

/// One token held inside a protocol position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolToken {
    pub token_id: EntityId,
    pub subtype: RelationSubtype,
    pub symbol: String,
    pub balance_usd: Usd,
}

/// A single piece of evidence about how a source relates to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EntityRelation {
    /// Position inside a DeFi protocol, listed token by token.
    Protocol { tokens: Vec<ProtocolToken> },
    /// The same kind of sub-balance keyed by the protocol that holds it.
    BalanceInProtocol {
        protocol_id: EntityId,
        subtype: RelationSubtype,
        balance_usd: Usd,
        symbol: String,
    },
    /// Raw on-chain token balance.
    Balance { balance_usd: Usd, symbol: String },
    /// Historical interaction without a current balance.
    Transaction { id: String },
}

impl EntityRelation {
    pub fn is_protocol(&self) -> bool {
        matches!(self, EntityRelation::Protocol { .. })
    }

    /// Evidence that carries a dollar value.
    pub fn is_exposure(&self) -> bool {
        match self {
            EntityRelation::Protocol { .. }
            | EntityRelation::BalanceInProtocol { .. }
            | EntityRelation::Balance { .. } => true,
            EntityRelation::Transaction { .. } => false,
        }
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, EntityRelation::Transaction { .. })
    }
}

/// One financial entity with all its evidence for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    pub entity_id: EntityId,
    pub relations: Vec<EntityRelation>,
}

impl RelatedEntity {
    pub fn new(entity_id: EntityId, relations: Vec<EntityRelation>) -> Self {
        Self {
            entity_id,
            relations,
        }
    }

    pub fn has_protocol_relation(&self) -> bool {
        self.relations.iter().any(EntityRelation::is_protocol)
    }
}

/// A related entity tagged with the portfolio source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntityForPortfolioSource {
    pub portfolio_source_id: PortfolioSourceId,
    #[serde(flatten)]
    pub entity: RelatedEntity,
}

/// "This portfolio source is linked to this project via these entities."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedProjectLink {
    pub project_id: ProjectId,
    pub related_entities: Vec<RelatedEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_balance_relation_wire_format() {
        let relation: EntityRelation =
            serde_json::from_str(r#"{"type":"balance","balanceUsd":250,"symbol":"ABC"}"#)
                .unwrap();
        assert_eq!(
            relation,
            EntityRelation::Balance {
                balance_usd: Usd::from_str("250").unwrap(),
                symbol: "ABC".to_string(),
            }
        );
    }

    #[test]
    fn test_protocol_relation_wire_format() {
        let json = r#"{
            "type": "protocol",
            "tokens": [{"tokenId": "t1", "subtype": "supply", "symbol": "X", "balanceUsd": 50}]
        }"#;
        let relation: EntityRelation = serde_json::from_str(json).unwrap();
        match relation {
            EntityRelation::Protocol { tokens } => {
                assert_eq!(tokens.len(), 1);
                assert_eq!(tokens[0].token_id, EntityId::new("t1"));
                assert_eq!(tokens[0].subtype, RelationSubtype::Supply);
            }
            other => panic!("expected protocol relation, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_in_protocol_wire_format() {
        let json = r#"{
            "type": "balance_in_protocol",
            "protocolId": "aave",
            "subtype": "reward",
            "balanceUsd": 1.5,
            "symbol": "AAVE"
        }"#;
        let relation: EntityRelation = serde_json::from_str(json).unwrap();
        assert!(relation.is_exposure());
        assert!(!relation.is_protocol());

        let back = serde_json::to_value(&relation).unwrap();
        assert_eq!(back["type"], "balance_in_protocol");
        assert_eq!(back["protocolId"], "aave");
    }

    #[test]
    fn test_malformed_relation_is_rejected() {
        let missing_balance = r#"{"type":"balance","symbol":"ABC"}"#;
        assert!(serde_json::from_str::<EntityRelation>(missing_balance).is_err());

        let unknown_type = r#"{"type":"airdrop","id":"x"}"#;
        assert!(serde_json::from_str::<EntityRelation>(unknown_type).is_err());
    }

    #[test]
    fn test_transaction_is_not_exposure() {
        let relation = EntityRelation::Transaction {
            id: "0xhash".to_string(),
        };
        assert!(relation.is_transaction());
        assert!(!relation.is_exposure());
    }

    #[test]
    fn test_affected_project_link_wire_format() {
        let json = r#"{
            "projectId": 1,
            "relatedEntities": [
                {"entityId": "tokenA", "relations": [
                    {"type": "balance", "balanceUsd": 250, "symbol": "ABC"}
                ]}
            ]
        }"#;
        let link: AffectedProjectLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.project_id, ProjectId::new(1));
        assert_eq!(link.related_entities[0].entity_id, EntityId::new("tokenA"));
    }
}
