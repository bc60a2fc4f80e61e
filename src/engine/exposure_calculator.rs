//! Per-project USD exposure, broken down by portfolio source.

use crate::domain::{
    AmountError, EntityId, EntityRelation, EntryAsset, EntryHolder, EntrySide, PortfolioSource,
    PortfolioSourceId, ProjectExposure, ProjectExposureCompiled, ProjectExposureEntry,
    RelatedEntity, RelatedEntityForPortfolioSource, Share, Usd,
};
use std::collections::BTreeSet;

/// A position inside a protocol: the protocol entity and the asset it holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolPositionKey {
    pub protocol_id: EntityId,
    pub asset_id: EntityId,
}

impl ProtocolPositionKey {
    pub fn new(protocol_id: EntityId, asset_id: EntityId) -> Self {
        Self {
            protocol_id,
            asset_id,
        }
    }
}

/// Computes one project's exposure for an ordered list of portfolio sources.
pub struct ExposureCalculator<'a> {
    sources: &'a [PortfolioSource],
}

impl<'a> ExposureCalculator<'a> {
    pub fn new(sources: &'a [PortfolioSource]) -> Self {
        Self { sources }
    }

    /// Compute the exposure of one project from its joined entity list.
    ///
    /// `exposure_percentage_of_total` is left at zero; the aggregator fills it in once
    /// the portfolio total is known. The breakdown is index-aligned with the sources.
    pub fn compute(
        &self,
        entities: &[RelatedEntityForPortfolioSource],
    ) -> Result<ProjectExposureCompiled, AmountError> {
        let per_source_breakdown = self
            .sources
            .iter()
            .map(|source| source_exposure(&source.id, entities))
            .collect::<Result<Vec<ProjectExposure>, _>>()?;

        let exposure_usd = Usd::checked_sum(per_source_breakdown.iter().map(|e| e.total_usd))?;

        Ok(ProjectExposureCompiled {
            exposure_usd,
            exposure_percentage_of_total: Share::zero(),
            per_source_breakdown,
        })
    }
}

/// Positions already counted through a `protocol` relation.
///
/// Must be complete before any `balance_in_protocol` relation is evaluated.
pub fn protocol_positions(protocol_entities: &[&RelatedEntity]) -> BTreeSet<ProtocolPositionKey> {
    protocol_entities
        .iter()
        .flat_map(|entity| {
            entity.relations.iter().flat_map(move |relation| match relation {
                EntityRelation::Protocol { tokens } => tokens
                    .iter()
                    .map(|token| {
                        ProtocolPositionKey::new(entity.entity_id.clone(), token.token_id.clone())
                    })
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
        })
        .collect()
}

fn source_exposure(
    source_id: &PortfolioSourceId,
    entities: &[RelatedEntityForPortfolioSource],
) -> Result<ProjectExposure, AmountError> {
    let (protocol_entities, other_entities): (Vec<&RelatedEntity>, Vec<&RelatedEntity>) = entities
        .iter()
        .filter(|tagged| tagged.portfolio_source_id == *source_id)
        .map(|tagged| &tagged.entity)
        .partition(|entity| entity.has_protocol_relation());

    let already_counted = protocol_positions(&protocol_entities);

    let mut entries = Vec::new();
    let mut total_protocol_usd = Usd::zero();
    let mut total_balance_usd = Usd::zero();

    for entity in &protocol_entities {
        for relation in &entity.relations {
            let EntityRelation::Protocol { tokens } = relation else {
                continue;
            };
            for token in tokens {
                total_protocol_usd = total_protocol_usd.checked_add(token.balance_usd)?;
                entries.push(ProjectExposureEntry {
                    left: EntryAsset {
                        id: token.token_id.clone(),
                        symbol: token.symbol.clone(),
                    },
                    left_value_usd: token.balance_usd,
                    right: Some(EntryHolder {
                        id: entity.entity_id.clone(),
                    }),
                    mine: EntrySide::Right,
                    subtype: Some(token.subtype),
                });
            }
        }
    }

    let in_encounter_order = || protocol_entities.iter().chain(other_entities.iter());

    for entity in in_encounter_order() {
        for relation in &entity.relations {
            let EntityRelation::Balance {
                balance_usd,
                symbol,
            } = relation
            else {
                continue;
            };
            total_balance_usd = total_balance_usd.checked_add(*balance_usd)?;
            entries.push(ProjectExposureEntry {
                left: EntryAsset {
                    id: entity.entity_id.clone(),
                    symbol: symbol.clone(),
                },
                left_value_usd: *balance_usd,
                right: None,
                mine: EntrySide::Left,
                subtype: None,
            });
        }
    }

    for entity in in_encounter_order() {
        for relation in &entity.relations {
            let EntityRelation::BalanceInProtocol {
                protocol_id,
                subtype,
                balance_usd,
                symbol,
            } = relation
            else {
                continue;
            };
            let key = ProtocolPositionKey::new(protocol_id.clone(), entity.entity_id.clone());
            if already_counted.contains(&key) {
                continue;
            }
            total_protocol_usd = total_protocol_usd.checked_add(*balance_usd)?;
            entries.push(ProjectExposureEntry {
                left: EntryAsset {
                    id: entity.entity_id.clone(),
                    symbol: symbol.clone(),
                },
                left_value_usd: *balance_usd,
                right: Some(EntryHolder {
                    id: protocol_id.clone(),
                }),
                mine: EntrySide::Left,
                subtype: Some(*subtype),
            });
        }
    }

    Ok(ProjectExposure {
        portfolio_source_id: source_id.clone(),
        total_usd: total_balance_usd.checked_add(total_protocol_usd)?,
        total_balance_usd,
        total_protocol_usd,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProtocolToken, RelationSubtype};
    use std::str::FromStr;

    fn usd(s: &str) -> Usd {
        Usd::from_str(s).unwrap()
    }

    fn tagged(
        source: &str,
        entity: &str,
        relations: Vec<EntityRelation>,
    ) -> RelatedEntityForPortfolioSource {
        RelatedEntityForPortfolioSource {
            portfolio_source_id: PortfolioSourceId::new(source),
            entity: RelatedEntity::new(EntityId::new(entity), relations),
        }
    }

    fn balance(value: &str, symbol: &str) -> EntityRelation {
        EntityRelation::Balance {
            balance_usd: usd(value),
            symbol: symbol.to_string(),
        }
    }

    fn protocol(tokens: &[(&str, &str, &str)]) -> EntityRelation {
        EntityRelation::Protocol {
            tokens: tokens
                .iter()
                .map(|(id, symbol, value)| ProtocolToken {
                    token_id: EntityId::new(*id),
                    subtype: RelationSubtype::Supply,
                    symbol: symbol.to_string(),
                    balance_usd: usd(value),
                })
                .collect(),
        }
    }

    fn in_protocol(protocol_id: &str, value: &str, symbol: &str) -> EntityRelation {
        EntityRelation::BalanceInProtocol {
            protocol_id: EntityId::new(protocol_id),
            subtype: RelationSubtype::Supply,
            balance_usd: usd(value),
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn test_plain_balance() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![tagged("W", "tokenA", vec![balance("250", "ABC")])];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        assert_eq!(compiled.exposure_usd, usd("250"));
        assert!(compiled.exposure_percentage_of_total.is_zero());

        let w = &compiled.per_source_breakdown[0];
        assert_eq!(w.total_balance_usd, usd("250"));
        assert_eq!(w.total_protocol_usd, Usd::zero());
        assert_eq!(w.entries.len(), 1);
        assert_eq!(w.entries[0].right, None);
        assert_eq!(w.entries[0].mine, EntrySide::Left);
    }

    #[test]
    fn test_same_entity_protocol_and_balance_in_protocol_counted_once() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![tagged(
            "W",
            "t1",
            vec![protocol(&[("t1", "X", "50")]), in_protocol("t1", "50", "X")],
        )];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        let w = &compiled.per_source_breakdown[0];
        assert_eq!(w.total_protocol_usd, usd("50"));
        assert_eq!(w.entries.len(), 1);
    }

    #[test]
    fn test_cross_entity_dedup_regardless_of_order() {
        // The token entity comes first, the protocol entity listing it second.
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![
            tagged("W", "usdc", vec![in_protocol("aave", "100", "USDC")]),
            tagged("W", "aave", vec![protocol(&[("usdc", "USDC", "100")])]),
        ];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        let w = &compiled.per_source_breakdown[0];
        assert_eq!(w.total_protocol_usd, usd("100"));
        assert_eq!(w.total_usd, usd("100"));

        let entry = &w.entries[0];
        assert_eq!(entry.left.id, EntityId::new("usdc"));
        assert_eq!(entry.right.as_ref().map(|r| r.id.clone()), Some(EntityId::new("aave")));
        assert_eq!(entry.mine, EntrySide::Right);
    }

    #[test]
    fn test_balance_in_other_protocol_is_counted() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![
            tagged("W", "aave", vec![protocol(&[("usdc", "USDC", "100")])]),
            tagged("W", "usdc", vec![in_protocol("compound", "40", "USDC")]),
        ];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        assert_eq!(compiled.per_source_breakdown[0].total_protocol_usd, usd("140"));
    }

    #[test]
    fn test_balances_never_deduplicated() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![tagged(
            "W",
            "aave",
            vec![protocol(&[("usdc", "USDC", "100")]), balance("10", "AAVE")],
        )];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        let w = &compiled.per_source_breakdown[0];
        assert_eq!(w.total_protocol_usd, usd("100"));
        assert_eq!(w.total_balance_usd, usd("10"));
        assert_eq!(w.total_usd, usd("110"));
    }

    #[test]
    fn test_ignore_set_is_per_source() {
        let sources = vec![PortfolioSource::wallet("A"), PortfolioSource::wallet("B")];
        let entities = vec![
            tagged("A", "aave", vec![protocol(&[("usdc", "USDC", "100")])]),
            tagged("B", "usdc", vec![in_protocol("aave", "30", "USDC")]),
        ];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        assert_eq!(compiled.per_source_breakdown[0].total_usd, usd("100"));
        assert_eq!(compiled.per_source_breakdown[1].total_usd, usd("30"));
        assert_eq!(compiled.exposure_usd, usd("130"));
    }

    #[test]
    fn test_entry_order_protocol_then_balance_then_in_protocol() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![
            tagged("W", "plain", vec![balance("1", "P"), in_protocol("curve", "2", "P")]),
            tagged("W", "aave", vec![protocol(&[("dai", "DAI", "3")])]),
        ];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        let sides: Vec<(String, Option<String>)> = compiled.per_source_breakdown[0]
            .entries
            .iter()
            .map(|e| (e.left.id.to_string(), e.right.as_ref().map(|r| r.id.to_string())))
            .collect();
        assert_eq!(
            sides,
            vec![
                ("dai".to_string(), Some("aave".to_string())),
                ("plain".to_string(), None),
                ("plain".to_string(), Some("curve".to_string())),
            ]
        );
    }

    #[test]
    fn test_source_without_evidence_has_empty_breakdown() {
        let sources = vec![PortfolioSource::wallet("A"), PortfolioSource::wallet("B")];
        let entities = vec![tagged("A", "tokenA", vec![balance("5", "A")])];

        let compiled = ExposureCalculator::new(&sources).compute(&entities).unwrap();
        assert_eq!(compiled.per_source_breakdown.len(), 2);
        assert_eq!(
            compiled.per_source_breakdown[1].portfolio_source_id,
            PortfolioSourceId::new("B")
        );
        assert!(compiled.per_source_breakdown[1].total_usd.is_zero());
        assert!(compiled.per_source_breakdown[1].entries.is_empty());
    }

    #[test]
    fn test_out_of_range_total_is_error() {
        let sources = vec![PortfolioSource::wallet("W")];
        let entities = vec![
            tagged("W", "a", vec![balance("50000000000000000000000000000", "A")]),
            tagged("W", "b", vec![balance("50000000000000000000000000000", "B")]),
        ];

        let result = ExposureCalculator::new(&sources).compute(&entities);
        assert!(matches!(result, Err(AmountError::AdditionOverflow(_, _))));
    }

    #[test]
    fn test_protocol_positions_key_is_typed_pair() {
        // "a:b" + "c" and "a" + "b:c" would collide as joined strings.
        let first = RelatedEntity::new(EntityId::new("a:b"), vec![protocol(&[("c", "C", "1")])]);
        let second = RelatedEntity::new(EntityId::new("a"), vec![protocol(&[("b:c", "C", "1")])]);
        let keys = protocol_positions(&[&first, &second]);
        assert_eq!(keys.len(), 2);
    }
}
