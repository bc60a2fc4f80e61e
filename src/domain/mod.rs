//! Domain types for portfolio exposure aggregation.
//!
//! This module provides:
//! - Lossless USD amounts and portfolio shares (`Usd`, `Share`)
//! - Identifier newtypes and tracked portfolio sources
//! - Evidence relations as an exhaustive sum type
//! - The computed exposure model and the cutoff rule
//! - Stable project ordering key for deterministic output

pub mod amount;
pub mod cutoff;
pub mod exposure;
pub mod ordering;
pub mod overrides;
pub mod primitives;
pub mod relation;

pub use amount::{AmountError, Share, Usd};
pub use cutoff::{Cutoff, CutoffParseError};
pub use exposure::{
    ComputedPortfolio, EntryAsset, EntryHolder, EntrySide, ProjectExposure,
    ProjectExposureCompiled, ProjectExposureEntry, ProjectPortfolioMeta, ProjectRelation,
    SourceExposureTotals,
};
pub use ordering::{ordered_project_ids, ProjectOrderingKey};
pub use overrides::SourceOverrides;
pub use primitives::{
    EntityId, FeedSourceId, PortfolioSource, PortfolioSourceId, PortfolioSourceKind, ProjectId,
};
pub use relation::{
    AffectedProjectLink, EntityRelation, ProtocolToken, RelatedEntity,
    RelatedEntityForPortfolioSource, RelationSubtype,
};
