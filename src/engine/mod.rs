//! Pure computation engine(s) for deterministic exposure aggregation.
//!
//! Nothing in here performs I/O or keeps state between calls; every entry point
//! borrows its inputs and returns freshly allocated results.

use crate::domain::{AffectedProjectLink, PortfolioSourceId};
use std::collections::BTreeMap;

pub mod aggregator;
pub mod evidence_index;
pub mod exposure_calculator;
pub mod source_set;
pub mod threshold;

pub use aggregator::{classify, ExposureError, PercentageBasis, PortfolioAggregator};
pub use evidence_index::EvidenceIndex;
pub use exposure_calculator::{protocol_positions, ExposureCalculator, ProtocolPositionKey};
pub use source_set::{effective_source_ids, prune_overrides, SourceSet, SourceSetCompiler};
pub use threshold::ThresholdFilter;

/// Externally gathered evidence: `portfolioSourceId -> affected projects`.
pub type Evidence = BTreeMap<PortfolioSourceId, Vec<AffectedProjectLink>>;
