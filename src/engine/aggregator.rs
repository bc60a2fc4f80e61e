//! Portfolio-wide aggregation of per-project exposure.

use super::{Evidence, EvidenceIndex, ExposureCalculator};
use crate::domain::{
    AmountError, ComputedPortfolio, PortfolioSource, ProjectId, ProjectPortfolioMeta,
    ProjectRelation, RelatedEntityForPortfolioSource, SourceExposureTotals, Usd,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Evidence whose dollar values cannot be aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExposureError {
    #[error("exposure of project {project_id} out of range: {source}")]
    Project {
        project_id: ProjectId,
        source: AmountError,
    },
    #[error("portfolio total out of range: {0}")]
    Portfolio(#[source] AmountError),
}

/// Denominator used for `exposurePercentageOfTotal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PercentageBasis {
    /// Total exposure of the sources being aggregated.
    #[default]
    Computed,
    /// Caller-supplied total, e.g. the full tracked portfolio while previewing a
    /// single candidate wallet.
    Explicit(Usd),
}

/// Classify a project by the kinds of evidence it carries.
///
/// Exposure evidence wins over transactions; `None` means no relation at all.
pub fn classify(entities: &[RelatedEntityForPortfolioSource]) -> Option<ProjectRelation> {
    let relations = || entities.iter().flat_map(|e| e.entity.relations.iter());

    if relations().any(|r| r.is_exposure()) {
        Some(ProjectRelation::ActiveExposure)
    } else if relations().any(|r| r.is_transaction()) {
        Some(ProjectRelation::Interacted)
    } else {
        None
    }
}

/// Drives the exposure calculator across every project with evidence.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    sources: Vec<PortfolioSource>,
    basis: PercentageBasis,
}

impl PortfolioAggregator {
    pub fn new(sources: &[PortfolioSource]) -> Self {
        let mut seen = BTreeSet::new();
        let sources = sources
            .iter()
            .filter(|source| {
                let first = seen.insert(source.id.clone());
                if !first {
                    warn!(source = %source.id, "Duplicate portfolio source ignored");
                }
                first
            })
            .cloned()
            .collect();

        Self {
            sources,
            basis: PercentageBasis::Computed,
        }
    }

    pub fn with_basis(mut self, basis: PercentageBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Sources considered, duplicates removed, in input order.
    pub fn sources(&self) -> &[PortfolioSource] {
        &self.sources
    }

    pub fn aggregate(&self, evidence: &Evidence) -> Result<ComputedPortfolio, ExposureError> {
        let index = EvidenceIndex::new(&self.sources, evidence);
        self.aggregate_index(&index)
    }

    pub fn aggregate_index(
        &self,
        index: &EvidenceIndex,
    ) -> Result<ComputedPortfolio, ExposureError> {
        let calculator = ExposureCalculator::new(&self.sources);
        let mut per_source_totals: Vec<SourceExposureTotals> = self
            .sources
            .iter()
            .map(|source| SourceExposureTotals::new(source.id.clone()))
            .collect();
        let mut project_meta = BTreeMap::new();

        for (project_id, entities) in index.by_project() {
            let out_of_range = |source| ExposureError::Project {
                project_id: *project_id,
                source,
            };
            match classify(entities) {
                Some(ProjectRelation::ActiveExposure) => {
                    let exposure = calculator.compute(entities).map_err(out_of_range)?;
                    for (totals, source_exposure) in per_source_totals
                        .iter_mut()
                        .zip(&exposure.per_source_breakdown)
                    {
                        totals.accumulate(source_exposure).map_err(out_of_range)?;
                    }
                    debug!(
                        project = %project_id,
                        exposure_usd = %exposure.exposure_usd,
                        "Active exposure"
                    );
                    project_meta.insert(*project_id, ProjectPortfolioMeta::active(exposure));
                }
                Some(ProjectRelation::Interacted) => {
                    debug!(project = %project_id, "Interacted");
                    project_meta.insert(*project_id, ProjectPortfolioMeta::interacted());
                }
                None => {
                    debug!(project = %project_id, "No relation, omitted");
                }
            }
        }

        let total_exposure_usd = Usd::checked_sum(per_source_totals.iter().map(|t| t.total_usd))
            .map_err(ExposureError::Portfolio)?;

        let denominator = match self.basis {
            PercentageBasis::Computed => total_exposure_usd,
            PercentageBasis::Explicit(total) => total,
        };
        if denominator.is_zero() {
            debug!("Zero percentage denominator, all shares are zero");
        } else if denominator < total_exposure_usd {
            warn!(
                denominator = %denominator,
                total = %total_exposure_usd,
                "Explicit percentage basis below aggregated total"
            );
        }

        for (project_id, meta) in project_meta.iter_mut() {
            if let Some(exposure) = meta.exposure.as_mut() {
                exposure.exposure_percentage_of_total = exposure
                    .exposure_usd
                    .share_of(denominator)
                    .map_err(|source| ExposureError::Project {
                        project_id: *project_id,
                        source,
                    })?;
            }
        }

        let portfolio = ComputedPortfolio {
            total_exposure_usd,
            per_source_totals,
            project_meta,
        };
        debug_assert!(portfolio.is_conserved(), "exposure totals disagree");
        Ok(portfolio)
    }
}
