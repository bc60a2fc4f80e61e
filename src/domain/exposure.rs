//! Computed exposure model: per-source breakdowns, per-project meta, portfolio result.

use crate::domain::{
    AmountError, EntityId, PortfolioSourceId, ProjectId, RelationSubtype, Share, Usd,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The asset side of a breakdown line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAsset {
    pub id: EntityId,
    pub symbol: String,
}

/// The holder side of a breakdown line (the protocol the value sits in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHolder {
    pub id: EntityId,
}

/// Which side of a breakdown line is the counted asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    Left,
    Right,
}

/// One auditable line of a per-source exposure breakdown.
///
/// `right == None` is a plain wallet balance; otherwise the value sits inside `right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExposureEntry {
    pub left: EntryAsset,
    pub left_value_usd: Usd,
    pub right: Option<EntryHolder>,
    pub mine: EntrySide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<RelationSubtype>,
}

/// Exposure of one portfolio source to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExposure {
    pub portfolio_source_id: PortfolioSourceId,
    pub total_usd: Usd,
    pub total_balance_usd: Usd,
    pub total_protocol_usd: Usd,
    pub entries: Vec<ProjectExposureEntry>,
}

/// Exposure of one project, across all sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExposureCompiled {
    pub exposure_usd: Usd,
    /// Filled in by the aggregator once the portfolio total is known.
    pub exposure_percentage_of_total: Share,
    /// Index-aligned with the portfolio source list.
    pub per_source_breakdown: Vec<ProjectExposure>,
}

/// Portfolio-wide totals of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceExposureTotals {
    pub portfolio_source_id: PortfolioSourceId,
    pub total_usd: Usd,
    pub total_balance_usd: Usd,
    pub total_protocol_usd: Usd,
}

impl SourceExposureTotals {
    pub fn new(portfolio_source_id: PortfolioSourceId) -> Self {
        Self {
            portfolio_source_id,
            total_usd: Usd::zero(),
            total_balance_usd: Usd::zero(),
            total_protocol_usd: Usd::zero(),
        }
    }

    /// Fold one project's exposure for this source into the running totals.
    ///
    /// Totals are left unchanged when any of the sums overflows.
    pub fn accumulate(&mut self, exposure: &ProjectExposure) -> Result<(), AmountError> {
        debug_assert_eq!(self.portfolio_source_id, exposure.portfolio_source_id);
        let total_usd = self.total_usd.checked_add(exposure.total_usd)?;
        let total_balance_usd = self
            .total_balance_usd
            .checked_add(exposure.total_balance_usd)?;
        let total_protocol_usd = self
            .total_protocol_usd
            .checked_add(exposure.total_protocol_usd)?;

        self.total_usd = total_usd;
        self.total_balance_usd = total_balance_usd;
        self.total_protocol_usd = total_protocol_usd;
        Ok(())
    }
}

/// How a project relates to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRelation {
    ActiveExposure,
    Interacted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPortfolioMeta {
    pub relation: ProjectRelation,
    /// Present only for `ActiveExposure`.
    pub exposure: Option<ProjectExposureCompiled>,
}

impl ProjectPortfolioMeta {
    pub fn active(exposure: ProjectExposureCompiled) -> Self {
        Self {
            relation: ProjectRelation::ActiveExposure,
            exposure: Some(exposure),
        }
    }

    pub fn interacted() -> Self {
        Self {
            relation: ProjectRelation::Interacted,
            exposure: None,
        }
    }

    /// Exposure in USD; projects without exposure count as zero.
    pub fn exposure_usd(&self) -> Usd {
        self.exposure
            .as_ref()
            .map(|e| e.exposure_usd)
            .unwrap_or_default()
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedPortfolio {
    pub total_exposure_usd: Usd,
    pub per_source_totals: Vec<SourceExposureTotals>,
    pub project_meta: BTreeMap<ProjectId, ProjectPortfolioMeta>,
}

impl ComputedPortfolio {
    /// Exposure-carrying projects in ascending id order.
    pub fn active_exposures(
        &self,
    ) -> impl Iterator<Item = (&ProjectId, &ProjectExposureCompiled)> + '_ {
        self.project_meta
            .iter()
            .filter_map(|(id, meta)| meta.exposure.as_ref().map(|e| (id, e)))
    }

    /// Whether the portfolio total, the per-source totals and the per-project
    /// exposures all agree.
    pub fn is_conserved(&self) -> bool {
        let by_source = Usd::checked_sum(self.per_source_totals.iter().map(|t| t.total_usd));
        let by_project = Usd::checked_sum(self.active_exposures().map(|(_, e)| e.exposure_usd));
        match (by_source, by_project) {
            (Ok(by_source), Ok(by_project)) => {
                self.total_exposure_usd == by_source && by_source == by_project
            }
            _ => false,
        }
    }
}
