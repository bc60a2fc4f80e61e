//! Cutoff filtering of projects for feed visibility.

use crate::domain::{ComputedPortfolio, Cutoff, ProjectId, ProjectPortfolioMeta};
use std::collections::BTreeSet;

/// Decides which projects count as active under a cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFilter {
    cutoff: Cutoff,
}

impl ThresholdFilter {
    pub fn new(cutoff: Cutoff) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Check if a project is active.
    ///
    /// Projects without exposure (interaction only) are never filtered by a
    /// monetary cutoff.
    pub fn is_active(&self, meta: &ProjectPortfolioMeta) -> bool {
        let Some(exposure) = meta.exposure.as_ref() else {
            return true;
        };
        match self.cutoff {
            Cutoff::Absolute(min_usd) => exposure.exposure_usd > min_usd,
            Cutoff::Percent(min_share) => exposure.exposure_percentage_of_total > min_share,
        }
    }

    /// Active project ids, ascending.
    pub fn active_project_ids(&self, portfolio: &ComputedPortfolio) -> BTreeSet<ProjectId> {
        portfolio
            .project_meta
            .iter()
            .filter(|(_, meta)| self.is_active(meta))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProjectExposureCompiled, Share, Usd};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn active(exposure: &str, share: &str) -> ProjectPortfolioMeta {
        ProjectPortfolioMeta::active(ProjectExposureCompiled {
            exposure_usd: Usd::from_str(exposure).unwrap(),
            exposure_percentage_of_total: Share::from_str(share).unwrap(),
            per_source_breakdown: vec![],
        })
    }

    fn portfolio(metas: Vec<(i64, ProjectPortfolioMeta)>) -> ComputedPortfolio {
        ComputedPortfolio {
            total_exposure_usd: Usd::zero(),
            per_source_totals: vec![],
            project_meta: metas
                .into_iter()
                .map(|(id, meta)| (ProjectId::new(id), meta))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn absolute(v: &str) -> Cutoff {
        Cutoff::Absolute(Usd::from_str(v).unwrap())
    }

    #[test]
    fn test_absolute_cutoff_is_strict() {
        let filter = ThresholdFilter::new(absolute("100"));
        assert!(filter.is_active(&active("100.01", "0")));
        assert!(!filter.is_active(&active("100", "0")));
    }

    #[test]
    fn test_percent_cutoff() {
        let filter = ThresholdFilter::new(Cutoff::Percent(Share::from_str("0.05").unwrap()));
        assert!(filter.is_active(&active("1", "0.06")));
        assert!(!filter.is_active(&active("1000000", "0.05")));
    }

    #[test]
    fn test_interacted_always_active() {
        let filter = ThresholdFilter::new(absolute("1000000000"));
        assert!(filter.is_active(&ProjectPortfolioMeta::interacted()));
    }

    #[test]
    fn test_active_project_ids_deterministic() {
        let p = portfolio(vec![
            (3, active("500", "0.5")),
            (1, active("50", "0.05")),
            (2, ProjectPortfolioMeta::interacted()),
        ]);
        let filter = ThresholdFilter::new(absolute("100"));
        let ids: Vec<i64> = filter
            .active_project_ids(&p)
            .into_iter()
            .map(|id| id.as_i64())
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(filter.active_project_ids(&p), filter.active_project_ids(&p));
    }
}
