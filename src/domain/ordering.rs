//! Stable project ordering for display and deterministic output.

use crate::domain::{ComputedPortfolio, ProjectId, Usd};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ordering key for a project.
///
/// Ordering: exposure_usd (descending) -> name (ascending, case-sensitive) -> project_id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOrderingKey {
    /// Exposure in USD; projects without exposure sort as zero.
    pub exposure_usd: Usd,
    /// Display name.
    pub name: String,
    /// Final tiebreak so two projects sharing a name still have a total order.
    pub project_id: ProjectId,
}

impl ProjectOrderingKey {
    pub fn new(project_id: ProjectId, name: impl Into<String>, exposure_usd: Usd) -> Self {
        Self {
            exposure_usd,
            name: name.into(),
            project_id,
        }
    }

    /// Key for a project of a computed portfolio.
    ///
    /// Falls back to the decimal project id when no display name is known.
    pub fn for_project(
        portfolio: &ComputedPortfolio,
        names: &BTreeMap<ProjectId, String>,
        project_id: ProjectId,
    ) -> Self {
        let exposure_usd = portfolio
            .project_meta
            .get(&project_id)
            .map(|meta| meta.exposure_usd())
            .unwrap_or_default();
        let name = names
            .get(&project_id)
            .cloned()
            .unwrap_or_else(|| project_id.to_string());
        Self::new(project_id, name, exposure_usd)
    }
}

impl Ord for ProjectOrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .exposure_usd
            .cmp(&self.exposure_usd)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.project_id.cmp(&other.project_id))
    }
}

impl PartialOrd for ProjectOrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// All projects of a computed portfolio, in display order.
pub fn ordered_project_ids(
    portfolio: &ComputedPortfolio,
    names: &BTreeMap<ProjectId, String>,
) -> Vec<ProjectId> {
    let mut keys: Vec<ProjectOrderingKey> = portfolio
        .project_meta
        .keys()
        .map(|id| ProjectOrderingKey::for_project(portfolio, names, *id))
        .collect();
    keys.sort();
    keys.into_iter().map(|key| key.project_id).collect()
}
