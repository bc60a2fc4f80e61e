//! Feed-source set compilation and reconciliation with user overrides.

use crate::catalog::SourceCatalog;
use crate::domain::{FeedSourceId, ProjectId, SourceOverrides};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Final feed-source sets of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSet {
    /// Sources of every active project; recomputed on every run.
    pub default_active_source_ids: BTreeSet<FeedSourceId>,
    /// `(default ∪ included) \ excluded`.
    pub effective_source_ids: BTreeSet<FeedSourceId>,
    /// Overrides pruned against the new default, ready to be saved.
    pub overrides: SourceOverrides,
}

/// Apply overrides to a default set. Exclusion wins over inclusion.
pub fn effective_source_ids(
    default: &BTreeSet<FeedSourceId>,
    overrides: &SourceOverrides,
) -> BTreeSet<FeedSourceId> {
    default
        .union(&overrides.included_source_ids)
        .filter(|id| !overrides.excluded_source_ids.contains(*id))
        .cloned()
        .collect()
}

/// Drop override entries that no longer disagree with `default`.
///
/// The effective set computed from the pruned overrides is identical to the one
/// computed from the original overrides.
pub fn prune_overrides(
    default: &BTreeSet<FeedSourceId>,
    overrides: &SourceOverrides,
) -> SourceOverrides {
    let included_source_ids = overrides
        .included_source_ids
        .iter()
        .filter(|id| !default.contains(*id) && !overrides.excluded_source_ids.contains(*id))
        .cloned()
        .collect();
    let excluded_source_ids = overrides
        .excluded_source_ids
        .iter()
        .filter(|id| default.contains(*id))
        .cloned()
        .collect();

    SourceOverrides::new(included_source_ids, excluded_source_ids)
}

/// Maps active projects to feed sources through a catalog.
pub struct SourceSetCompiler<'a, C: SourceCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: SourceCatalog + ?Sized> SourceSetCompiler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub fn default_active_source_ids(
        &self,
        active_project_ids: &BTreeSet<ProjectId>,
    ) -> BTreeSet<FeedSourceId> {
        let mut ids = BTreeSet::new();
        for project_id in active_project_ids {
            let sources = self.catalog.source_ids_for(*project_id);
            if sources.is_empty() {
                debug!(project = %project_id, "No feed sources known for project");
            }
            ids.extend(sources);
        }
        ids
    }

    pub fn compile(
        &self,
        active_project_ids: &BTreeSet<ProjectId>,
        overrides: &SourceOverrides,
    ) -> SourceSet {
        let default_active_source_ids = self.default_active_source_ids(active_project_ids);
        let effective = effective_source_ids(&default_active_source_ids, overrides);
        let pruned = prune_overrides(&default_active_source_ids, overrides);

        debug_assert_eq!(
            effective,
            effective_source_ids(&default_active_source_ids, &pruned)
        );

        SourceSet {
            default_active_source_ids,
            effective_source_ids: effective,
            overrides: pruned,
        }
    }
}
