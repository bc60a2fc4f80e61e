//! Inverting per-source evidence into per-project evidence.

use super::Evidence;
use crate::domain::{
    PortfolioSource, PortfolioSourceId, ProjectId, RelatedEntityForPortfolioSource,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Per-project view of the evidence, every entity tagged with the source that produced it.
///
/// Entities of a project are listed in source order (the order of the source slice),
/// then link order, then entity order. Nothing is merged or dropped, so `sources`
/// must not repeat an id; `PortfolioAggregator` removes duplicates before indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceIndex {
    by_project: BTreeMap<ProjectId, Vec<RelatedEntityForPortfolioSource>>,
}

impl EvidenceIndex {
    pub fn new(sources: &[PortfolioSource], evidence: &Evidence) -> Self {
        let mut by_project: BTreeMap<ProjectId, Vec<RelatedEntityForPortfolioSource>> =
            BTreeMap::new();
        let tracked: BTreeSet<&PortfolioSourceId> = sources.iter().map(|s| &s.id).collect();

        for source in sources {
            let Some(links) = evidence.get(&source.id) else {
                continue;
            };
            for link in links {
                let tagged = by_project.entry(link.project_id).or_default();
                tagged.extend(link.related_entities.iter().map(|entity| {
                    RelatedEntityForPortfolioSource {
                        portfolio_source_id: source.id.clone(),
                        entity: entity.clone(),
                    }
                }));
            }
        }

        for source_id in evidence.keys().filter(|id| !tracked.contains(id)) {
            debug!(source = %source_id, "Evidence for untracked source not indexed");
        }

        Self { by_project }
    }

    /// `projectId -> entities`, in ascending project id order.
    pub fn by_project(&self) -> &BTreeMap<ProjectId, Vec<RelatedEntityForPortfolioSource>> {
        &self.by_project
    }

    pub fn entities_for(&self, project_id: ProjectId) -> &[RelatedEntityForPortfolioSource] {
        self.by_project
            .get(&project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn project_count(&self) -> usize {
        self.by_project.len()
    }
}
