//! Feed catalog abstraction: which feed sources belong to which project.

use crate::domain::{FeedSourceId, ProjectId};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Lookup of the feed sources known to belong to a project.
///
/// Unknown projects return an empty list; the catalog may simply not be loaded yet.
pub trait SourceCatalog: Send + Sync {
    fn source_ids_for(&self, project_id: ProjectId) -> Vec<FeedSourceId>;
}

impl<F> SourceCatalog for F
where
    F: Fn(ProjectId) -> Vec<FeedSourceId> + Send + Sync,
{
    fn source_ids_for(&self, project_id: ProjectId) -> Vec<FeedSourceId> {
        self(project_id)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file {path} unreadable: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory catalog, `{"<projectId>": ["<sourceId>", ...]}` in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    projects: BTreeMap<ProjectId, Vec<FeedSourceId>>,
}

impl StaticCatalog {
    pub fn new(projects: BTreeMap<ProjectId, Vec<FeedSourceId>>) -> Self {
        Self { projects }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}

impl SourceCatalog for StaticCatalog {
    fn source_ids_for(&self, project_id: ProjectId) -> Vec<FeedSourceId> {
        self.projects.get(&project_id).cloned().unwrap_or_default()
    }
}
