//! Compile pipeline turning evidence and settings into the visible feed view.
//!
//! This module provides:
//! - The bundled pipeline input and output types
//! - Content fingerprints of inputs, used as memoization keys
//! - The `Compiler` running index -> aggregate -> threshold -> source set -> ordering

use crate::domain::{
    ComputedPortfolio, Cutoff, FeedSourceId, PortfolioSource, ProjectId, SourceOverrides,
};
use crate::engine::{Evidence, PercentageBasis};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub mod pipeline;

pub use pipeline::Compiler;

/// Everything one recomputation depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    /// Ordered; the order fixes index alignment of per-source results.
    pub sources: Vec<PortfolioSource>,
    #[serde(default)]
    pub evidence: Evidence,
    #[serde(default)]
    pub cutoff: Cutoff,
    #[serde(default)]
    pub overrides: SourceOverrides,
    /// Display names used for ordering.
    #[serde(default)]
    pub project_names: BTreeMap<ProjectId, String>,
    #[serde(default)]
    pub percentage_basis: PercentageBasis,
    /// Inline project -> feed sources lookup, replacing the server catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_sources: Option<BTreeMap<ProjectId, Vec<FeedSourceId>>>,
}

/// Result of one recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOutput {
    pub portfolio: ComputedPortfolio,
    pub active_project_ids: Vec<ProjectId>,
    pub default_active_source_ids: BTreeSet<FeedSourceId>,
    pub effective_source_ids: BTreeSet<FeedSourceId>,
    /// Overrides pruned against the new default, ready to be persisted.
    pub overrides: SourceOverrides,
    pub ordered_project_ids: Vec<ProjectId>,
}

/// Content hash of a `PortfolioInput`.
///
/// Every map in the input is ordered, so the JSON encoding is canonical and equal
/// inputs always produce equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFingerprint(pub String);

impl InputFingerprint {
    pub fn of(input: &PortfolioInput) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_vec(input)?;
        let hash = Sha256::digest(&canonical);
        Ok(InputFingerprint(format!("sha256:{}", hex::encode(&hash[..16]))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
