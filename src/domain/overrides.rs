//! User-authored feed-source overrides.

use crate::domain::FeedSourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Manual include/exclude choices layered on top of the computed default set.
///
/// Long-lived: persisted by the caller and reconciled against every new default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOverrides {
    #[serde(default)]
    pub included_source_ids: BTreeSet<FeedSourceId>,
    #[serde(default)]
    pub excluded_source_ids: BTreeSet<FeedSourceId>,
}

impl SourceOverrides {
    pub fn new(
        included_source_ids: BTreeSet<FeedSourceId>,
        excluded_source_ids: BTreeSet<FeedSourceId>,
    ) -> Self {
        Self {
            included_source_ids,
            excluded_source_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.included_source_ids.is_empty() && self.excluded_source_ids.is_empty()
    }

    /// Minimal overrides turning `default` into the user's chosen visible set.
    pub fn from_selection(
        default: &BTreeSet<FeedSourceId>,
        selected: &BTreeSet<FeedSourceId>,
    ) -> Self {
        Self {
            included_source_ids: selected.difference(default).cloned().collect(),
            excluded_source_ids: default.difference(selected).cloned().collect(),
        }
    }
}
