//! Exposure cutoff deciding which projects count as active for feed purposes.

use crate::domain::{Share, Usd};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Cutoff rule, `{"kind": "absolute" | "percent", "value": number}` on the wire.
///
/// `Percent` compares against `exposurePercentageOfTotal`, so its value is a fraction
/// of the total (`0.05` is five percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Cutoff {
    Absolute(Usd),
    Percent(Share),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CutoffParseError {
    #[error("unknown cutoff kind {0:?}, expected absolute or percent")]
    UnknownKind(String),
    #[error("invalid cutoff value {0:?}")]
    InvalidValue(String),
}

impl Cutoff {
    /// Build a cutoff from its textual kind and value.
    pub fn parse(kind: &str, value: &str) -> Result<Self, CutoffParseError> {
        let invalid = |_| CutoffParseError::InvalidValue(value.to_string());
        match kind.trim().to_ascii_lowercase().as_str() {
            "absolute" => Usd::from_str(value.trim()).map(Cutoff::Absolute).map_err(invalid),
            "percent" => Share::from_str(value.trim())
                .map(Cutoff::Percent)
                .map_err(invalid),
            other => Err(CutoffParseError::UnknownKind(other.to_string())),
        }
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Cutoff::Absolute(Usd::zero())
    }
}
