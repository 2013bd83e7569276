//! Resource kinds the balancer can ask a store about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which per-store counter a scoring call resolves to.
///
/// Closed on purpose: every dispatch site matches exhaustively, so a new
/// kind cannot be added without deciding how each site scores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Leader,
    Region,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Leader, ResourceKind::Region];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Leader => "leader",
            ResourceKind::Region => "region",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resource kind: {0} (expected leader or region)")]
pub struct ParseResourceKindError(pub String);

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leader" => Ok(ResourceKind::Leader),
            "region" => Ok(ResourceKind::Region),
            _ => Err(ParseResourceKindError(s.to_string())),
        }
    }
}
