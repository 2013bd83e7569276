//! Shared types used across ShardGrid crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a store in the cluster.
pub type StoreId = u64;

/// Lifecycle state of a store.
///
/// Moves forward only: `Up -> Offline -> Tombstone`. Transitions are
/// decided by cluster management; this type just encodes which ones are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    #[default]
    Up,
    Offline,
    Tombstone,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreState::Up => "up",
            StoreState::Offline => "offline",
            StoreState::Tombstone => "tombstone",
        }
    }

    /// Whether a store in this state may move to `next`.
    ///
    /// Staying put is always allowed. `Up -> Tombstone` skips the offline
    /// phase (forced removal). Nothing leaves `Tombstone`.
    pub fn can_transition_to(&self, next: StoreState) -> bool {
        use StoreState::*;
        matches!(
            (*self, next),
            (Up, _) | (Offline, Offline) | (Offline, Tombstone) | (Tombstone, Tombstone)
        )
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown store state: {0}")]
pub struct ParseStoreStateError(pub String);

impl FromStr for StoreState {
    type Err = ParseStoreStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(StoreState::Up),
            "offline" => Ok(StoreState::Offline),
            "tombstone" => Ok(StoreState::Tombstone),
            _ => Err(ParseStoreStateError(s.to_string())),
        }
    }
}

/// A single key/value label attached to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLabel {
    pub key: String,
    pub value: String,
}

impl StoreLabel {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Identity of a store as registered with the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreMeta {
    pub id: StoreId,
    /// Network address the store serves on (host:port).
    pub address: String,
    /// Software version reported at registration.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub state: StoreState,
    /// Ordered labels. Keys are not guaranteed unique.
    #[serde(default)]
    pub labels: Vec<StoreLabel>,
}

impl StoreMeta {
    pub fn new(id: StoreId, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(StoreLabel::new(key, value));
        self
    }

    pub fn with_state(mut self, state: StoreState) -> Self {
        self.state = state;
        self
    }
}
