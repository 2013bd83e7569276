//! Registry error types.

use shard_core::{StoreId, StoreState};
use thiserror::Error;

/// Errors returned when a registry update is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("store not found: {0}")]
    StoreNotFound(StoreId),

    #[error("store {0} is tombstoned")]
    StoreTombstoned(StoreId),

    #[error("address {address} already used by store {existing}")]
    DuplicateAddress { address: String, existing: StoreId },

    #[error("store {id}: invalid state transition {from} -> {to}")]
    InvalidTransition {
        id: StoreId,
        from: StoreState,
        to: StoreState,
    },

    #[error("snapshot version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
