//! Versioned copy-on-write snapshots.
//!
//! A [`SnapshotCell`] owns the current value behind an `Arc`. Readers
//! `load()` a [`Snapshot`] (an `Arc` clone plus a version) and never see
//! it change. Writers never touch a published value: they clone it, edit
//! the clone, and swap it in with a version bump.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{RegistryError, RegistryResult};

/// An immutable, versioned view of a published value.
pub struct Snapshot<T> {
    version: u64,
    value: Arc<T>,
}

impl<T> Snapshot<T> {
    /// Monotonic publish counter of the owning cell; starts at 1.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether both snapshots point at the same published value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("value", &*self.value)
            .finish()
    }
}

/// Slot holding the current snapshot of a value.
///
/// The lock guards only the pointer swap; cloning and editing happen
/// outside it, so readers are never held up by a writer's work.
pub struct SnapshotCell<T> {
    current: RwLock<Snapshot<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Snapshot {
                version: 1,
                value: Arc::new(value),
            }),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Snapshot<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Unconditionally install `value` as the new snapshot.
    pub fn publish(&self, value: T) -> Snapshot<T> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Snapshot {
            version: current.version + 1,
            value: Arc::new(value),
        };
        current.clone()
    }

    /// Install `value` only if nothing was published since `expected`.
    pub fn compare_and_publish(&self, expected: u64, value: T) -> RegistryResult<Snapshot<T>> {
        self.swap_if(expected, value)
            .map_err(|actual| RegistryError::VersionConflict { expected, actual })
    }

    fn swap_if(&self, expected: u64, value: T) -> Result<Snapshot<T>, u64> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.version != expected {
            return Err(current.version);
        }
        *current = Snapshot {
            version: expected + 1,
            value: Arc::new(value),
        };
        Ok(current.clone())
    }
}

impl<T: Clone> SnapshotCell<T> {
    /// Clone the current value, apply `edit` to the private copy, publish.
    ///
    /// If another writer publishes in between, the edit is retried on the
    /// newer value. `edit` returning `Err` aborts without publishing.
    pub fn update<E>(&self, mut edit: impl FnMut(&mut T) -> Result<(), E>) -> Result<Snapshot<T>, E> {
        loop {
            let base = self.load();
            let mut next = T::clone(&base);
            edit(&mut next)?;
            if let Ok(published) = self.swap_if(base.version, next) {
                return Ok(published);
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SnapshotCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCell")
            .field("current", &self.load())
            .finish()
    }
}
