//! Store registry — tracks every store's current record.
//!
//! Applies registrations, heartbeats, lifecycle transitions and
//! block/unblock commands as copy-on-write updates, and answers the
//! balancer's eligibility queries against published snapshots.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use shard_core::{ScheduleConfig, StoreId, StoreMeta, StoreState};
use shardgrid_store::{StoreRecord, StoreStats};

use crate::error::{RegistryError, RegistryResult};
use crate::snapshot::{Snapshot, SnapshotCell};

/// Used when the configured down threshold does not parse.
const DEFAULT_MAX_STORE_DOWN_TIME: Duration = Duration::from_secs(30 * 60);

/// Store counts by classification, for status surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub up: usize,
    pub offline: usize,
    pub tombstone: usize,
    pub blocked: usize,
    /// Non-tombstone stores past the down threshold.
    pub down: usize,
}

/// The published view of all stores in the cluster.
pub struct StoreRegistry {
    config: ScheduleConfig,
    max_store_down_time: Duration,
    stores: RwLock<HashMap<StoreId, Arc<SnapshotCell<StoreRecord>>>>,
}

impl StoreRegistry {
    pub fn new(config: ScheduleConfig) -> Self {
        let max_store_down_time = config.max_store_down_time().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default max_store_down_time");
            DEFAULT_MAX_STORE_DOWN_TIME
        });
        Self {
            config,
            max_store_down_time,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Override the down threshold.
    pub fn with_max_store_down_time(mut self, threshold: Duration) -> Self {
        self.max_store_down_time = threshold;
        self
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn max_store_down_time(&self) -> Duration {
        self.max_store_down_time
    }

    fn cell(&self, id: StoreId) -> Option<Arc<SnapshotCell<StoreRecord>>> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.get(&id).cloned()
    }

    // ── Updates ────────────────────────────────────────────────────

    /// Register a store, or replace an existing store's identity.
    ///
    /// An existing store keeps its status (including `blocked`). The
    /// address must not belong to another live store, and the lifecycle
    /// state may only move forward.
    pub fn put_store(&self, meta: StoreMeta) -> RegistryResult<Snapshot<StoreRecord>> {
        // Held for the whole call so address checks and inserts don't race.
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);

        for (other_id, cell) in stores.iter() {
            if *other_id == meta.id {
                continue;
            }
            let other = cell.load();
            if !other.is_tombstone() && other.address() == meta.address {
                warn!(store_id = meta.id, existing = *other_id, address = %meta.address, "duplicate store address");
                return Err(RegistryError::DuplicateAddress {
                    address: meta.address,
                    existing: *other_id,
                });
            }
        }

        let id = meta.id;
        match stores.get(&id) {
            Some(cell) => {
                let published = cell.update(|record| {
                    if record.is_tombstone() {
                        return Err(RegistryError::StoreTombstoned(id));
                    }
                    if !record.state().can_transition_to(meta.state) {
                        return Err(RegistryError::InvalidTransition {
                            id,
                            from: record.state(),
                            to: meta.state,
                        });
                    }
                    *record = record.with_meta(meta.clone());
                    Ok(())
                })?;
                info!(store_id = id, address = %published.address(), "store updated");
                Ok(published)
            }
            None => {
                let cell = Arc::new(SnapshotCell::new(StoreRecord::new(meta)));
                let published = cell.load();
                stores.insert(id, cell);
                info!(store_id = id, address = %published.address(), state = %published.state(), "store registered");
                Ok(published)
            }
        }
    }

    /// Install a record loaded from the storage layer, status included.
    ///
    /// Used at startup; replaces any record already held for that ID.
    pub fn restore(&self, record: StoreRecord) -> Snapshot<StoreRecord> {
        let id = record.id();
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let published = match stores.get(&id) {
            Some(cell) => {
                warn!(store_id = id, "restore replaced an existing store record");
                cell.publish(record)
            }
            None => {
                let cell = Arc::new(SnapshotCell::new(record));
                let published = cell.load();
                stores.insert(id, cell);
                published
            }
        };
        debug!(store_id = id, "store restored");
        published
    }

    /// Merge a heartbeat report into the store's record, stamped now.
    pub fn heartbeat(&self, stats: StoreStats) -> RegistryResult<Snapshot<StoreRecord>> {
        self.heartbeat_at(stats, SystemTime::now())
    }

    pub fn heartbeat_at(
        &self,
        stats: StoreStats,
        received_at: SystemTime,
    ) -> RegistryResult<Snapshot<StoreRecord>> {
        let id = stats.store_id;
        let Some(cell) = self.cell(id) else {
            warn!(store_id = id, "heartbeat from unknown store");
            return Err(RegistryError::StoreNotFound(id));
        };

        let published = cell
            .update(|record| {
                if record.is_tombstone() {
                    return Err(RegistryError::StoreTombstoned(id));
                }
                *record = record.with_heartbeat_at(stats.clone(), received_at);
                Ok(())
            })
            .inspect_err(|e| warn!(store_id = id, error = %e, "heartbeat rejected"))?;

        debug!(
            store_id = id,
            leaders = published.leader_count(),
            regions = published.region_count(),
            "heartbeat merged"
        );
        Ok(published)
    }

    /// Exclude a store from balancing until [`unblock`](Self::unblock).
    pub fn block(&self, id: StoreId) -> RegistryResult<Snapshot<StoreRecord>> {
        let published = self.edit(id, |record| {
            record.set_blocked();
            Ok(())
        })?;
        info!(store_id = id, "store blocked");
        Ok(published)
    }

    pub fn unblock(&self, id: StoreId) -> RegistryResult<Snapshot<StoreRecord>> {
        let published = self.edit(id, |record| {
            record.set_unblocked();
            Ok(())
        })?;
        info!(store_id = id, "store unblocked");
        Ok(published)
    }

    /// Move a store along `Up -> Offline -> Tombstone`.
    pub fn set_state(&self, id: StoreId, state: StoreState) -> RegistryResult<Snapshot<StoreRecord>> {
        let published = self.edit(id, |record| {
            let from = record.state();
            if !from.can_transition_to(state) {
                return Err(RegistryError::InvalidTransition { id, from, to: state });
            }
            record.set_state(state);
            Ok(())
        })?;
        info!(store_id = id, %state, "store state changed");
        Ok(published)
    }

    fn edit(
        &self,
        id: StoreId,
        edit: impl FnMut(&mut StoreRecord) -> RegistryResult<()>,
    ) -> RegistryResult<Snapshot<StoreRecord>> {
        let cell = self.cell(id).ok_or(RegistryError::StoreNotFound(id))?;
        cell.update(edit)
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn get(&self, id: StoreId) -> Option<Snapshot<StoreRecord>> {
        self.cell(id).map(|cell| cell.load())
    }

    /// All stores, sorted by ID.
    pub fn list(&self) -> Vec<Snapshot<StoreRecord>> {
        let mut records: Vec<_> = {
            let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
            stores.values().map(|cell| cell.load()).collect()
        };
        records.sort_by_key(|record| record.id());
        records
    }

    pub fn len(&self) -> usize {
        self.stores.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the store has gone without a heartbeat past the threshold.
    pub fn is_down(&self, record: &StoreRecord) -> bool {
        self.is_down_at(record, SystemTime::now())
    }

    pub fn is_down_at(&self, record: &StoreRecord, now: SystemTime) -> bool {
        record.down_time_at(now) > self.max_store_down_time
    }

    /// Stores the balancer may move data to or from: up, not blocked, not down.
    pub fn balance_candidates(&self) -> Vec<Snapshot<StoreRecord>> {
        self.balance_candidates_at(SystemTime::now())
    }

    pub fn balance_candidates_at(&self, now: SystemTime) -> Vec<Snapshot<StoreRecord>> {
        self.list()
            .into_iter()
            .filter(|record| record.is_up() && !record.is_blocked() && !self.is_down_at(record, now))
            .collect()
    }

    /// Location ID of a store under the configured location labels.
    ///
    /// `None` if the store is unknown; `Some("")` if its location is unknown.
    pub fn location_id(&self, id: StoreId) -> Option<String> {
        self.get(id)
            .map(|record| record.location_id(self.config.location_labels.as_slice()))
    }

    pub fn summary(&self) -> StoreSummary {
        self.summary_at(SystemTime::now())
    }

    pub fn summary_at(&self, now: SystemTime) -> StoreSummary {
        let mut summary = StoreSummary::default();
        for record in self.list() {
            match record.state() {
                StoreState::Up => summary.up += 1,
                StoreState::Offline => summary.offline += 1,
                StoreState::Tombstone => summary.tombstone += 1,
            }
            if record.is_blocked() {
                summary.blocked += 1;
            }
            if !record.is_tombstone() && self.is_down_at(&record, now) {
                summary.down += 1;
            }
        }
        summary
    }
}
