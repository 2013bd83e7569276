//! Store record — identity plus latest status.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use shard_core::{StoreId, StoreLabel, StoreMeta, StoreState};

use crate::location;
use crate::resource::ResourceKind;
use crate::status::{StoreStats, StoreStatus};

/// Snapshot of a store as seen by the scheduler.
///
/// Once published a record is read-only. To change one, clone it, modify
/// the clone, and publish the clone. `Clone` is a deep copy: the clone
/// shares nothing with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    meta: StoreMeta,
    #[serde(default)]
    status: StoreStatus,
}

impl StoreRecord {
    /// A freshly registered store with a zero-valued status.
    pub fn new(meta: StoreMeta) -> Self {
        Self {
            meta,
            status: StoreStatus::new(),
        }
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    pub fn status(&self) -> &StoreStatus {
        &self.status
    }

    pub fn id(&self) -> StoreId {
        self.meta.id
    }

    pub fn address(&self) -> &str {
        &self.meta.address
    }

    pub fn state(&self) -> StoreState {
        self.meta.state
    }

    pub fn labels(&self) -> &[StoreLabel] {
        &self.meta.labels
    }

    /// Copy of this record with `stats` merged in, stamped now.
    pub fn with_heartbeat(&self, stats: StoreStats) -> Self {
        self.with_heartbeat_at(stats, SystemTime::now())
    }

    pub fn with_heartbeat_at(&self, stats: StoreStats, received_at: SystemTime) -> Self {
        Self {
            meta: self.meta.clone(),
            status: self.status.merge_at(stats, received_at),
        }
    }

    /// Copy of this record with a new identity and the current status.
    pub fn with_meta(&self, meta: StoreMeta) -> Self {
        Self {
            meta,
            status: self.status.clone(),
        }
    }

    // ── Administrative changes (on a private copy) ────────────────

    pub fn set_blocked(&mut self) {
        self.status.set_blocked(true);
    }

    pub fn set_unblocked(&mut self) {
        self.status.set_blocked(false);
    }

    pub fn set_state(&mut self, state: StoreState) {
        self.meta.state = state;
    }

    // ── Classification ────────────────────────────────────────────

    pub fn is_blocked(&self) -> bool {
        self.status.is_blocked()
    }

    pub fn is_up(&self) -> bool {
        self.meta.state == StoreState::Up
    }

    pub fn is_offline(&self) -> bool {
        self.meta.state == StoreState::Offline
    }

    pub fn is_tombstone(&self) -> bool {
        self.meta.state == StoreState::Tombstone
    }

    /// Wall-clock time since the last heartbeat.
    pub fn down_time(&self) -> Duration {
        self.status.down_time()
    }

    pub fn down_time_at(&self, now: SystemTime) -> Duration {
        self.status.down_time_at(now)
    }

    pub fn uptime(&self) -> Duration {
        self.status.uptime()
    }

    pub fn start_timestamp(&self) -> SystemTime {
        self.status.start_timestamp()
    }

    // ── Scoring ───────────────────────────────────────────────────

    pub fn leader_count(&self) -> u64 {
        u64::from(self.status.stats().leader_count)
    }

    /// Leader count as-is; leaders are comparable across stores.
    pub fn leader_score(&self) -> f64 {
        f64::from(self.status.stats().leader_count)
    }

    pub fn region_count(&self) -> u64 {
        u64::from(self.status.stats().region_count)
    }

    /// Regions per byte of capacity. Zero for a store with no capacity.
    pub fn region_score(&self) -> f64 {
        let capacity = self.status.stats().capacity;
        if capacity == 0 {
            return 0.0;
        }
        f64::from(self.status.stats().region_count) / capacity as f64
    }

    pub fn storage_size(&self) -> u64 {
        self.status.storage_size()
    }

    pub fn storage_ratio(&self) -> f64 {
        self.status.storage_ratio()
    }

    pub fn resource_count(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Leader => self.leader_count(),
            ResourceKind::Region => self.region_count(),
        }
    }

    pub fn resource_score(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Leader => self.leader_score(),
            ResourceKind::Region => self.region_score(),
        }
    }

    // ── Topology ──────────────────────────────────────────────────

    pub fn label_value(&self, key: &str) -> &str {
        location::label_value(&self.meta.labels, key)
    }

    /// See [`location::location_id`].
    pub fn location_id<S: AsRef<str>>(&self, keys: &[S]) -> String {
        location::location_id(&self.meta.labels, keys)
    }
}
