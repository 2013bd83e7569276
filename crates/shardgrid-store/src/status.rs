//! Heartbeat statistics and the per-store status block built from them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use shard_core::StoreId;

/// Statistics a store reports on every heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreStats {
    pub store_id: StoreId,
    /// Total disk capacity in bytes.
    pub capacity: u64,
    /// Free disk space in bytes.
    pub available: u64,
    pub leader_count: u32,
    pub region_count: u32,
    pub sending_snap_count: u32,
    pub receiving_snap_count: u32,
    pub applying_snap_count: u32,
    /// Unix timestamp (seconds) when the store process started.
    pub start_time: u32,
    pub is_busy: bool,
}

/// Latest known status of a store.
///
/// Replaced wholesale on each heartbeat. `blocked` is an administrative
/// flag and is carried across every merge untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    #[serde(flatten)]
    stats: StoreStats,
    #[serde(default)]
    blocked: bool,
    #[serde(default = "unix_epoch")]
    last_heartbeat_ts: SystemTime,
}

fn unix_epoch() -> SystemTime {
    UNIX_EPOCH
}

impl Default for StoreStatus {
    fn default() -> Self {
        Self {
            stats: StoreStats::default(),
            blocked: false,
            last_heartbeat_ts: UNIX_EPOCH,
        }
    }
}

impl StoreStatus {
    /// A zero-valued status: no capacity, no counts, never heard from.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub(crate) fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn last_heartbeat_ts(&self) -> SystemTime {
        self.last_heartbeat_ts
    }

    /// Fold a fresh heartbeat report into a new status, stamped now.
    pub fn merge(&self, stats: StoreStats) -> Self {
        self.merge_at(stats, SystemTime::now())
    }

    /// Like [`merge`](Self::merge) with an explicit receive time.
    pub fn merge_at(&self, stats: StoreStats, received_at: SystemTime) -> Self {
        Self {
            stats,
            blocked: self.blocked,
            last_heartbeat_ts: received_at,
        }
    }

    /// When the store process started, as reported by the store.
    pub fn start_timestamp(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.stats.start_time))
    }

    /// Time between process start and the last heartbeat. Zero on clock skew.
    pub fn uptime(&self) -> Duration {
        self.last_heartbeat_ts
            .duration_since(self.start_timestamp())
            .unwrap_or_default()
    }

    pub fn down_time(&self) -> Duration {
        self.down_time_at(SystemTime::now())
    }

    /// Time elapsed between the last heartbeat and `now`. Zero on clock skew.
    pub fn down_time_at(&self, now: SystemTime) -> Duration {
        now.duration_since(self.last_heartbeat_ts).unwrap_or_default()
    }

    /// Bytes in use.
    pub fn storage_size(&self) -> u64 {
        self.stats.capacity.saturating_sub(self.stats.available)
    }

    pub fn storage_ratio(&self) -> f64 {
        if self.stats.capacity == 0 {
            return 0.0;
        }
        self.storage_size() as f64 / self.stats.capacity as f64
    }
}
