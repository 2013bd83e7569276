//! shardgrid-store — per-store metadata and scoring primitives.
//!
//! A [`StoreRecord`] pairs a store's registered identity ([`StoreMeta`])
//! with its heartbeat-refreshed [`StoreStatus`]. The balancing policy asks
//! three kinds of questions of a record:
//!
//! - how loaded it is, per [`ResourceKind`] (`resource_count`, `resource_score`)
//! - whether it is eligible for balancing (`is_up`, `is_blocked`, `down_time`)
//! - where it sits in the topology (`location_id`)
//!
//! Records are plain values. Updates clone the record, change the private
//! copy, and hand it back for publication; nothing here mutates shared state.
//!
//! [`StoreMeta`]: shard_core::StoreMeta

pub mod location;
pub mod record;
pub mod resource;
pub mod status;

pub use location::{label_value, location_id};
pub use record::StoreRecord;
pub use resource::{ParseResourceKindError, ResourceKind};
pub use status::{StoreStats, StoreStatus};
