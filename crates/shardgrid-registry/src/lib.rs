//! shardgrid-registry — the published view of every store.
//!
//! Records from `shardgrid-store` are immutable once published. The
//! registry holds one [`SnapshotCell`] per store; writers (the heartbeat
//! path, scheduler administration) clone the current record, change the
//! private copy, and publish it. Readers take a [`Snapshot`] and keep a
//! consistent view for as long as they hold it.
//!
//! # Architecture
//!
//! ```text
//! StoreRegistry
//!   ├── ScheduleConfig (down threshold, location labels)
//!   └── RwLock<HashMap<StoreId, SnapshotCell<StoreRecord>>>
//!         ├── heartbeat()   ── clone + merge + publish
//!         ├── block()       ── clone + set_blocked + publish
//!         └── get()/list()  ── Arc clone, lock released before use
//! ```

pub mod error;
pub mod registry;
pub mod snapshot;

pub use error::{RegistryError, RegistryResult};
pub use registry::{StoreRegistry, StoreSummary};
pub use snapshot::{Snapshot, SnapshotCell};
