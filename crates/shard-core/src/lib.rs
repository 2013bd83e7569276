pub mod config;
pub mod types;

pub use config::{LogConfig, ScheduleConfig, ShardConfig};
pub use types::*;
