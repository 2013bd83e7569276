//! shard.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Knobs the balancing policy reads when classifying stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// A store whose last heartbeat is older than this is considered down
    /// (e.g., "30m", "45s", "1h", "500ms").
    #[serde(default = "default_max_store_down_time")]
    pub max_store_down_time: String,
    /// Label keys, outermost first, that make up a store's location ID
    /// (e.g., ["zone", "rack", "host"]).
    #[serde(default)]
    pub location_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_max_store_down_time() -> String {
    "30m".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_store_down_time: default_max_store_down_time(),
            location_labels: Vec::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl ScheduleConfig {
    /// Parsed `max_store_down_time`.
    pub fn max_store_down_time(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.max_store_down_time).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid max_store_down_time: {:?}",
                self.max_store_down_time
            )
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.max_store_down_time()?;
        let mut seen = HashSet::new();
        for key in &self.location_labels {
            if key.trim().is_empty() {
                anyhow::bail!("location_labels contains an empty key");
            }
            if !seen.insert(key.as_str()) {
                anyhow::bail!("location_labels contains duplicate key {key:?}");
            }
        }
        Ok(())
    }
}

impl ShardConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: ShardConfig = toml::from_str(content)?;
        config.schedule.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Starting-point shard.toml with a zone/rack/host topology.
    pub fn scaffold() -> Self {
        ShardConfig {
            schedule: ScheduleConfig {
                location_labels: vec!["zone".to_string(), "rack".to_string(), "host".to_string()],
                ..Default::default()
            },
            log: LogConfig::default(),
        }
    }
}

/// Parse a humane duration: `500ms`, `45s`, `30m`, `1h`, or bare seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = ShardConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShardConfig::default());
        assert_eq!(
            config.schedule.max_store_down_time().unwrap(),
            Duration::from_secs(30 * 60)
        );
        assert!(config.schedule.location_labels.is_empty());
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[schedule]
max_store_down_time = "45s"
location_labels = ["zone", "rack", "host"]

[log]
filter = "debug,shardgrid_registry=trace"
"#;
        let config = ShardConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(
            config.schedule.max_store_down_time().unwrap(),
            Duration::from_secs(45)
        );
        assert_eq!(config.schedule.location_labels, ["zone", "rack", "host"]);
        assert_eq!(config.log.filter, "debug,shardgrid_registry=trace");
    }

    #[test]
    fn test_scaffold() {
        let toml_str = ShardConfig::scaffold().to_toml_string().unwrap();
        assert!(toml_str.contains("zone"));
        let parsed = ShardConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.location_labels, ["zone", "rack", "host"]);
    }

    #[test]
    fn test_roundtrip_default() {
        let toml_str = ShardConfig::default().to_toml_string().unwrap();
        assert!(toml_str.contains("max_store_down_time"));
        let parsed = ShardConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, ShardConfig::default());
    }

    #[test]
    fn test_rejects_bad_duration() {
        let err = ShardConfig::from_toml_str("[schedule]\nmax_store_down_time = \"soon\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_duplicate_location_label() {
        let config = ScheduleConfig {
            location_labels: vec!["zone".into(), "rack".into(), "zone".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScheduleConfig {
            location_labels: vec!["zone".into(), " ".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shard.toml");
        std::fs::write(&path, "[schedule]\nlocation_labels = [\"dc\", \"rack\"]\n").unwrap();

        let config = ShardConfig::from_file(&path).unwrap();
        assert_eq!(config.schedule.location_labels, ["dc", "rack"]);
        assert!(ShardConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("invalid"), None);
    }

    #[test]
    fn parse_duration_rejects_overflow() {
        assert_eq!(parse_duration("400000000000000000m"), None);
        assert_eq!(parse_duration("9999999999999999h"), None);
        assert_eq!(
            parse_duration("307445734561825860m"),
            Some(Duration::from_secs(307445734561825860 * 60))
        );
    }

    #[test]
    fn test_rejects_overflowing_duration() {
        let result =
            ShardConfig::from_toml_str("[schedule]\nmax_store_down_time = \"400000000000000000m\"\n");
        assert!(result.is_err());
    }
}
