use std::cmp::Ordering;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Context;
use serde::Serialize;
use shard_core::{ShardConfig, StoreId, StoreState};
use shardgrid_registry::{StoreRegistry, StoreSummary};
use shardgrid_store::{ResourceKind, StoreRecord};
use tracing::info;

/// One line of `shardctl inspect` output.
#[derive(Debug, Serialize)]
pub struct StoreRow {
    pub id: StoreId,
    pub address: String,
    pub state: StoreState,
    pub blocked: bool,
    pub down: bool,
    pub kind: ResourceKind,
    pub count: u64,
    pub score: f64,
    pub storage_ratio: f64,
    pub uptime_secs: u64,
    /// Empty when the store lacks one of the configured location labels.
    pub location_id: String,
}

pub fn inspect(config: &ShardConfig, file: &Path, kind: ResourceKind, format: &str) -> anyhow::Result<()> {
    println!("{}", render(config, file, kind, format, SystemTime::now())?);
    Ok(())
}

/// Load a dump into a fresh registry and render it as `json` or a text table.
pub fn render(
    config: &ShardConfig,
    file: &Path,
    kind: ResourceKind,
    format: &str,
    now: SystemTime,
) -> anyhow::Result<String> {
    let registry = StoreRegistry::new(config.schedule.clone());
    for record in load_records(file)? {
        registry.restore(record);
    }
    info!(stores = registry.len(), file = %file.display(), "loaded store records");

    let rows = build_rows(&registry, kind, now);
    let out = match format {
        "json" => serde_json::to_string_pretty(&rows)?,
        _ => format!(
            "{}\n{}",
            format_table(&rows),
            format_summary(&registry.summary_at(now))
        ),
    };
    Ok(out)
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<StoreRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse store records in {}", path.display()))?;
    Ok(records)
}

/// Rows for every store, highest score first (ties by ID).
pub fn build_rows(registry: &StoreRegistry, kind: ResourceKind, now: SystemTime) -> Vec<StoreRow> {
    let labels = registry.config().location_labels.as_slice();
    let mut rows: Vec<StoreRow> = registry
        .list()
        .iter()
        .map(|record| StoreRow {
            id: record.id(),
            address: record.address().to_string(),
            state: record.state(),
            blocked: record.is_blocked(),
            down: !record.is_tombstone() && registry.is_down_at(record, now),
            kind,
            count: record.resource_count(kind),
            score: record.resource_score(kind),
            storage_ratio: record.storage_ratio(),
            uptime_secs: record.uptime().as_secs(),
            location_id: record.location_id(labels),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    rows
}

pub fn format_table(rows: &[StoreRow]) -> String {
    let mut out = format!(
        "{:>6}  {:<22}  {:<9}  {:<7}  {:<4}  {:>8}  {:>12}  {:>7}  {:>10}  {}",
        "ID", "ADDRESS", "STATE", "BLOCKED", "DOWN", "COUNT", "SCORE", "USED", "UPTIME", "LOCATION"
    );
    for row in rows {
        let location = if row.location_id.is_empty() { "-" } else { &row.location_id };
        out.push('\n');
        out.push_str(&format!(
            "{:>6}  {:<22}  {:<9}  {:<7}  {:<4}  {:>8}  {:>12.6}  {:>6.1}%  {:>9}s  {}",
            row.id,
            row.address,
            row.state,
            yes_no(row.blocked),
            yes_no(row.down),
            row.count,
            row.score,
            row.storage_ratio * 100.0,
            row.uptime_secs,
            location,
        ));
    }
    out
}

pub fn format_summary(summary: &StoreSummary) -> String {
    format!(
        "{} up, {} offline, {} tombstone ({} blocked, {} down)",
        summary.up, summary.offline, summary.tombstone, summary.blocked, summary.down
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::{ScheduleConfig, StoreMeta};
    use shardgrid_store::StoreStats;
    use std::time::{Duration, UNIX_EPOCH};

    fn record(id: StoreId, capacity: u64, leaders: u32, regions: u32, at: SystemTime) -> StoreRecord {
        let meta = StoreMeta::new(id, format!("10.0.1.{id}:20160"))
            .with_label("zone", "z1")
            .with_label("rack", format!("r{id}"));
        StoreRecord::new(meta).with_heartbeat_at(
            StoreStats {
                store_id: id,
                capacity,
                available: capacity / 2,
                leader_count: leaders,
                region_count: regions,
                ..Default::default()
            },
            at,
        )
    }

    fn registry_with(records: Vec<StoreRecord>) -> StoreRegistry {
        let registry = StoreRegistry::new(ScheduleConfig {
            max_store_down_time: "60s".to_string(),
            location_labels: vec!["zone".to_string(), "rack".to_string()],
        });
        for record in records {
            registry.restore(record);
        }
        registry
    }

    #[test]
    fn load_records_from_json_dump() {
        let now = SystemTime::now();
        let mut blocked = record(2, 100, 1, 1, now);
        blocked.set_blocked();
        let records = vec![record(1, 1000, 5, 20, now), blocked];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, records);
        assert!(loaded[1].is_blocked());
    }

    #[test]
    fn load_records_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn rows_sorted_by_score() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let registry = registry_with(vec![
            record(1, 1000, 5, 20, t0),
            record(2, 1000, 9, 10, t0),
            record(3, 0, 1, 50, t0),
        ]);

        let rows = build_rows(&registry, ResourceKind::Region, t0);
        let ids: Vec<StoreId> = rows.iter().map(|r| r.id).collect();
        // Store 3 has no capacity, so its region score is zero.
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(rows[2].score, 0.0);

        let rows = build_rows(&registry, ResourceKind::Leader, t0);
        let ids: Vec<StoreId> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, [2, 1, 3]);
        assert_eq!(rows[0].count, 9);
    }

    #[test]
    fn rows_carry_down_and_location() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let mut tombstone = record(3, 10, 0, 0, t0);
        tombstone.set_state(StoreState::Tombstone);
        let registry = registry_with(vec![
            record(1, 10, 0, 0, t0),
            record(2, 10, 0, 0, t0 - Duration::from_secs(300)),
            tombstone,
        ]);

        let rows = build_rows(&registry, ResourceKind::Leader, t0);
        let by_id = |id| rows.iter().find(|r| r.id == id).unwrap();
        assert!(!by_id(1).down);
        assert!(by_id(2).down);
        assert!(!by_id(3).down);
        assert_eq!(by_id(1).location_id, "z1r1");
        assert_eq!(by_id(1).storage_ratio, 0.5);
    }

    #[test]
    fn table_lists_every_store() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let registry = registry_with(vec![record(1, 10, 0, 0, t0), record(2, 10, 0, 0, t0)]);
        let table = format_table(&build_rows(&registry, ResourceKind::Region, t0));

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("LOCATION"));
        assert!(lines[1].contains("z1r1"));
        assert!(lines[2].contains("10.0.1.2:20160"));
    }

    fn write_dump(dir: &tempfile::TempDir, records: &[StoreRecord]) -> std::path::PathBuf {
        let path = dir.path().join("stores.json");
        std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
        path
    }

    fn zone_rack_config() -> ShardConfig {
        let mut config = ShardConfig::default();
        config.schedule.max_store_down_time = "60s".to_string();
        config.schedule.location_labels = vec!["zone".to_string(), "rack".to_string()];
        config
    }

    #[test]
    fn render_json_from_dump() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let dir = tempfile::tempdir().unwrap();
        let path = write_dump(
            &dir,
            &[record(1, 1000, 5, 20, t0), record(2, 1000, 9, 10, t0 - Duration::from_secs(300))],
        );

        let out = render(&zone_rack_config(), &path, ResourceKind::Leader, "json", t0).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 2);
        assert_eq!(rows[0]["kind"], "leader");
        assert_eq!(rows[0]["down"], true);
        assert_eq!(rows[1]["id"], 1);
        assert_eq!(rows[1]["location_id"], "z1r1");
        assert_eq!(rows[1]["down"], false);
    }

    #[test]
    fn render_text_from_dump() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let dir = tempfile::tempdir().unwrap();
        let mut blocked = record(2, 10, 0, 0, t0);
        blocked.set_blocked();
        let path = write_dump(&dir, &[record(1, 10, 0, 0, t0), blocked]);

        let out = render(&zone_rack_config(), &path, ResourceKind::Region, "text", t0).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("LOCATION"));
        assert!(lines[1].contains("10.0.1.1:20160"));
        assert!(lines[2].contains("z1r2"));
        assert_eq!(lines[3], "2 up, 0 offline, 0 tombstone (1 blocked, 0 down)");
    }

    #[test]
    fn render_keeps_last_duplicate() {
        let t0 = UNIX_EPOCH + Duration::from_secs(3_000_000);
        let dir = tempfile::tempdir().unwrap();
        let path = write_dump(&dir, &[record(1, 10, 1, 0, t0), record(1, 10, 7, 0, t0)]);

        let out = render(&zone_rack_config(), &path, ResourceKind::Leader, "json", t0).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 1);
        assert_eq!(rows[0]["count"], 7);
    }

    #[test]
    fn render_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = render(&zone_rack_config(), &missing, ResourceKind::Leader, "json", SystemTime::now())
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn summary_line() {
        let summary = StoreSummary {
            up: 3,
            offline: 1,
            tombstone: 0,
            blocked: 1,
            down: 2,
        };
        assert_eq!(
            format_summary(&summary),
            "3 up, 1 offline, 0 tombstone (1 blocked, 2 down)"
        );
    }
}
