use std::path::Path;

use shard_core::ShardConfig;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, ShardConfig::scaffold().to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    Ok(())
}
