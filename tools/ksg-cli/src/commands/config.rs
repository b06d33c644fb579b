//! Show the effective configuration.

use std::path::Path;

use ksg_common::config::AppConfig;

pub fn run(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
