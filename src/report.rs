// src/report.rs
// Writes the id list the report subcommand produces: one app id per line,
// no trailing newline, the whole file in one write.

use anyhow::{Context, Result};
use std::path::Path;

pub fn write_id_list(ids: &[String], path: &Path) -> Result<()> {
    std::fs::write(path, ids.join("\n"))
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
