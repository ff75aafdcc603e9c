use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::table;

/// Write one pretty-printed JSON file per table row into `out_dir`.
pub fn export_json(table_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let records = table::read_records(table_path)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(records.len());
    for record in &records {
        let path = out_dir.join(format!("email_{:04}.json", record.id));
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    info!(count = written.len(), dir = %out_dir.display(), "exported records");
    Ok(written)
}
