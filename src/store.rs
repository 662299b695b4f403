use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::data_dir;
use crate::model::mapping::MappingTable;

pub const MAPPING_FILE: &str = "weekly_sync_mapping.json";

pub fn default_mapping_path() -> PathBuf {
    data_dir().join(MAPPING_FILE)
}

/// JSON side-table of original-to-weekly card mappings.
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unparseable file yields an empty table.
    pub fn load(&self) -> Result<MappingTable> {
        if !self.path.exists() {
            return Ok(MappingTable::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let mut table: MappingTable = match serde_json::from_str(&contents) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Invalid mapping file, starting fresh");
                return Ok(MappingTable::default());
            }
        };
        let dropped = table.dedupe();
        if dropped > 0 {
            warn!(dropped, "Mapping file had duplicate card ids, kept first occurrence");
        }
        Ok(table)
    }

    pub fn save(&self, table: &mut MappingTable) -> Result<()> {
        table.last_updated = Some(chrono::Utc::now().to_rfc3339());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(table)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Mapping saved with {} entries", table.len());
        Ok(())
    }
}
