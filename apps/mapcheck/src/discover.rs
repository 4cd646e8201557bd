//! Input enumeration: glob patterns under the maps directory.

use crate::error::{CheckError, Result};
use crate::models::MapFile;
use glob::glob;
use std::collections::BTreeMap;
use std::path::Path;

/// Collect regular files matching `patterns` under `maps_dir`, sorted by
/// identifier and deduplicated across patterns.
pub fn discover_maps(maps_dir: &Path, patterns: &[String]) -> Result<Vec<MapFile>> {
    if !maps_dir.is_dir() {
        return Err(CheckError::MapsDirMissing(maps_dir.to_path_buf()));
    }
    let mut found: BTreeMap<String, MapFile> = BTreeMap::new();
    for pat in patterns {
        let abs_glob = maps_dir.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|e| CheckError::Pattern {
            pattern: pat.clone(),
            message: e.to_string(),
        })?;
        for path in entries.flatten() {
            if !path.is_file() {
                continue;
            }
            let id = pathdiff::diff_paths(&path, maps_dir)
                .unwrap_or_else(|| path.clone())
                .to_string_lossy()
                .to_string();
            found
                .entry(id.clone())
                .or_insert_with(|| MapFile::new(id, path));
        }
    }
    Ok(found.into_values().collect())
}
