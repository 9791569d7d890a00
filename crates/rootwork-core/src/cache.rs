//! Persistence of the global dependency graph artifact

use crate::result::DependencyGraphResult;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Directory under a bundle's derived-artifacts area.
pub const CACHE_DIR: &str = "dependency-graph";

/// Global graph cache file
pub const GLOBAL_GRAPH_CACHE: &str = "global.json";

/// Get cache directory path
pub fn cache_dir(derived_dir: &Path) -> PathBuf {
    derived_dir.join(CACHE_DIR)
}

/// Get global graph cache file path
pub fn global_graph_path(derived_dir: &Path) -> PathBuf {
    derived_dir.join(CACHE_DIR).join(GLOBAL_GRAPH_CACHE)
}

/// Ensure cache directory exists
pub fn ensure_cache_dir(derived_dir: &Path) -> std::io::Result<()> {
    let cache = cache_dir(derived_dir);
    if !cache.exists() {
        std::fs::create_dir_all(&cache)?;
    }
    Ok(())
}

/// Sibling temp file for one write, named after the writing request.
fn temp_graph_path(derived_dir: &Path, request_id: &str) -> PathBuf {
    let tag: String = request_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    cache_dir(derived_dir).join(format!("{GLOBAL_GRAPH_CACHE}.{tag}.tmp"))
}

/// Write the global graph, replacing any previous artifact.
///
/// Each write goes to its own temp file and is renamed into place, so
/// readers never see a partial document even with concurrent writers.
pub fn save_graph(result: &DependencyGraphResult, derived_dir: &Path) -> anyhow::Result<PathBuf> {
    ensure_cache_dir(derived_dir)?;
    let path = global_graph_path(derived_dir);
    let tmp = temp_graph_path(derived_dir, &result.meta.request_id);

    let json_str = serde_json::to_string_pretty(result)?;
    std::fs::write(&tmp, json_str)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path)
        .with_context(|| format!("Failed to move cache into place at {}", path.display()))?;

    tracing::debug!("Global graph cache saved: {}", path.display());
    Ok(path)
}

/// Load the global graph. `Ok(None)` when no artifact exists.
pub fn load_graph(derived_dir: &Path) -> anyhow::Result<Option<DependencyGraphResult>> {
    let path = global_graph_path(derived_dir);
    if !path.exists() {
        return Ok(None);
    }

    let json_str = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let result: DependencyGraphResult = serde_json::from_str(&json_str)
        .with_context(|| format!("Corrupt graph cache at {}", path.display()))?;

    tracing::debug!("Global graph cache loaded from: {}", path.display());
    Ok(Some(result))
}

/// Clear cache directory
pub fn clear_cache(derived_dir: &Path) -> std::io::Result<()> {
    let cache = cache_dir(derived_dir);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}
