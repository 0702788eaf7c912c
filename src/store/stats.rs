//! Store statistics and management
//!
//! Listing, removing and measuring stored snapshots.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, store as store_error};

use super::{LocalStore, MANIFEST_FILE};

fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

/// One stored snapshot
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub res_version: String,
    /// Whether the decoded manifest is present
    pub has_manifest: bool,
    /// Number of payload files, manifest excluded
    pub bundle_files: usize,
    /// Total size in bytes
    pub size: u64,
}

impl StoredSnapshot {
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

/// Store statistics
#[derive(Debug, Default)]
pub struct StoreStats {
    pub snapshots: usize,
    pub bundle_files: usize,
    pub total_size: u64,
}

impl StoreStats {
    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }
}

fn measure(res_version: String, dir: &Path) -> Result<StoredSnapshot> {
    let mut snapshot = StoredSnapshot {
        has_manifest: dir.join(MANIFEST_FILE).is_file(),
        res_version,
        bundle_files: 0,
        size: 0,
    };

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        snapshot.size += entry
            .metadata()
            .map_err(|e| store_error::operation_failed(format!("Failed to get metadata: {e}")))?
            .len();
        if entry.depth() != 1 || entry.file_name() != MANIFEST_FILE {
            snapshot.bundle_files += 1;
        }
    }

    Ok(snapshot)
}

/// List stored snapshots, sorted by resource version
pub fn list_snapshots(store: &LocalStore) -> Result<Vec<StoredSnapshot>> {
    let root = store.root();
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(root)
        .map_err(|e| store_error::operation_failed(format!("Failed to read store directory: {e}")))?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| store_error::operation_failed(format!("Failed to read entry: {e}")))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let res_version = entry.file_name().to_string_lossy().to_string();
        snapshots.push(measure(res_version, &path)?);
    }

    snapshots.sort_by(|a, b| a.res_version.cmp(&b.res_version));
    Ok(snapshots)
}

/// Aggregate statistics over all stored snapshots
pub fn store_stats(store: &LocalStore) -> Result<StoreStats> {
    let snapshots = list_snapshots(store)?;
    Ok(StoreStats {
        snapshots: snapshots.len(),
        bundle_files: snapshots.iter().map(|s| s.bundle_files).sum(),
        total_size: snapshots.iter().map(|s| s.size).sum(),
    })
}

/// Remove one stored snapshot
pub fn remove_snapshot(store: &LocalStore, res_version: &str) -> Result<()> {
    let is_segment = !res_version.is_empty()
        && !res_version.contains(['/', '\\'])
        && res_version != "."
        && res_version != "..";
    let path = store.snapshot_dir(res_version);
    if !is_segment || !path.is_dir() {
        return Err(store_error::operation_failed(format!(
            "Snapshot not found in store: {res_version}"
        )));
    }

    fs::remove_dir_all(&path)
        .map_err(|e| store_error::operation_failed(format!("Failed to remove snapshot: {e}")))
}

/// Remove every stored snapshot
///
/// Only snapshot directories are deleted. Other files in the store root are
/// kept, and the root itself is removed only once it is empty. Returns the
/// number of snapshots removed.
pub fn clear_store(store: &LocalStore) -> Result<usize> {
    let snapshots = list_snapshots(store)?;
    for snapshot in &snapshots {
        fs::remove_dir_all(store.snapshot_dir(&snapshot.res_version)).map_err(|e| {
            store_error::operation_failed(format!(
                "Failed to remove snapshot {}: {e}",
                snapshot.res_version
            ))
        })?;
    }

    let root = store.root();
    let is_empty = fs::read_dir(root).is_ok_and(|mut entries| entries.next().is_none());
    if is_empty {
        fs::remove_dir(root)
            .map_err(|e| store_error::operation_failed(format!("Failed to clear store: {e}")))?;
    }
    Ok(snapshots.len())
}
