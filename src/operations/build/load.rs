//! Snapshot loading

use std::path::Path;

use tracing::debug;

use crate::config::SnapshotRef;
use crate::error::Result;
use crate::manifest::{ManifestView, RawManifest};
use crate::store::LocalStore;

/// Decode and index one snapshot's manifest
///
/// An explicit `manifest` path in the reference is resolved against
/// `base_dir`; otherwise the manifest is read from the store layout.
pub fn load_snapshot(
    store: &LocalStore,
    base_dir: &Path,
    snapshot: &SnapshotRef,
) -> Result<ManifestView> {
    let path = match &snapshot.manifest {
        Some(manifest) => base_dir.join(manifest),
        None => store.manifest_path(&snapshot.res_version),
    };
    debug!(snapshot = %snapshot.tag(), path = %path.display(), "loading manifest");

    let raw = RawManifest::from_path(&path)?;
    let view = ManifestView::parse(snapshot.tag(), raw)?;
    debug!(
        snapshot = %view.tag(),
        bundles = view.graph().len(),
        paths = view.tree().len(),
        "manifest indexed"
    );
    Ok(view)
}
