//! Manifest reconstruction from a merge result
//!
//! The rebuilt manifest is a copy of the target's raw manifest with bundle
//! and asset records appended. Nothing already in the target is removed or
//! rewritten.
//!
//! ## Index remapping
//!
//! Indices in fallback records point into the fallback's own bundle list and
//! are meaningless in the target. Appended records are therefore re-indexed
//! by bundle *name* against a single name-to-index map built once after all
//! bundle records have been appended:
//!
//! ```text
//! target bundles   [A]            fallback bundles [A, B]   B -> [0]
//! rebuilt bundles  [A, B']        B' -> [index of "A"] = [0]
//! ```

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, graph as graph_error};
use crate::manifest::merge::{MergeResult, RequiredBundle, SourceId};
use crate::manifest::raw::{RawAsset, RawBundle, RawManifest};
use crate::manifest::view::ManifestView;

/// A bundle record appended by the rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedBundle {
    pub name: String,
    /// Position in the rebuilt bundle list
    pub index: usize,
    /// Fallback snapshot whose payload must be staged
    pub source: SourceId,
}

/// Output of [`ManifestRebuilder::rebuild`]
#[derive(Debug, Clone)]
pub struct RebuiltManifest {
    pub manifest: RawManifest,
    pub appended_bundles: Vec<AppendedBundle>,
    pub appended_assets: usize,
}

/// Derive an asset name from an overlay path by dropping the file extension
///
/// Overlay paths are already relative to the tree root, so only the
/// extension of the last segment is removed. Dots in directory names and
/// leading dots of hidden files are kept.
pub fn asset_name_for(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    let (dir, file) = match trimmed.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, trimmed),
    };
    let stem = match file.rfind('.') {
        Some(pos) if pos > 0 => &file[..pos],
        _ => file,
    };
    match dir {
        Some(dir) => format!("{dir}/{stem}"),
        None => stem.to_string(),
    }
}

fn next_sequence_index(current: i64) -> Result<i64> {
    current.checked_add(1).ok_or_else(|| {
        graph_error::inconsistent(format!("sequence index {current} has no successor"))
    })
}

fn to_raw_index(index: usize) -> Result<i64> {
    i64::try_from(index)
        .map_err(|_| graph_error::inconsistent(format!("bundle index {index} does not fit the manifest")))
}

/// Appends an overlay to the target manifest
pub struct ManifestRebuilder<'a> {
    target: &'a ManifestView,
    fallbacks: &'a [ManifestView],
}

impl<'a> ManifestRebuilder<'a> {
    /// `fallbacks` must be the same list, in the same order, the merge ran on
    pub fn new(target: &'a ManifestView, fallbacks: &'a [ManifestView]) -> Self {
        Self { target, fallbacks }
    }

    fn fallback(&self, source: SourceId) -> Result<&'a ManifestView> {
        self.fallbacks.get(source).ok_or_else(|| {
            graph_error::inconsistent(format!(
                "merge refers to fallback #{source}, but only {} were given",
                self.fallbacks.len()
            ))
        })
    }

    fn source_record(&self, required: &RequiredBundle) -> Result<&'a RawBundle> {
        let graph = self.fallback(required.source)?.graph();
        match (graph.get(required.bundle), graph.record(required.bundle)) {
            (Some(bundle), Some(record)) if bundle.name == required.name => Ok(record),
            _ => Err(graph_error::inconsistent(format!(
                "bundle '{}' is not at #{} of fallback #{}",
                required.name, required.bundle, required.source
            ))),
        }
    }

    /// Produce the rebuilt manifest
    ///
    /// Appended bundles get fresh, strictly increasing sequence indices
    /// starting after the target's highest one. Their dependencies and the
    /// appended assets' bundle indices are resolved by name against the
    /// combined bundle list.
    ///
    /// # Errors
    ///
    /// Returns an index consistency error if a dependency or owning bundle
    /// cannot be found by name in the combined bundle list, or if the merge
    /// result does not match the given snapshots.
    pub fn rebuild(&self, merge: &MergeResult) -> Result<RebuiltManifest> {
        let mut manifest = self.target.to_raw();
        let mut bundles = manifest.bundles.take().unwrap_or_default();
        let mut assets = manifest.asset_to_bundle_list.take().unwrap_or_default();
        let base = bundles.len();

        let mut next_sequence = match self.target.graph().max_sequence_index() {
            Some(max) if !merge.required.is_empty() => next_sequence_index(max)?,
            _ => 0,
        };

        let mut appended_bundles = Vec::with_capacity(merge.required.len());
        for (offset, required) in merge.required.iter().enumerate() {
            if self.target.graph().contains(&required.name) {
                return Err(graph_error::inconsistent(format!(
                    "required bundle '{}' already exists in the target",
                    required.name
                )));
            }
            let mut record = self.source_record(required)?.clone();
            record.set_scc_index(next_sequence);
            record.set_all_dependencies(Vec::new());
            if offset + 1 < merge.required.len() {
                next_sequence = next_sequence_index(next_sequence)?;
            }
            bundles.push(record);
            appended_bundles.push(AppendedBundle {
                name: required.name.clone(),
                index: base + offset,
                source: required.source,
            });
        }

        let index_by_name = name_index(&bundles);
        for (offset, required) in merge.required.iter().enumerate() {
            let graph = self.fallback(required.source)?.graph();
            let dependencies = graph
                .dependency_names(required.bundle)
                .into_iter()
                .map(|dep| {
                    resolve_index(&index_by_name, dep, || {
                        format!("dependency of '{}'", required.name)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            bundles[base + offset].set_all_dependencies(dependencies);
        }

        let mut appended_assets = 0;
        for (path, entry) in merge.overlay.leaves() {
            let bundle_index = resolve_index(&index_by_name, &entry.bundle_name, || {
                format!("owner of '{path}'")
            })?;
            let source = self.fallback(entry.source)?;
            let asset = source.asset(entry.asset).ok_or_else(|| {
                graph_error::inconsistent(format!(
                    "asset #{} of {} does not exist",
                    entry.asset,
                    source.tag()
                ))
            })?;

            let mut record: RawAsset = asset.record.clone();
            record.relocate(asset_name_for(&path), bundle_index, path);
            assets.push(record);
            appended_assets += 1;
        }

        manifest.bundles = Some(bundles);
        manifest.asset_to_bundle_list = Some(assets);
        verify_indices(&manifest)?;

        debug!(
            bundles = appended_bundles.len(),
            assets = appended_assets,
            "rebuilt manifest"
        );
        Ok(RebuiltManifest {
            manifest,
            appended_bundles,
            appended_assets,
        })
    }
}

fn resolve_index(
    index_by_name: &HashMap<String, usize>,
    name: &str,
    context: impl FnOnce() -> String,
) -> Result<i64> {
    let index = index_by_name.get(name).copied().ok_or_else(|| {
        graph_error::inconsistent(format!("bundle '{name}' ({}) has no index", context()))
    })?;
    to_raw_index(index)
}

fn name_index(bundles: &[RawBundle]) -> HashMap<String, usize> {
    bundles
        .iter()
        .enumerate()
        .filter_map(|(index, b)| b.name.clone().map(|name| (name, index)))
        .collect()
}

/// Check that every index in the manifest is valid for its final bundle list
/// and that no addressable path appears twice
pub fn verify_indices(manifest: &RawManifest) -> Result<()> {
    let bundles = manifest.bundles.as_deref().unwrap_or_default();
    let len = bundles.len();
    let in_range = |raw: i64| usize::try_from(raw).is_ok_and(|idx| idx < len);

    for bundle in bundles {
        let name = bundle.name.as_deref().unwrap_or("<unnamed>");
        for &dep in bundle.all_dependencies.as_deref().unwrap_or_default() {
            if !in_range(dep) {
                return Err(graph_error::inconsistent(format!(
                    "bundle '{name}' depends on index {dep} of {len}"
                )));
            }
        }
    }

    let mut seen = HashSet::new();
    for asset in manifest.asset_to_bundle_list.as_deref().unwrap_or_default() {
        if let Some(raw) = asset.bundle_index {
            if !in_range(raw) {
                return Err(graph_error::inconsistent(format!(
                    "asset {:?} points at bundle index {raw} of {len}",
                    asset.path
                )));
            }
        }
        if let Some(path) = asset.addressable_path() {
            if !seen.insert(path) {
                return Err(graph_error::inconsistent(format!(
                    "path '{path}' appears more than once"
                )));
            }
        }
    }
    Ok(())
}
