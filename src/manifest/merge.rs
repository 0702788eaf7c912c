//! Overlay computation across prioritized fallback snapshots
//!
//! The merger walks every fallback snapshot in priority order and collects
//! the paths the target snapshot lacks into a fresh overlay tree. For each
//! collected path it pulls in the owning bundle and that bundle's dependency
//! closure, skipping bundles the target already ships.
//!
//! ## Precedence
//!
//! ```text
//! target      ui/x
//! fallback 0  ui/x  ui/y
//! fallback 1        ui/y  ui/z
//!
//! overlay     ui/y (fallback 0)  ui/z (fallback 1)
//! ```
//!
//! A path present in the target is never pulled forward. A path found in an
//! earlier fallback is never replaced by a later one.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{Result, graph as graph_error, tree as tree_error};
use crate::manifest::graph::BundleId;
use crate::manifest::tree::PathTree;
use crate::manifest::view::{AssetId, ManifestView};

/// Root label of overlay trees in dumps
pub const OVERLAY_ROOT: &str = "overlay";

/// Position of a snapshot in the fallback list
pub type SourceId = usize;

/// Overlay leaf: which asset of which fallback serves this path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub source: SourceId,
    pub asset: AssetId,
    /// Owning bundle, by name, so it can be re-indexed during rebuild
    pub bundle_name: String,
}

/// A bundle the target lacks and the overlay needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredBundle {
    pub name: String,
    pub source: SourceId,
    pub bundle: BundleId,
}

/// Counters describing one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Paths pulled forward by the automatic pass
    pub merged: usize,
    /// Fallback paths skipped because the target has them
    pub shadowed_by_target: usize,
    /// Fallback paths skipped because a higher-priority fallback supplied them
    pub shadowed_by_fallback: usize,
    /// Paths added by manual aliasing
    pub aliased: usize,
    /// Bundles pulled forward by explicit request
    pub requested_bundles: usize,
}

/// Final merge state, consumed by the rebuild stage
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub overlay: PathTree<OverlayEntry>,
    pub required: Vec<RequiredBundle>,
    pub report: MergeReport,
}

/// Computes the overlay of a target snapshot against its fallbacks
pub struct ManifestMerger<'a> {
    target: &'a ManifestView,
    fallbacks: &'a [ManifestView],
    overlay: PathTree<OverlayEntry>,
    required: Vec<RequiredBundle>,
    required_names: HashSet<String>,
    /// Bundles whose closure has already been folded in
    expanded: HashSet<(SourceId, BundleId)>,
    report: MergeReport,
}

impl<'a> ManifestMerger<'a> {
    /// Create a merger; `fallbacks` are in priority order, first wins
    pub fn new(target: &'a ManifestView, fallbacks: &'a [ManifestView]) -> Self {
        Self {
            target,
            fallbacks,
            overlay: PathTree::new(OVERLAY_ROOT),
            required: Vec::new(),
            required_names: HashSet::new(),
            expanded: HashSet::new(),
            report: MergeReport::default(),
        }
    }

    /// Run the automatic pass over every fallback
    ///
    /// # Errors
    ///
    /// Returns a path conflict if a fallback path runs through a leaf of the
    /// target or of the overlay.
    pub fn merge(&mut self) -> Result<&MergeReport> {
        let target = self.target;
        let fallbacks = self.fallbacks;
        for (source, view) in fallbacks.iter().enumerate() {
            let before = self.report.merged;
            for (path, &asset_id) in view.tree().leaves() {
                if target.tree().contains(&path)? {
                    self.report.shadowed_by_target += 1;
                    continue;
                }
                if self.overlay.contains(&path)? {
                    debug!(%path, source = %view.tag(), "path already supplied by a higher-priority snapshot");
                    self.report.shadowed_by_fallback += 1;
                    continue;
                }

                let bundle = view
                    .asset(asset_id)
                    .and_then(|asset| asset.bundle)
                    .and_then(|id| view.graph().get(id))
                    .ok_or_else(|| {
                        graph_error::inconsistent(format!(
                            "asset '{path}' of {} has no owning bundle",
                            view.tag()
                        ))
                    })?;

                self.overlay.insert(
                    &path,
                    OverlayEntry {
                        source,
                        asset: asset_id,
                        bundle_name: bundle.name.clone(),
                    },
                )?;
                self.report.merged += 1;
                self.require_closure(source, bundle.id)?;
            }
            info!(
                snapshot = %view.tag(),
                merged = self.report.merged - before,
                "merged fallback snapshot"
            );
        }

        if self.report.shadowed_by_fallback > 0 {
            info!(
                count = self.report.shadowed_by_fallback,
                "paths shadowed by higher-priority fallbacks"
            );
        }
        Ok(&self.report)
    }

    /// Fold a bundle and its dependency closure into the required set
    fn require_closure(&mut self, source: SourceId, bundle: BundleId) -> Result<()> {
        if !self.expanded.insert((source, bundle)) {
            return Ok(());
        }

        let fallbacks = self.fallbacks;
        let view = &fallbacks[source];
        let graph = view.graph();
        for id in graph.closure(bundle)? {
            let Some(dep) = graph.get(id) else { continue };
            if self.target.graph().contains(&dep.name) || self.required_names.contains(&dep.name) {
                continue;
            }
            debug!(bundle = %dep.name, source = %view.tag(), "bundle required");
            self.required_names.insert(dep.name.clone());
            self.required.push(RequiredBundle {
                name: dep.name.clone(),
                source,
                bundle: id,
            });
        }
        Ok(())
    }

    /// Alias an overlay leaf to an additional path
    ///
    /// The new path reuses the asset and bundle of `src`. Only previously
    /// merged content can be aliased; the target and fallback trees are not
    /// searched.
    ///
    /// # Errors
    ///
    /// Returns a not found error if `src` is not a leaf of the overlay, and a
    /// path conflict if `dst` already exists in the target or the overlay.
    pub fn copy_tree_node(&mut self, src: &str, dst: &str) -> Result<()> {
        let entry = self
            .overlay
            .get(src)
            .cloned()
            .ok_or_else(|| tree_error::not_found(src))?;
        self.insert_alias(dst, entry)?;
        debug!(%src, %dst, "aliased overlay path");
        Ok(())
    }

    /// Alias every overlay leaf under directory `src_dir` beneath `dst_dir`
    ///
    /// Returns the number of aliased leaves.
    ///
    /// # Errors
    ///
    /// Returns a not found error if `src_dir` is not an overlay directory.
    pub fn copy_tree_subtree(&mut self, src_dir: &str, dst_dir: &str) -> Result<usize> {
        let leaves: Vec<(String, OverlayEntry)> = self
            .overlay
            .leaves_under(src_dir)?
            .into_iter()
            .map(|(rel, entry)| (rel, entry.clone()))
            .collect();

        let dst_dir = dst_dir.trim_end_matches('/');
        for (rel, entry) in &leaves {
            self.insert_alias(&format!("{dst_dir}/{rel}"), entry.clone())?;
        }
        debug!(%src_dir, %dst_dir, count = leaves.len(), "aliased overlay directory");
        Ok(leaves.len())
    }

    fn insert_alias(&mut self, dst: &str, entry: OverlayEntry) -> Result<()> {
        if self.target.tree().contains(dst)? {
            return Err(tree_error::conflict(dst, "path already present in target"));
        }
        self.overlay.insert(dst, entry)?;
        self.report.aliased += 1;
        Ok(())
    }

    /// Pull a bundle forward by name, even if none of its assets has a path
    ///
    /// The first fallback holding the bundle supplies it and its closure. A
    /// bundle the target already ships is left alone.
    ///
    /// # Errors
    ///
    /// Returns a not found error if no fallback has a bundle called `name`.
    pub fn require_bundle(&mut self, name: &str) -> Result<()> {
        if self.target.graph().contains(name) {
            debug!(bundle = %name, "requested bundle already in target");
            return Ok(());
        }

        let fallbacks = self.fallbacks;
        let (source, bundle) = fallbacks
            .iter()
            .enumerate()
            .find_map(|(source, view)| view.graph().find(name).map(|b| (source, b.id)))
            .ok_or_else(|| graph_error::bundle_not_found(name))?;

        self.require_closure(source, bundle)?;
        self.report.requested_bundles += 1;
        Ok(())
    }

    pub fn overlay(&self) -> &PathTree<OverlayEntry> {
        &self.overlay
    }

    pub fn required_bundles(&self) -> &[RequiredBundle] {
        &self.required
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Hand the merge state over to the rebuild stage
    pub fn finish(self) -> MergeResult {
        MergeResult {
            overlay: self.overlay,
            required: self.required,
            report: self.report,
        }
    }
}
