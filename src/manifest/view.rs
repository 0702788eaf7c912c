//! Parsed view of one snapshot's manifest
//!
//! A [`ManifestView`] splits a raw manifest into a [`BundleGraph`] and a
//! [`PathTree`] of path-addressed assets. Assets without a path are kept
//! aside as dangling: they stay in the manifest but are not addressable.
//!
//! Views are built once and never mutated afterwards.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Result, manifest as manifest_error};
use crate::manifest::graph::{BundleGraph, BundleId};
use crate::manifest::raw::{RawAsset, RawManifest};
use crate::manifest::tree::PathTree;

/// Position of an asset in its snapshot's asset list
pub type AssetId = usize;

/// Identity of one resource snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotTag {
    pub client_version: String,
    pub res_version: String,
}

impl SnapshotTag {
    pub fn new(client_version: impl Into<String>, res_version: impl Into<String>) -> Self {
        Self {
            client_version: client_version.into(),
            res_version: res_version.into(),
        }
    }
}

impl fmt::Display for SnapshotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.client_version, self.res_version)
    }
}

/// An asset record with its owning bundle resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    /// Owning bundle, absent only for dangling records without a `bundleIndex`
    pub bundle: Option<BundleId>,
    pub record: RawAsset,
}

impl Asset {
    pub fn path(&self) -> Option<&str> {
        self.record.addressable_path()
    }

    pub fn asset_name(&self) -> Option<&str> {
        self.record.asset_name.as_deref()
    }
}

/// One snapshot's bundles and assets, indexed for merging
#[derive(Debug, Clone)]
pub struct ManifestView {
    tag: SnapshotTag,
    graph: BundleGraph,
    assets: Vec<Asset>,
    tree: PathTree<AssetId>,
    dangling: Vec<AssetId>,
    extra: Map<String, Value>,
}

impl ManifestView {
    /// Parse a raw manifest
    ///
    /// # Errors
    ///
    /// Returns a format error if the bundle or asset collection is missing,
    /// if a bundle record is malformed, if an addressable asset has no
    /// `bundleIndex`, if an asset path has a leading, trailing or doubled
    /// slash, or if any `bundleIndex` is out of range. A path that
    /// appears twice, or below another asset's path, is a path conflict.
    pub fn parse(tag: SnapshotTag, raw: RawManifest) -> Result<Self> {
        let source_name = tag.to_string();
        let RawManifest {
            bundles,
            asset_to_bundle_list,
            extra,
        } = raw;

        let bundles = bundles
            .ok_or_else(|| manifest_error::malformed(&source_name, "missing 'bundles'"))?;
        let records = asset_to_bundle_list.ok_or_else(|| {
            manifest_error::malformed(&source_name, "missing 'assetToBundleList'")
        })?;

        let graph = BundleGraph::from_records(&source_name, bundles)?;
        let mut tree = PathTree::new(&tag.res_version);
        let mut assets = Vec::with_capacity(records.len());
        let mut dangling = Vec::new();

        for (id, record) in records.into_iter().enumerate() {
            let bundle = resolve_bundle_index(&source_name, id, &record, graph.len())?;

            match record.addressable_path() {
                Some(path) => {
                    if bundle.is_none() {
                        return Err(manifest_error::malformed(
                            &source_name,
                            format!("asset '{path}' has no bundleIndex"),
                        ));
                    }
                    if !is_canonical_path(path) {
                        return Err(manifest_error::malformed(
                            &source_name,
                            format!("asset path '{path}' has an empty segment"),
                        ));
                    }
                    tree.insert(path, id)?;
                }
                None => dangling.push(id),
            }

            assets.push(Asset { id, bundle, record });
        }

        Ok(Self {
            tag,
            graph,
            assets,
            tree,
            dangling,
            extra,
        })
    }

    pub fn tag(&self) -> &SnapshotTag {
        &self.tag
    }

    pub fn graph(&self) -> &BundleGraph {
        &self.graph
    }

    pub fn tree(&self) -> &PathTree<AssetId> {
        &self.tree
    }

    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Assets that have no path and are kept out of the tree
    pub fn dangling(&self) -> impl Iterator<Item = &Asset> {
        self.dangling.iter().map(|&id| &self.assets[id])
    }

    /// Name of the bundle owning the asset at `path`
    pub fn owning_bundle_name(&self, path: &str) -> Option<&str> {
        let asset = self.asset(*self.tree.get(path)?)?;
        Some(self.graph.get(asset.bundle?)?.name.as_str())
    }

    /// Reassemble the raw manifest this view was parsed from
    pub fn to_raw(&self) -> RawManifest {
        RawManifest {
            bundles: Some(self.graph.records().to_vec()),
            asset_to_bundle_list: Some(self.assets.iter().map(|a| a.record.clone()).collect()),
            extra: self.extra.clone(),
        }
    }
}

/// A relative path without leading, trailing or doubled slashes
fn is_canonical_path(path: &str) -> bool {
    path.split('/').all(|segment| !segment.is_empty())
}

fn resolve_bundle_index(
    source_name: &str,
    id: AssetId,
    record: &RawAsset,
    bundle_count: usize,
) -> Result<Option<BundleId>> {
    let Some(raw) = record.bundle_index else {
        return Ok(None);
    };
    usize::try_from(raw)
        .ok()
        .filter(|&idx| idx < bundle_count)
        .map(Some)
        .ok_or_else(|| {
            let label = record
                .addressable_path()
                .map_or_else(|| format!("#{id}"), |p| format!("'{p}'"));
            manifest_error::malformed(
                source_name,
                format!("asset {label} has bundleIndex {raw}, but only {bundle_count} bundles exist"),
            )
        })
}
