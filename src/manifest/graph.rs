//! Bundle dependency graph
//!
//! Bundles are stored in an arena addressed by their position in the
//! manifest's bundle list. Dependencies are adjacency lists of those
//! positions, resolved once at parse time.
//!
//! ## Cycles
//!
//! Bundles that share an `sccIndex` form one load-ordering group, and such a
//! group may contain dependency cycles. Cycles are a normal feature of these
//! graphs, not an error: [`BundleGraph::closure`] records every bundle as
//! visited before expanding its dependencies, so it terminates on any graph.
//!
//! ```text
//! a -> b -> c
//!      ^    |
//!      +----+        closure(a) = [a, b, c]
//! ```

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::{Result, graph as graph_error, manifest as manifest_error};
use crate::manifest::raw::RawBundle;

/// Position of a bundle in its snapshot's bundle list
pub type BundleId = usize;

/// A bundle with its dependencies resolved to arena positions
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    /// Opaque flag bits
    pub props: Option<Value>,
    /// Load ordering group
    pub sequence_index: Option<i64>,
    pub dependencies: Vec<BundleId>,
}

/// Directed graph over one snapshot's bundles
#[derive(Debug, Clone, Default)]
pub struct BundleGraph {
    bundles: Vec<Bundle>,
    records: Vec<RawBundle>,
    by_name: HashMap<String, BundleId>,
}

/// Convert a raw dependency index, rejecting negative and out-of-range values
fn checked_index(source_name: &str, owner: &str, raw: i64, len: usize) -> Result<BundleId> {
    usize::try_from(raw)
        .ok()
        .filter(|&idx| idx < len)
        .ok_or_else(|| {
            manifest_error::malformed(
                source_name,
                format!("bundle '{owner}' depends on index {raw}, but only {len} bundles exist"),
            )
        })
}

impl BundleGraph {
    /// Build a graph from raw bundle records
    ///
    /// # Errors
    ///
    /// Returns a format error if a bundle has no name, two bundles share a
    /// name, or a dependency index is out of range.
    pub fn from_records(source_name: &str, records: Vec<RawBundle>) -> Result<Self> {
        let len = records.len();
        let mut bundles = Vec::with_capacity(len);
        let mut by_name = HashMap::with_capacity(len);

        for (id, record) in records.iter().enumerate() {
            let name = record
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    manifest_error::malformed(source_name, format!("bundle #{id} has no name"))
                })?;

            if by_name.insert(name.clone(), id).is_some() {
                return Err(manifest_error::malformed(
                    source_name,
                    format!("bundle name '{name}' appears more than once"),
                ));
            }

            let dependencies = record
                .all_dependencies
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|&raw| checked_index(source_name, &name, raw, len))
                .collect::<Result<Vec<_>>>()?;

            bundles.push(Bundle {
                id,
                name,
                props: record.props.clone(),
                sequence_index: record.scc_index,
                dependencies,
            });
        }

        Ok(Self {
            bundles,
            records,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn get(&self, id: BundleId) -> Option<&Bundle> {
        self.bundles.get(id)
    }

    /// The raw record a bundle was parsed from
    pub fn record(&self, id: BundleId) -> Option<&RawBundle> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[RawBundle] {
        &self.records
    }

    pub fn find(&self, name: &str) -> Option<&Bundle> {
        self.by_name.get(name).map(|&id| &self.bundles[id])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.iter()
    }

    /// Highest sequence index in use, if any bundle carries one
    pub fn max_sequence_index(&self) -> Option<i64> {
        self.bundles.iter().filter_map(|b| b.sequence_index).max()
    }

    /// All bundles reachable from `start`, including `start` itself
    ///
    /// Depth-first and memoized: each bundle is marked visited before its
    /// dependencies are expanded, so cycles terminate. The result is in
    /// pre-order, with dependencies visited in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a not found error if `start` is not a bundle of this graph.
    pub fn closure(&self, start: BundleId) -> Result<Vec<BundleId>> {
        if start >= self.bundles.len() {
            return Err(graph_error::bundle_not_found(format!("#{start}")));
        }

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for &dep in self.bundles[id].dependencies.iter().rev() {
                if !visited.contains(&dep) {
                    stack.push(dep);
                }
            }
        }

        Ok(order)
    }

    /// [`closure`](Self::closure) addressed by bundle name
    pub fn closure_of(&self, name: &str) -> Result<Vec<BundleId>> {
        let bundle = self
            .find(name)
            .ok_or_else(|| graph_error::bundle_not_found(name))?;
        self.closure(bundle.id)
    }

    /// Names of the bundles `id` depends on directly
    pub fn dependency_names(&self, id: BundleId) -> Vec<&str> {
        self.bundles.get(id).map_or_else(Vec::new, |bundle| {
            bundle
                .dependencies
                .iter()
                .map(|&dep| self.bundles[dep].name.as_str())
                .collect()
        })
    }
}
