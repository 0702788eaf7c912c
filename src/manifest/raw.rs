//! Raw manifest records
//!
//! These mirror the decoded resource index one-to-one. Every record keeps the
//! fields it does not interpret in a flattened map, so a manifest that passes
//! through untouched serializes back to the same document.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, fs as fs_error, manifest as manifest_error};

/// Top-level decoded manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawManifest {
    /// Bundle records, indexed by position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles: Option<Vec<RawBundle>>,

    /// Asset records, each pointing at a bundle by index
    #[serde(
        rename = "assetToBundleList",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_to_bundle_list: Option<Vec<RawAsset>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Key names of the interpreted record fields
const NAME: &str = "name";
const PROPS: &str = "props";
const SCC_INDEX: &str = "sccIndex";
const ALL_DEPENDENCIES: &str = "allDependencies";
const ASSET_NAME: &str = "assetName";
const BUNDLE_INDEX: &str = "bundleIndex";
const PATH: &str = "path";

/// Move `key` out of `fields` into a typed value
///
/// An explicit `null` reads as absent but stays in `fields`, so it is
/// written back unchanged.
fn take_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &str,
) -> serde_json::Result<Option<T>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => match fields.remove(key) {
            Some(value) => serde_json::from_value(value).map(Some),
            None => Ok(None),
        },
    }
}

/// One bundle record
///
/// `extra` may hold an interpreted key whose value was `null`; the setters
/// drop it so a key is never written twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Opaque flag bits, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,

    /// Load ordering group; equal values mark one (possibly cyclic) group
    #[serde(rename = "sccIndex", skip_serializing_if = "Option::is_none")]
    pub scc_index: Option<i64>,

    /// Indices into the same manifest's bundle list
    #[serde(rename = "allDependencies", skip_serializing_if = "Option::is_none")]
    pub all_dependencies: Option<Vec<i64>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for RawBundle {
    type Error = serde_json::Error;

    fn try_from(mut fields: Map<String, Value>) -> serde_json::Result<Self> {
        Ok(Self {
            name: take_field(&mut fields, NAME)?,
            props: take_field(&mut fields, PROPS)?,
            scc_index: take_field(&mut fields, SCC_INDEX)?,
            all_dependencies: take_field(&mut fields, ALL_DEPENDENCIES)?,
            extra: fields,
        })
    }
}

impl RawBundle {
    pub fn set_scc_index(&mut self, scc_index: i64) {
        self.extra.remove(SCC_INDEX);
        self.scc_index = Some(scc_index);
    }

    pub fn set_all_dependencies(&mut self, dependencies: Vec<i64>) {
        self.extra.remove(ALL_DEPENDENCIES);
        self.all_dependencies = Some(dependencies);
    }
}

/// One asset record
///
/// Same `null` handling as [`RawBundle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawAsset {
    /// Logical name without extension
    #[serde(rename = "assetName", skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    #[serde(rename = "bundleIndex", skip_serializing_if = "Option::is_none")]
    pub bundle_index: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Slash-separated logical path; empty or absent marks a dangling asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for RawAsset {
    type Error = serde_json::Error;

    fn try_from(mut fields: Map<String, Value>) -> serde_json::Result<Self> {
        Ok(Self {
            asset_name: take_field(&mut fields, ASSET_NAME)?,
            bundle_index: take_field(&mut fields, BUNDLE_INDEX)?,
            name: take_field(&mut fields, NAME)?,
            path: take_field(&mut fields, PATH)?,
            extra: fields,
        })
    }
}

impl RawAsset {
    /// Point the record at `path` in bundle `bundle_index`
    pub fn relocate(&mut self, asset_name: String, bundle_index: i64, path: String) {
        for key in [ASSET_NAME, BUNDLE_INDEX, PATH] {
            self.extra.remove(key);
        }
        self.asset_name = Some(asset_name);
        self.bundle_index = Some(bundle_index);
        self.path = Some(path);
    }
}

impl RawManifest {
    /// Parse a decoded manifest from JSON
    ///
    /// `source_name` only labels errors.
    pub fn from_json(source_name: &str, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| manifest_error::malformed(source_name, e.to_string()))
    }

    /// Read and parse a decoded manifest file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(fs_error::not_found(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_json(&path.display().to_string(), &json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of bundle records, zero when the collection is missing
    pub fn bundle_count(&self) -> usize {
        self.bundles.as_ref().map_or(0, Vec::len)
    }

    /// Number of asset records, zero when the collection is missing
    pub fn asset_count(&self) -> usize {
        self.asset_to_bundle_list.as_ref().map_or(0, Vec::len)
    }
}

impl RawAsset {
    /// The asset path if it is addressable
    pub fn addressable_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }
}
