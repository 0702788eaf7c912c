//! Mod build configuration (patchbundle.yaml)
//!
//! ```yaml
//! name: chronosphere
//! target:
//!   client_version: 2.6.41
//!   res_version: 25-09-28-12-13-16_6485b3
//! fallbacks:
//!   - client_version: 2.4.61
//!     res_version: 25-02-10-11-39-31_a1dc28
//! aliases:
//!   - from: activity/act42side/zonemaps
//!     to: ui/zonemaps
//!     recursive: true
//! bundles:
//!   - anon/activity_table.ab
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, config as config_error, fs as fs_error};
use crate::manifest::SnapshotTag;

/// Default configuration file name
pub const CONFIG_FILE: &str = "patchbundle.yaml";

/// Reference to one resource snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotRef {
    pub client_version: String,
    pub res_version: String,

    /// Explicit manifest location, overriding the store layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

impl SnapshotRef {
    pub fn tag(&self) -> SnapshotTag {
        SnapshotTag::new(&self.client_version, &self.res_version)
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.client_version.trim().is_empty() {
            return Err(config_error::invalid(format!("{role} has an empty client_version")));
        }
        if self.res_version.trim().is_empty() {
            return Err(config_error::invalid(format!("{role} has an empty res_version")));
        }
        if has_path_separator(&self.res_version) || self.res_version == ".." {
            return Err(config_error::invalid(format!(
                "{role} res_version '{}' must be a single path segment",
                self.res_version
            )));
        }
        Ok(())
    }
}

/// Manual path alias applied after the automatic merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasRule {
    pub from: String,
    pub to: String,

    /// Alias every leaf below `from` instead of a single leaf
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
}

/// Mod build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModConfig {
    pub name: String,
    pub target: SnapshotRef,

    /// Fallback snapshots, highest priority first
    #[serde(default)]
    pub fallbacks: Vec<SnapshotRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<AliasRule>,

    /// Bundles to pull forward by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<String>,
}

fn has_path_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

impl ModConfig {
    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns a not found error if the file does not exist, and a parse
    /// error naming the file if its content is not a valid configuration.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(config_error::not_found(path.display().to_string()));
        }
        let yaml = fs::read_to_string(path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        let config: Self = serde_yaml::from_str(&yaml)
            .map_err(|e| config_error::parse_failed(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(config_error::invalid("name must not be empty"));
        }
        if has_path_separator(&self.name) || self.name == "." || self.name == ".." {
            return Err(config_error::invalid(format!(
                "name '{}' must not contain path separators",
                self.name
            )));
        }

        self.target.validate("target")?;

        if self.fallbacks.is_empty() {
            return Err(config_error::invalid("at least one fallback snapshot is required"));
        }

        let mut seen = HashSet::new();
        for (i, fallback) in self.fallbacks.iter().enumerate() {
            fallback.validate(&format!("fallback #{i}"))?;
            if fallback.res_version == self.target.res_version {
                return Err(config_error::invalid(format!(
                    "fallback #{i} is the target snapshot '{}'",
                    fallback.res_version
                )));
            }
            if !seen.insert(fallback.res_version.as_str()) {
                return Err(config_error::invalid(format!(
                    "snapshot '{}' is listed as a fallback more than once",
                    fallback.res_version
                )));
            }
        }

        for alias in &self.aliases {
            let from = alias.from.trim_matches('/');
            let to = alias.to.trim_matches('/');
            if from.is_empty() || to.is_empty() {
                return Err(config_error::invalid("alias paths must not be empty"));
            }
            if from == to {
                return Err(config_error::invalid(format!(
                    "alias '{from}' points at itself"
                )));
            }
        }

        if let Some(empty) = self.bundles.iter().position(|b| b.trim().is_empty()) {
            return Err(config_error::invalid(format!("bundle request #{empty} is empty")));
        }

        Ok(())
    }
}
