//! Configuration file handling for patchbundle
//!
//! A mod build is described by a single YAML file (`patchbundle.yaml` by
//! default) naming the target snapshot, the fallback snapshots in priority
//! order, manual path aliases and extra bundles to pull forward.

pub mod mod_config;

pub use mod_config::{AliasRule, CONFIG_FILE, ModConfig, SnapshotRef};
