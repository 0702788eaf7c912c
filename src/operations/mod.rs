//! High-level operations
//!
//! - BuildOperation: the mod build pipeline, from configuration to staged
//!   output
//!
//! The operations coordinate with:
//! - Manifest engine: merge and rebuild (from manifest module)
//! - Store: snapshot manifests and bundle payloads (from store module)
//! - Transaction: rollback on error (from transaction module)
//! - UI: progress reporting (from ui module)

pub mod build;

pub use build::{BuildOperation, BuildOptions, BuildSummary};
