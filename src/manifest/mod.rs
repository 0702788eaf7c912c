//! Manifest merge engine
//!
//! Pipeline, one stage at a time:
//!
//! ```text
//! RawManifest --parse--> ManifestView (target, fallbacks...)
//!                              |
//!                        ManifestMerger  --aliases / bundle requests-->
//!                              |
//!                         MergeResult
//!                              |
//!                      ManifestRebuilder --> RebuiltManifest
//! ```
//!
//! Views are read-only once parsed. The merger owns its overlay tree until
//! the rebuilder consumes it.

pub mod graph;
pub mod merge;
pub mod raw;
pub mod rebuild;
pub mod tree;
pub mod view;


pub use graph::{Bundle, BundleGraph, BundleId};
pub use merge::{ManifestMerger, MergeReport, MergeResult, OverlayEntry, RequiredBundle};
pub use raw::{RawAsset, RawBundle, RawManifest};
pub use rebuild::{AppendedBundle, ManifestRebuilder, RebuiltManifest};
pub use tree::PathTree;
pub use view::{ManifestView, SnapshotTag};
