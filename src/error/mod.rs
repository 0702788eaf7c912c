//! Error types and handling for patchbundle
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`manifest`]: Malformed or incomplete raw manifests
//! - [`tree`]: Path tree conflicts and lookups
//! - [`graph`]: Bundle lookups and index consistency
//! - [`config`]: Mod configuration errors
//! - [`fs`]: File system errors
//! - [`store`]: Asset store errors

pub mod config;
pub mod fs;
pub mod graph;
pub mod manifest;
pub mod store;
pub mod tree;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for patchbundle operations
#[derive(Error, Diagnostic, Debug)]
pub enum PatchError {
    // Manifest format errors
    #[error("Malformed manifest '{source_name}': {message}")]
    #[diagnostic(
        code(patchbundle::manifest::format),
        help("The manifest must contain 'bundles' and 'assetToBundleList' arrays with in-range indices")
    )]
    ManifestFormat {
        source_name: String,
        message: String,
    },

    // Path tree errors
    #[error("Path conflict at '{path}': {reason}")]
    #[diagnostic(code(patchbundle::tree::conflict))]
    PathConflict { path: String, reason: String },

    #[error("Path '{path}' not found")]
    #[diagnostic(
        code(patchbundle::tree::not_found),
        help("Aliases can only reference paths that were pulled forward by the merge")
    )]
    PathNotFound { path: String },

    // Bundle graph errors
    #[error("Bundle '{name}' not found")]
    #[diagnostic(code(patchbundle::graph::bundle_not_found))]
    BundleNotFound { name: String },

    #[error("Index consistency error: {message}")]
    #[diagnostic(
        code(patchbundle::graph::consistency),
        help("The merge and rebuild stages were run against different snapshots")
    )]
    IndexConsistency { message: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(patchbundle::config::not_found),
        help("Pass the mod configuration path explicitly, e.g. 'patchbundle build mods/chronosphere.yaml'")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(patchbundle::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(patchbundle::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(patchbundle::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(patchbundle::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(patchbundle::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(patchbundle::fs::io_error))]
    IoError { message: String },

    // Store errors
    #[error("Store operation failed: {message}")]
    #[diagnostic(code(patchbundle::store::operation_failed))]
    StoreOperationFailed { message: String },
}

impl From<std::io::Error> for PatchError {
    fn from(err: std::io::Error) -> Self {
        PatchError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PatchError {
    fn from(err: serde_yaml::Error) -> Self {
        PatchError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        PatchError::ManifestFormat {
            source_name: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = PatchError::BundleNotFound {
            name: "ui/zonemaps.ab".to_string(),
        };
        assert_eq!(err.to_string(), "Bundle 'ui/zonemaps.ab' not found");
    }

    #[test]
    fn test_error_code() {
        let err = PatchError::PathConflict {
            path: "ui/x".to_string(),
            reason: "already a leaf".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("patchbundle::tree::conflict".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let patch_err: PatchError = io_err.into();
        assert!(matches!(patch_err, PatchError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str("invalid: yaml: content: [unclosed");
        let patch_err: PatchError = parse_result.unwrap_err().into();
        assert!(matches!(patch_err, PatchError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("{ not json");
        let patch_err: PatchError = parse_result.unwrap_err().into();
        assert!(matches!(patch_err, PatchError::ManifestFormat { .. }));
    }

    test_error_contains!(
        test_manifest_format_error,
        manifest::malformed("snapshot 2.6.41", "missing 'bundles'"),
        "Malformed manifest",
        "snapshot 2.6.41",
        "missing 'bundles'"
    );

    test_error_contains!(
        test_path_conflict_error,
        tree::conflict("ui/x", "segment 'ui' is a leaf"),
        "Path conflict at 'ui/x'",
        "segment 'ui' is a leaf"
    );

    test_error_contains!(
        test_path_not_found_error,
        tree::not_found("activity/zonemaps"),
        "Path 'activity/zonemaps' not found"
    );

    test_error_contains!(
        test_consistency_error,
        graph::inconsistent("dependency 'A' of 'B' has no index"),
        "Index consistency error",
        "dependency 'A'"
    );

    test_error_contains!(
        test_config_invalid_error,
        config::invalid("fallbacks must not be empty"),
        "Invalid configuration",
        "fallbacks"
    );

    test_error_contains!(
        test_store_error,
        store::operation_failed("could not determine store directory"),
        "Store operation failed"
    );

    #[test]
    fn test_fs_constructors() {
        assert!(matches!(
            fs::not_found("/tmp/missing"),
            PatchError::FileNotFound { .. }
        ));
        assert!(matches!(
            fs::read_failed("/tmp/a", "denied"),
            PatchError::FileReadFailed { .. }
        ));
        assert!(matches!(
            fs::write_failed("/tmp/a", "disk full"),
            PatchError::FileWriteFailed { .. }
        ));
    }

    #[test]
    fn test_bundle_not_found_constructor() {
        let err = graph::bundle_not_found("anon/table.ab");
        assert!(matches!(err, PatchError::BundleNotFound { .. }));
        assert!(err.to_string().contains("anon/table.ab"));
    }
}
