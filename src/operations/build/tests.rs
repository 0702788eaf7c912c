//! Tests for the build pipeline

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::config::{AliasRule, SnapshotRef};
use crate::error::PatchError;
use crate::manifest::RawManifest;
use crate::operations::build::stage::STAGING_FILE;
use crate::store::MANIFEST_FILE;

fn write_snapshot(store: &LocalStore, res_version: &str, manifest: &serde_json::Value, payloads: &[&str]) {
    let dir = store.snapshot_dir(res_version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(store.manifest_path(res_version), manifest.to_string()).unwrap();
    for name in payloads {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("{res_version}:{name}")).unwrap();
    }
}

/// Store with target `r2` and fallback `r1`
fn fixture() -> (TempDir, LocalStore) {
    let temp = TempDir::new().unwrap();
    let store = LocalStore::new(temp.path().join("store"));

    write_snapshot(
        &store,
        "r2",
        &json!({
            "bundles": [{"name": "a.ab", "sccIndex": 0, "allDependencies": []}],
            "assetToBundleList": [{"assetName": "ui/x", "bundleIndex": 0, "path": "ui/x.png"}],
        }),
        &["a.ab"],
    );
    write_snapshot(
        &store,
        "r1",
        &json!({
            "bundles": [
                {"name": "a.ab", "sccIndex": 0, "allDependencies": []},
                {"name": "b.ab", "sccIndex": 1, "allDependencies": [0]},
                {"name": "anon/z.ab", "sccIndex": 2, "allDependencies": []},
            ],
            "assetToBundleList": [
                {"assetName": "ui/x", "bundleIndex": 0, "path": "ui/x.png"},
                {"assetName": "ui/y", "bundleIndex": 1, "path": "ui/y.png"},
                {"assetName": "act/zonemaps/zone1", "bundleIndex": 1, "path": "act/zonemaps/zone1"},
                {"assetName": "table", "bundleIndex": 2},
            ],
        }),
        &["a.ab", "b.ab", "anon/z.ab"],
    );
    (temp, store)
}

fn config() -> ModConfig {
    ModConfig {
        name: "test".to_string(),
        target: SnapshotRef {
            client_version: "2.0".to_string(),
            res_version: "r2".to_string(),
            manifest: None,
        },
        fallbacks: vec![SnapshotRef {
            client_version: "1.0".to_string(),
            res_version: "r1".to_string(),
            manifest: None,
        }],
        aliases: Vec::new(),
        bundles: Vec::new(),
    }
}

fn options(root: &Path) -> BuildOptions {
    BuildOptions {
        base_dir: root.to_path_buf(),
        output: Some(root.join("mod/test")),
        dump_dir: Some(root.join("tmp/test")),
        no_dump: false,
        dry_run: false,
    }
}

fn build(config: &ModConfig, options: &BuildOptions, store: &LocalStore) -> Result<BuildSummary> {
    BuildOperation::new(config, options, store, store).execute()
}

#[test]
fn test_build_stages_output() {
    let (temp, store) = fixture();
    let options = options(temp.path());
    let summary = build(&config(), &options, &store).unwrap();

    assert_eq!(summary.report.merged, 2);
    assert_eq!(summary.report.shadowed_by_target, 1);
    assert_eq!(summary.appended_assets, 2);
    assert_eq!(summary.staged.len(), 1);
    assert_eq!(summary.staged[0].bundle, "b.ab");
    assert_eq!(summary.staged[0].res_version, "r1");

    let output = temp.path().join("mod/test");
    assert_eq!(fs::read_to_string(output.join("bundles/b.ab")).unwrap(), "r1:b.ab");

    let manifest = RawManifest::from_path(&output.join(MANIFEST_FILE)).unwrap();
    let bundles = manifest.bundles.as_ref().unwrap();
    assert_eq!(bundles.len(), 2);
    assert_eq!(bundles[1].name.as_deref(), Some("b.ab"));
    assert_eq!(bundles[1].all_dependencies, Some(vec![0]));
    assert_eq!(manifest.asset_count(), 3);

    let staging: Vec<StagedBundle> =
        serde_json::from_str(&fs::read_to_string(output.join(STAGING_FILE)).unwrap()).unwrap();
    assert_eq!(staging, summary.staged);
}

#[test]
fn test_build_writes_tree_dumps() {
    let (temp, store) = fixture();
    build(&config(), &options(temp.path()), &store).unwrap();

    let dumps = temp.path().join("tmp/test");
    for file in ["target.txt", "fallback-0-r1.txt", "overlay.txt", "overlay-aliased.txt"] {
        assert!(dumps.join(file).is_file(), "{file} missing");
    }
    let overlay = fs::read_to_string(dumps.join("overlay.txt")).unwrap();
    assert!(overlay.starts_with("overlay/\n"));
    assert!(overlay.contains("y.png"));
    assert!(!overlay.contains("x.png"));
}

#[test]
fn test_build_no_dump() {
    let (temp, store) = fixture();
    let options = BuildOptions {
        no_dump: true,
        ..options(temp.path())
    };
    build(&config(), &options, &store).unwrap();
    assert!(!temp.path().join("tmp").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let (temp, store) = fixture();
    let options = BuildOptions {
        dry_run: true,
        ..options(temp.path())
    };
    let summary = build(&config(), &options, &store).unwrap();

    assert!(summary.dry_run);
    assert!(summary.staged.is_empty());
    assert_eq!(summary.payloads.len(), 1);
    assert!(!temp.path().join("mod").exists());
    assert!(!temp.path().join("tmp").exists());
}

#[test]
fn test_build_applies_aliases_and_bundle_requests() {
    let (temp, store) = fixture();
    let mut config = config();
    config.aliases = vec![
        AliasRule {
            from: "ui/y.png".to_string(),
            to: "ui/y_alt.png".to_string(),
            recursive: false,
        },
        AliasRule {
            from: "act/zonemaps".to_string(),
            to: "ui/zonemaps".to_string(),
            recursive: true,
        },
    ];
    config.bundles = vec!["anon/z.ab".to_string()];

    let summary = build(&config, &options(temp.path()), &store).unwrap();
    assert_eq!(summary.report.aliased, 2);
    assert_eq!(summary.report.requested_bundles, 1);

    let staged: Vec<&str> = summary.staged.iter().map(|s| s.bundle.as_str()).collect();
    assert_eq!(staged, vec!["b.ab", "anon/z.ab"]);

    let output = temp.path().join("mod/test");
    assert!(output.join("bundles/anon/z.ab").is_file());
    let manifest = RawManifest::from_path(&output.join(MANIFEST_FILE)).unwrap();
    let paths: Vec<&str> = manifest
        .asset_to_bundle_list
        .as_ref()
        .unwrap()
        .iter()
        .filter_map(|a| a.addressable_path())
        .collect();
    assert!(paths.contains(&"ui/y_alt.png"));
    assert!(paths.contains(&"ui/zonemaps/zone1"));
}

#[test]
fn test_alias_of_unmerged_path_fails() {
    let (temp, store) = fixture();
    let mut config = config();
    config.aliases = vec![AliasRule {
        from: "ui/x.png".to_string(),
        to: "ui/x_alt.png".to_string(),
        recursive: false,
    }];

    let err = build(&config, &options(temp.path()), &store).unwrap_err();
    assert!(matches!(err, PatchError::PathNotFound { .. }));
    assert!(!temp.path().join("mod").exists());
}

#[test]
fn test_missing_payload_leaves_no_output() {
    let (temp, store) = fixture();
    fs::remove_file(store.snapshot_dir("r1").join("b.ab")).unwrap();

    let err = build(&config(), &options(temp.path()), &store).unwrap_err();
    assert!(matches!(err, PatchError::FileNotFound { .. }));
    assert!(!temp.path().join("mod").exists());
}

#[test]
fn test_missing_fallback_manifest() {
    let (temp, store) = fixture();
    let mut config = config();
    config.fallbacks[0].res_version = "r0".to_string();

    let err = build(&config, &options(temp.path()), &store).unwrap_err();
    assert!(matches!(err, PatchError::FileNotFound { .. }));
}

#[test]
fn test_explicit_manifest_path_is_relative_to_base_dir() {
    let (temp, store) = fixture();
    let elsewhere = temp.path().join("snapshots");
    fs::create_dir_all(&elsewhere).unwrap();
    fs::rename(store.manifest_path("r1"), elsewhere.join("r1.json")).unwrap();

    let mut config = config();
    config.fallbacks[0].manifest = Some("snapshots/r1.json".into());

    let summary = build(&config, &options(temp.path()), &store).unwrap();
    assert_eq!(summary.staged.len(), 1);
}

#[test]
fn test_default_output_and_dump_dirs() {
    let config = config();
    let options = BuildOptions::default();
    assert_eq!(options.output_dir(&config), Path::new("mod/test"));
    assert_eq!(options.dump_dir(&config), Some(Path::new("tmp/test").to_path_buf()));

    let no_dump = BuildOptions {
        no_dump: true,
        ..BuildOptions::default()
    };
    assert_eq!(no_dump.dump_dir(&config), None);
}
