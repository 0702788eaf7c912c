//! Common test utilities for patchbundle integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory with an asset store under `store/`
#[allow(dead_code)]
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Asset store root used by [`patchbundle_cmd`]
    pub fn store_dir(&self) -> PathBuf {
        self.path.join("store")
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Store a snapshot: its manifest plus a payload file per bundle name
    ///
    /// Each payload contains `<res_version>:<bundle_name>`.
    #[allow(dead_code)]
    pub fn write_snapshot(&self, res_version: &str, manifest: &serde_json::Value, payloads: &[&str]) {
        self.write_file(
            &format!("store/{res_version}/manifest.json"),
            &manifest.to_string(),
        );
        for name in payloads {
            self.write_file(
                &format!("store/{res_version}/{name}"),
                &format!("{res_version}:{name}"),
            );
        }
    }

    /// Target `r2` and fallback `r1` with a mod config `patchbundle.yaml`
    ///
    /// `r1` supplies `ui/y.png` in `b.ab`, which depends on `a.ab`; the
    /// target already ships `a.ab`.
    #[allow(dead_code)]
    pub fn with_basic_mod(&self) {
        self.write_snapshot(
            "r2",
            &serde_json::json!({
                "versionId": "r2",
                "bundles": [{"name": "a.ab", "props": 0, "sccIndex": 0, "allDependencies": []}],
                "assetToBundleList": [
                    {"assetName": "ui/x", "bundleIndex": 0, "name": "x", "path": "ui/x.png"}
                ],
            }),
            &["a.ab"],
        );
        self.write_snapshot(
            "r1",
            &serde_json::json!({
                "versionId": "r1",
                "bundles": [
                    {"name": "a.ab", "props": 0, "sccIndex": 0, "allDependencies": []},
                    {"name": "b.ab", "props": 4, "sccIndex": 1, "allDependencies": [0]},
                ],
                "assetToBundleList": [
                    {"assetName": "ui/x", "bundleIndex": 0, "name": "x", "path": "ui/x.png"},
                    {"assetName": "ui/y", "bundleIndex": 1, "name": "y", "path": "ui/y.png"},
                ],
            }),
            &["a.ab", "b.ab"],
        );
        self.write_file(
            "patchbundle.yaml",
            r#"name: basic
target:
  client_version: "2.0"
  res_version: r2
fallbacks:
  - client_version: "1.0"
    res_version: r1
"#,
        );
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Command for the patchbundle binary, run inside `workspace` against its store
#[allow(deprecated, dead_code)]
pub fn patchbundle_cmd(workspace: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("patchbundle").expect("Failed to find patchbundle binary");
    cmd.current_dir(&workspace.path)
        .env("PATCHBUNDLE_STORE_DIR", workspace.store_dir())
        .env_remove("RUST_LOG");
    cmd
}

/// Command for the patchbundle binary with no workspace
#[allow(deprecated, dead_code)]
pub fn patchbundle_bin() -> Command {
    Command::cargo_bin("patchbundle").expect("Failed to find patchbundle binary")
}

/// Parse a JSON file
#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&content).expect("Failed to parse JSON file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_workspace_basic_mod() {
        let workspace = TestWorkspace::new();
        workspace.with_basic_mod();
        assert!(workspace.file_exists("store/r1/manifest.json"));
        assert_eq!(workspace.read_file("store/r1/b.ab"), "r1:b.ab");
    }
}
