//! Local asset store
//!
//! Snapshots downloaded ahead of time are kept in a directory per resource
//! version, holding the decoded manifest and the bundle payload files:
//!
//! ```text
//! ~/.cache/patchbundle/assets/
//! └── <res_version>/
//!     ├── manifest.json
//!     └── <bundle_name>
//! ```
//!
//! Bundle names may contain `/`, in which case the payload lives in a
//! matching subdirectory.

pub mod stats;

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, fs as fs_error, store as store_error};

pub use stats::{StoreStats, StoredSnapshot};

/// Store directory name under the user's cache directory
const STORE_DIR: &str = "patchbundle";

/// Assets subdirectory within the store directory
const ASSETS_DIR: &str = "assets";

/// Environment variable overriding the store location
pub const STORE_DIR_ENV: &str = "PATCHBUNDLE_STORE_DIR";

/// Decoded manifest file name inside a snapshot directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Get the default store directory path
///
/// Returns `~/.cache/patchbundle/assets` on Unix or the equivalent on other
/// platforms. Can be overridden with the `PATCHBUNDLE_STORE_DIR`
/// environment variable.
pub fn store_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(STORE_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let base = dirs::cache_dir()
        .ok_or_else(|| store_error::operation_failed("Could not determine cache directory"))?;

    Ok(base.join(STORE_DIR).join(ASSETS_DIR))
}

/// Resolves bundle payload files for a snapshot
pub trait BundleFetcher {
    /// Path of the payload of `bundle_name` in snapshot `res_version`
    fn fetch(&self, res_version: &str, bundle_name: &str) -> Result<PathBuf>;
}

/// Store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store at `root`, or at the default location
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        match root {
            Some(root) => Ok(Self::new(root)),
            None => Ok(Self::new(store_dir()?)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_dir(&self, res_version: &str) -> PathBuf {
        self.root.join(res_version)
    }

    pub fn manifest_path(&self, res_version: &str) -> PathBuf {
        self.snapshot_dir(res_version).join(MANIFEST_FILE)
    }

    /// Location of a bundle payload, whether or not it exists
    pub fn bundle_path(&self, res_version: &str, bundle_name: &str) -> Result<PathBuf> {
        Ok(self
            .snapshot_dir(res_version)
            .join(bundle_relative_path(bundle_name)?))
    }
}

/// Bundle name as a relative file path
///
/// # Errors
///
/// Returns a store error if the name is empty or would escape the directory
/// it is joined to.
pub fn bundle_relative_path(bundle_name: &str) -> Result<&Path> {
    let relative = Path::new(bundle_name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if bundle_name.is_empty() || escapes {
        return Err(store_error::operation_failed(format!(
            "Bundle name '{bundle_name}' is not a relative path"
        )));
    }
    Ok(relative)
}

impl BundleFetcher for LocalStore {
    fn fetch(&self, res_version: &str, bundle_name: &str) -> Result<PathBuf> {
        let path = self.bundle_path(res_version, bundle_name)?;
        if !path.is_file() {
            return Err(fs_error::not_found(path.display().to_string()));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatchError;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_store_dir_from_env() {
        let original = std::env::var(STORE_DIR_ENV).ok();
        unsafe {
            std::env::set_var(STORE_DIR_ENV, "/tmp/patchbundle-store");
        }

        assert_eq!(store_dir().unwrap(), PathBuf::from("/tmp/patchbundle-store"));

        unsafe {
            match original {
                Some(o) => std::env::set_var(STORE_DIR_ENV, o),
                None => std::env::remove_var(STORE_DIR_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_store_dir_default() {
        let original = std::env::var(STORE_DIR_ENV).ok();
        unsafe {
            std::env::remove_var(STORE_DIR_ENV);
        }

        if let Ok(dir) = store_dir() {
            assert!(dir.ends_with("patchbundle/assets"));
        }

        unsafe {
            if let Some(o) = original {
                std::env::set_var(STORE_DIR_ENV, o);
            }
        }
    }

    #[test]
    fn test_layout() {
        let store = LocalStore::new("/store");
        assert_eq!(store.snapshot_dir("r1"), PathBuf::from("/store/r1"));
        assert_eq!(
            store.manifest_path("r1"),
            PathBuf::from("/store/r1/manifest.json")
        );
        assert_eq!(
            store.bundle_path("r1", "anon/table.ab").unwrap(),
            PathBuf::from("/store/r1/anon/table.ab")
        );
    }

    #[test]
    fn test_bundle_path_rejects_escapes() {
        let store = LocalStore::new("/store");
        assert!(store.bundle_path("r1", "../r2/x.ab").is_err());
        assert!(store.bundle_path("r1", "/etc/passwd").is_err());
        assert!(store.bundle_path("r1", "").is_err());
    }

    #[test]
    fn test_fetch() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        std::fs::create_dir_all(temp.path().join("r1/ui")).unwrap();
        std::fs::write(temp.path().join("r1/ui/x.ab"), b"payload").unwrap();

        let path = store.fetch("r1", "ui/x.ab").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"payload");

        let err = store.fetch("r1", "ui/missing.ab").unwrap_err();
        assert!(matches!(err, PatchError::FileNotFound { .. }));
    }
}
