//! Transaction support for staging output files
//!
//! Every file and directory the build writes goes through a [`Transaction`],
//! so a failed build never leaves a half-staged output directory behind.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new();
//! transaction.copy_file(&payload, &output.join("bundles/a.ab"))?;
//! transaction.write_file(&output.join("manifest.json"), json.as_bytes())?;
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, fs as fs_error};

/// Original content of a file overwritten during the transaction
#[derive(Debug, Clone)]
struct FileBackup {
    path: PathBuf,
    content: Vec<u8>,
}

/// A transaction for atomic output staging
#[derive(Debug)]
pub struct Transaction {
    /// Files created during this transaction
    created_files: HashSet<PathBuf>,

    /// Files overwritten during this transaction (with original content)
    modified_files: Vec<FileBackup>,

    /// Directories created during this transaction
    created_dirs: HashSet<PathBuf>,

    committed: bool,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            created_files: HashSet::new(),
            modified_files: Vec::new(),
            created_dirs: HashSet::new(),
            committed: false,
        }
    }

    fn track_file_created(&mut self, path: impl Into<PathBuf>) {
        self.created_files.insert(path.into());
    }

    /// Track a directory that was created during this transaction
    pub fn track_dir_created(&mut self, path: impl Into<PathBuf>) {
        self.created_dirs.insert(path.into());
    }

    /// Create `dir` and any missing ancestors, tracking each one created
    pub fn create_dir_all(&mut self, dir: &Path) -> Result<()> {
        let missing: Vec<&Path> = dir
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
            .collect();
        for path in missing.into_iter().rev() {
            fs::create_dir(path)
                .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))?;
            self.track_dir_created(path);
        }
        Ok(())
    }

    /// Remember the current content of `path` before it is overwritten,
    /// or track it as created if it does not exist yet
    fn prepare_write(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        if self.created_files.contains(path) || self.modified_files.iter().any(|b| b.path == path) {
            return Ok(());
        }

        if path.is_file() {
            let content = fs::read(path)
                .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
            self.modified_files.push(FileBackup {
                path: path.to_path_buf(),
                content,
            });
        } else {
            self.track_file_created(path);
        }
        Ok(())
    }

    /// Write `content` to `path`, creating parent directories
    pub fn write_file(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        self.prepare_write(path)?;
        fs::write(path, content)
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))
    }

    /// Copy `src` to `dst`, creating parent directories
    ///
    /// Returns the number of bytes copied.
    pub fn copy_file(&mut self, src: &Path, dst: &Path) -> Result<u64> {
        self.prepare_write(dst)?;
        fs::copy(src, dst).map_err(|e| {
            fs_error::write_failed(
                dst.display().to_string(),
                format!("copy from {}: {e}", src.display()),
            )
        })
    }

    /// Commit the transaction (prevent rollback)
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Undo everything tracked so far
    ///
    /// Best effort: failures to restore a file are logged, not returned.
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        for path in &self.created_files {
            if path.exists() {
                let _ = fs::remove_file(path);
            }
        }

        for backup in &self.modified_files {
            if let Err(e) = fs::write(&backup.path, &backup.content) {
                warn!(path = %backup.path.display(), error = %e, "failed to restore file");
            }
        }

        // Deepest first, and only if empty
        let mut dirs: Vec<_> = self.created_dirs.iter().collect();
        dirs.sort_by_key(|b| std::cmp::Reverse(b.components().count()));
        for path in dirs {
            if path.is_dir()
                && fs::read_dir(path)
                    .map(|mut d| d.next().is_none())
                    .unwrap_or(false)
            {
                let _ = fs::remove_dir(path);
            }
        }

        self.created_files.clear();
        self.modified_files.clear();
        self.created_dirs.clear();
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.rollback();
    }
}
