//! Diagnostic tree dumps

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, fs as fs_error};
use crate::manifest::PathTree;

/// Writes path tree listings into a diagnostics directory, or nowhere
#[derive(Debug, Clone)]
pub struct DumpWriter {
    dir: Option<PathBuf>,
}

impl DumpWriter {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write `tree` as `<dir>/<file_name>`
    pub fn write_tree<T>(&self, file_name: &str, tree: &PathTree<T>) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };

        fs::create_dir_all(dir)
            .map_err(|e| fs_error::write_failed(dir.display().to_string(), e.to_string()))?;
        let path = dir.join(file_name);
        fs::write(&path, tree.dump())
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))?;
        debug!(path = %path.display(), "wrote tree dump");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> PathTree<u8> {
        let mut tree = PathTree::new("r1");
        tree.insert("ui/x.png", 0).unwrap();
        tree
    }

    #[test]
    fn test_write_tree() {
        let temp = TempDir::new().unwrap();
        let dumps = DumpWriter::new(Some(temp.path().join("tmp/mod")));
        dumps.write_tree("target.txt", &tree()).unwrap();

        let content = fs::read_to_string(temp.path().join("tmp/mod/target.txt")).unwrap();
        assert_eq!(content, "r1/\n  ui/\n    x.png\n");
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let dumps = DumpWriter::disabled();
        assert!(dumps.dir().is_none());
        assert!(dumps.write_tree("target.txt", &tree()).is_ok());
    }
}
