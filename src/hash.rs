//! BLAKE3 hashing of staged payload files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{Result, fs as fs_error};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let file =
        File::open(path).map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()))
}

/// Compare two hashes, with or without the prefix
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let strip = |h: &str| h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_string();
    strip(expected) == strip(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("a.ab");
        std::fs::write(&file_path, "bundle payload").unwrap();

        let hash = hash_file(&file_path).unwrap();
        assert!(hash.starts_with(HASH_PREFIX));
        assert_eq!(
            hash,
            format!("{HASH_PREFIX}{}", blake3::hash(b"bundle payload").to_hex())
        );
    }

    #[test]
    fn test_hash_file_not_found() {
        let result = hash_file(Path::new("/nonexistent/file.ab"));
        assert!(matches!(
            result.unwrap_err(),
            crate::error::PatchError::FileReadFailed { .. }
        ));
    }

    #[test]
    fn test_hash_file_larger_than_buffer() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("big.ab");
        let content = vec![7u8; 8192 * 3 + 17];
        std::fs::write(&file_path, &content).unwrap();

        let hash = hash_file(&file_path).unwrap();
        assert!(verify_hash(&hash, blake3::hash(&content).to_hex().as_str()));
    }

    #[test]
    fn test_verify_hash() {
        let hash1 = format!("{HASH_PREFIX}abc123");
        assert!(verify_hash(&hash1, &hash1.clone()));
        assert!(verify_hash(&hash1, "abc123"));
        assert!(!verify_hash(&hash1, &format!("{HASH_PREFIX}def456")));
    }
}
