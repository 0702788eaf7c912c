//! Bundle graph errors

use super::PatchError;

/// Creates a bundle not found error
pub fn bundle_not_found(name: impl Into<String>) -> PatchError {
    PatchError::BundleNotFound { name: name.into() }
}

/// Creates an index consistency error
pub fn inconsistent(message: impl Into<String>) -> PatchError {
    PatchError::IndexConsistency {
        message: message.into(),
    }
}
