//! Path tree errors

use super::PatchError;

/// Creates a path conflict error
pub fn conflict(path: impl Into<String>, reason: impl Into<String>) -> PatchError {
    PatchError::PathConflict {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a path not found error
pub fn not_found(path: impl Into<String>) -> PatchError {
    PatchError::PathNotFound { path: path.into() }
}
