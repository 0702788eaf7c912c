//! Raw manifest format errors

use super::PatchError;

/// Creates a malformed manifest error
pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> PatchError {
    PatchError::ManifestFormat {
        source_name: source_name.into(),
        message: message.into(),
    }
}
