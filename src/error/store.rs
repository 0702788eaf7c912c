//! Asset store errors

use super::PatchError;

/// Creates a store operation failed error
pub fn operation_failed(message: impl Into<String>) -> PatchError {
    PatchError::StoreOperationFailed {
        message: message.into(),
    }
}
