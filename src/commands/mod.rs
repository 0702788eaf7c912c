//! Command implementations for the patchbundle CLI

pub mod build;
pub mod completions;
pub mod inspect;
pub mod store;
pub mod version;
