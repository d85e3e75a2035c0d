//! Storage module for file content
//!
//! Provides the `ContentStore` capability and its local-filesystem backend,
//! laid out as one directory per owner.

mod content_store;
mod error;
#[cfg(test)]
pub mod memory;

pub use content_store::{ContentStore, LocalContentStore};
pub use error::StoreError;
