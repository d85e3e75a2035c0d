mod metadata_store;
#[cfg(test)]
pub mod memory;

pub use metadata_store::{MetadataStore, PgMetadataStore};
