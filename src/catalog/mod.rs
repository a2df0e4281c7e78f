//! Category Catalog
//!
//! The ordered list of award categories and their nominees, plus the
//! loaders that wait for it to be published.

mod loader;
mod types;

pub use loader::{
    wait_for_catalog, CatalogSource, FileCatalogSource, RetryPolicy, StaticCatalogSource,
};
pub use types::{Category, CategoryCatalog};

use std::path::PathBuf;
use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Invalid category {number}: {reason}")]
    InvalidCategory { number: u32, reason: String },

    #[error("Duplicate category number {0}")]
    DuplicateNumber(u32),
}
