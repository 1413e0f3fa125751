//! Catalog module - the fields and lookups a search can use

mod types;
pub mod builtin;
pub mod loader;

pub use types::*;
pub use builtin::{builtin_catalog, quick_search_fields};
pub use loader::{load_catalog, load_catalog_file};
