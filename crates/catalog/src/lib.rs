//! The fixed, ordered set of packaging guides and the loader for their markdown.

pub mod catalog;
pub mod loader;

pub use catalog::{Catalog, CatalogError, GuideEntry, NextGuide, GUIDES};
pub use loader::{fallback_body, LoadError, MarkdownLoader};
