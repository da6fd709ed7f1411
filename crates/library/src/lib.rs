//! chaptercast library access
//!
//! Filesystem implementations of the catalog and metadata ports:
//! [`DirectoryCatalog`] turns a library root into books and series,
//! [`LoftyMetadataProvider`] reads chapter tags.

pub mod catalog;
pub mod error;
pub mod metadata;

pub use catalog::DirectoryCatalog;
pub use error::{LibraryError, LibraryResult};
pub use metadata::LoftyMetadataProvider;
