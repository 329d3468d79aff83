//! Archive access for the strata kernel.
//!
//! An archive is a unit of packaged code with one [`Location`] and a fixed
//! declared export list. This crate provides everything the resolver core
//! needs to read archives without knowing how they are laid out:
//!
//! - [`TypeCatalog`] — the injected capability mapping fully qualified symbol
//!   names to loadable byte-code, plus resource access
//! - [`DirCatalog`] / [`MemoryCatalog`] — the built-in catalog backends
//! - [`ExportMetadata`] / [`ManifestExports`] — extraction of an archive's
//!   declared export namespaces from its manifest entry
//!
//! Packing and unpacking of archives is a separate collaborator; packed
//! bundles plug in through [`TypeCatalog`].

pub mod catalog;
pub mod dir;
pub mod error;
pub mod location;
pub mod manifest;
pub mod memory;


pub use catalog::{Bytecode, ResourceRef, TypeCatalog, namespace_of, symbol_rel_path};
pub use dir::DirCatalog;
pub use error::{CatalogError, MetadataError};
pub use location::Location;
pub use manifest::{ArchiveManifest, ExportMetadata, FixedExports, MANIFEST_NAME, ManifestExports};
pub use memory::{MemoryCatalog, MemoryCatalogBuilder};
