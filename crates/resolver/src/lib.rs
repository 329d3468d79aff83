//! Symbol resolution for the strata kernel.
//!
//! The kernel runs many independently packaged archives inside one process.
//! Each archive only exposes symbols from namespaces it explicitly exports,
//! and only sees another archive's exports when an import edge was wired
//! between them. This crate is the resolution core enforcing that model:
//!
//! - [`ArchiveResolver`] — bound to one archive; cascading [`resolve`] and
//!   bounded, non-cascading [`local_lookup`]
//! - [`CommonResolver`] — the per-registry shared fallback for symbols no
//!   archive declares exported
//! - [`ResolverRegistry`] — owns the id space, the namespace reverse index
//!   and the single common resolver
//! - [`UnitResolver`] — the per-deployment-unit façade composing member
//!   archives, the common resolver and a private search path
//!
//! The import relation is a directed graph over [`ResolverId`]s held in a
//! central registry — never owning pointers — so cyclic imports are legal and
//! resolution depth stays a small constant regardless of graph shape.
//!
//! [`resolve`]: ArchiveResolver::resolve
//! [`local_lookup`]: ArchiveResolver::local_lookup

pub mod archive;
pub mod cache;
pub mod common;
pub mod diag;
pub mod error;
pub mod id;
pub mod registry;
mod search;
pub mod symbol;
pub mod unit;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod tests;

pub use archive::ArchiveResolver;
pub use cache::TypeCache;
pub use common::CommonResolver;
pub use diag::DiagnosticFlags;
pub use error::{NotFound, RegistryError};
pub use id::ResolverId;
pub use registry::{CatalogFactory, ResolverRegistry};
pub use symbol::LoadedType;
pub use unit::UnitResolver;
