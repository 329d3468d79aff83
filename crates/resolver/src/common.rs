//! The shared fallback resolver for non-exported namespaces.
//!
//! One instance per registry, created lazily, shared by reference with every
//! archive and unit resolver that needs it. It owns the process-wide "common"
//! search path for symbols that belong to no archive's declared export set.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use strata_catalog::{Location, ResourceRef, TypeCatalog, namespace_of};

use crate::cache::TypeCache;
use crate::diag::DiagnosticFlags;
use crate::error::NotFound;
use crate::registry::RegistryCore;
use crate::search;
use crate::symbol::LoadedType;

/// Resolver for symbols outside every declared export set.
pub struct CommonResolver {
	path: RwLock<Vec<Arc<dyn TypeCatalog>>>,
	cache: Arc<TypeCache>,
	host: Arc<dyn TypeCatalog>,
	registry: Weak<RegistryCore>,
	diag: DiagnosticFlags,
}

impl CommonResolver {
	pub(crate) fn new(
		registry: Weak<RegistryCore>,
		cache: Arc<TypeCache>,
		host: Arc<dyn TypeCatalog>,
	) -> Self {
		Self {
			path: RwLock::new(Vec::new()),
			cache,
			host,
			registry,
			diag: DiagnosticFlags::new(),
		}
	}

	fn own_path(&self) -> Vec<Arc<dyn TypeCatalog>> {
		self.path.read().clone()
	}

	/// Appends a late-added location to the common search path (grow-only).
	pub fn add_location(&self, catalog: Arc<dyn TypeCatalog>) {
		self.path.write().push(catalog);
	}

	/// Process-wide last resort: standard resolution on the common path, then
	/// every registered archive's full cascading resolve.
	///
	/// Breadth is deliberately unfiltered and scales linearly with archive
	/// count per miss. Depth stays bounded: archives fall back into this
	/// resolver through [`local_lookup`](Self::local_lookup), never through
	/// this method, so there is no mutual recursion.
	pub fn resolve(&self, symbol: &str) -> Result<Arc<LoadedType>, NotFound> {
		let own = self.own_path();
		if let Some(loaded) = search::standard_resolve(&self.cache, &self.host, own.iter(), symbol) {
			return Ok(loaded);
		}
		if let Some(core) = self.registry.upgrade() {
			for id in core.archive_ids() {
				if let Some(archive) = core.archive(id)
					&& let Ok(loaded) = archive.resolve(symbol)
				{
					return Ok(loaded);
				}
			}
		}
		Err(NotFound::symbol(symbol))
	}

	/// Namespace-filtered lookup used from the archive fallback path.
	///
	/// On a common-path miss, only archives that declare the symbol's
	/// namespace exported are consulted. This trades completeness for
	/// precision: symbols whose owning archive does not declare the namespace
	/// are missed here.
	pub fn local_lookup(&self, symbol: &str) -> Result<Arc<LoadedType>, NotFound> {
		let own = self.own_path();
		if let Some(loaded) = search::standard_resolve(&self.cache, &self.host, own.iter(), symbol) {
			return Ok(loaded);
		}
		if let Some(core) = self.registry.upgrade() {
			for id in core.exporting(namespace_of(symbol)) {
				if let Some(archive) = core.archive(id)
					&& let Ok(loaded) = archive.resolve(symbol)
				{
					return Ok(loaded);
				}
			}
		}
		Err(NotFound::symbol(symbol))
	}

	/// Looks up a single resource on the common search path.
	pub fn resource(&self, name: &str) -> Option<ResourceRef> {
		self.own_path()
			.iter()
			.find_map(|catalog| search::probe_resource(catalog.as_ref(), name))
	}

	/// Enumerates matching resources across the common search path.
	pub fn resources(&self, name: &str) -> Vec<ResourceRef> {
		self.own_path()
			.iter()
			.flat_map(|catalog| search::probe_resources(catalog.as_ref(), name))
			.collect()
	}

	/// Locations on the common search path.
	pub fn locations(&self) -> Vec<Location> {
		self.own_path()
			.iter()
			.map(|catalog| catalog.location().clone())
			.collect()
	}

	/// The common resolver's diagnostic flags.
	pub fn diagnostics(&self) -> &DiagnosticFlags {
		&self.diag
	}
}

impl fmt::Display for CommonResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CommonResolver[path={:?}]", self.locations())
	}
}
