//! Per-archive symbol resolution.
//!
//! # Role
//!
//! One `ArchiveResolver` per registered archive. It enforces namespace-level
//! visibility: the archive's own byte-code is only reachable through
//! namespaces the archive declares exported.
//!
//! # Invariants
//!
//! - The export set is fixed at registration and never mutated.
//! - The import set only grows.
//! - Cross-archive access goes through the registry by id; an archive never
//!   owns another resolver, which keeps cyclic import graphs sound.
//! - External probes land on [`ArchiveResolver::local_lookup`], bounding the
//!   cascade to one hop.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use strata_catalog::{Location, ResourceRef, TypeCatalog, namespace_of};

use crate::cache::TypeCache;
use crate::diag::DiagnosticFlags;
use crate::error::NotFound;
use crate::id::ResolverId;
use crate::registry::RegistryCore;
use crate::search;
use crate::symbol::LoadedType;

/// Resolver bound to exactly one code archive.
pub struct ArchiveResolver {
	id: ResolverId,
	location: Location,
	exports: BTreeSet<String>,
	imports: RwLock<BTreeSet<ResolverId>>,
	catalog: Arc<dyn TypeCatalog>,
	cache: Arc<TypeCache>,
	host: Arc<dyn TypeCatalog>,
	registry: Weak<RegistryCore>,
	diag: DiagnosticFlags,
}

impl ArchiveResolver {
	pub(crate) fn new(
		id: ResolverId,
		location: Location,
		exports: BTreeSet<String>,
		catalog: Arc<dyn TypeCatalog>,
		cache: Arc<TypeCache>,
		host: Arc<dyn TypeCatalog>,
		registry: Weak<RegistryCore>,
	) -> Self {
		Self {
			id,
			location,
			exports,
			imports: RwLock::new(BTreeSet::new()),
			catalog,
			cache,
			host,
			registry,
			diag: DiagnosticFlags::new(),
		}
	}

	/// The registry-assigned identifier.
	pub fn id(&self) -> ResolverId {
		self.id
	}

	/// The archive location this resolver is bound to.
	pub fn location(&self) -> &Location {
		&self.location
	}

	/// Namespaces this archive declares exported; fixed at registration.
	pub fn exported_namespaces(&self) -> &BTreeSet<String> {
		&self.exports
	}

	/// Snapshot of the ids this archive imports from.
	pub fn imported_ids(&self) -> BTreeSet<ResolverId> {
		self.imports.read().clone()
	}

	pub(crate) fn add_import(&self, id: ResolverId) {
		self.imports.write().insert(id);
	}

	/// True when the symbol's namespace is in this archive's export set.
	pub fn exports_symbol(&self, symbol: &str) -> bool {
		self.exports.contains(namespace_of(symbol))
	}

	fn sibling(&self, id: ResolverId) -> Option<Arc<ArchiveResolver>> {
		self.registry.upgrade().and_then(|core| core.archive(id))
	}

	/// Cascading resolution, the external entry point.
	///
	/// For an exported namespace: standard search (cache, host, own
	/// byte-code), then a one-hop cascade asking each import for a
	/// [`local_lookup`](Self::local_lookup). For everything else: the host
	/// directly, each import's local lookup, then the shared fallback's
	/// namespace-filtered local lookup.
	pub fn resolve(&self, symbol: &str) -> Result<Arc<LoadedType>, NotFound> {
		if self.exports_symbol(symbol) {
			if let Some(loaded) =
				search::standard_resolve(&self.cache, &self.host, [&self.catalog], symbol)
			{
				return Ok(loaded);
			}
			for id in self.imported_ids() {
				if let Some(import) = self.sibling(id)
					&& let Ok(loaded) = import.local_lookup(symbol)
				{
					return Ok(loaded);
				}
			}
			tracing::trace!(id = %self.id, %symbol, "exported namespace exhausted");
			return Err(NotFound::symbol(symbol));
		}

		if let Some(loaded) = self.cache.get(symbol) {
			return Ok(loaded);
		}
		if let Some(bytecode) = search::probe(self.host.as_ref(), symbol) {
			let loaded = LoadedType::new(symbol, bytecode, self.host.location().clone());
			return Ok(self.cache.insert(loaded));
		}
		for id in self.imported_ids() {
			if let Some(import) = self.sibling(id)
				&& let Ok(loaded) = import.local_lookup(symbol)
			{
				return Ok(loaded);
			}
		}
		match self.registry.upgrade() {
			Some(core) => core.common_resolver().local_lookup(symbol),
			None => Err(NotFound::symbol(symbol)),
		}
	}

	/// Non-cascading lookup used when another resolver probes this archive.
	///
	/// Succeeds only when the namespace is exported here and the byte-code is
	/// locally present (the host default path or this archive's own catalog);
	/// never follows imports or the fallback. A process-wide cache entry is
	/// honored only when it originated here or from the host, so byte-code
	/// loaded through another archive stays invisible until an import edge is
	/// wired.
	pub fn local_lookup(&self, symbol: &str) -> Result<Arc<LoadedType>, NotFound> {
		if !self.exports_symbol(symbol) {
			return Err(NotFound::symbol(symbol));
		}
		if let Some(loaded) = self.cache.get(symbol)
			&& (loaded.origin == self.location || loaded.origin == *self.host.location())
		{
			return Ok(loaded);
		}
		if let Some(bytecode) = search::probe(self.host.as_ref(), symbol) {
			let loaded = LoadedType::new(symbol, bytecode, self.host.location().clone());
			return Ok(self.cache.insert(loaded));
		}
		if let Some(bytecode) = search::probe(self.catalog.as_ref(), symbol) {
			let loaded = LoadedType::new(symbol, bytecode, self.location.clone());
			return Ok(self.cache.insert(loaded));
		}
		Err(NotFound::symbol(symbol))
	}

	/// Looks up a single resource in this archive.
	pub fn resource(&self, name: &str) -> Option<ResourceRef> {
		search::probe_resource(self.catalog.as_ref(), name)
	}

	/// Enumerates this archive's resources matching `name`.
	pub fn resources(&self, name: &str) -> Vec<ResourceRef> {
		search::probe_resources(self.catalog.as_ref(), name)
	}

	/// This archive's diagnostic flags.
	pub fn diagnostics(&self) -> &DiagnosticFlags {
		&self.diag
	}

	/// Sets the per-symbol diagnostic flag, only for exported namespaces.
	pub fn set_symbol_diagnostics(&self, symbol: &str, enabled: bool) {
		if self.exports_symbol(symbol) {
			self.diag.set_symbol(symbol, enabled);
		}
	}

	/// Sets the per-namespace diagnostic flag, only for exported namespaces.
	pub fn set_namespace_diagnostics(&self, namespace: &str, enabled: bool) {
		if self.exports.contains(namespace) {
			self.diag.set_namespace(namespace, enabled);
		}
	}

	/// Sets the default diagnostic flag.
	pub fn set_default_diagnostics(&self, enabled: bool) {
		self.diag.set_default(enabled);
	}

	/// Clears every diagnostic flag.
	pub fn clear_diagnostics(&self) {
		self.diag.clear();
	}
}

impl fmt::Display for ArchiveResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"ArchiveResolver[{}, location={}, exports={:?}, imports={:?}]",
			self.id,
			self.location,
			self.exports,
			self.imports.read()
		)
	}
}
