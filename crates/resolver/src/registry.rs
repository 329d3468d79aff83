//! The resolver registry: id space, archive ownership, namespace index and
//! the single shared fallback.
//!
//! # Role
//!
//! Process-wide shared state. Deploys register archive batches while running
//! components resolve symbols; both interleave continuously.
//!
//! # Invariants
//!
//! - Ids are unique for the registry's lifetime and never reused.
//! - The namespace index reflects every exporter of a namespace.
//! - The maps lock is never held across a call into another resolver; `Arc`s
//!   are cloned out under a short read lock first.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use strata_catalog::{
	CatalogError, DirCatalog, ExportMetadata, Location, ManifestExports, MemoryCatalog,
	TypeCatalog, namespace_of,
};

use crate::archive::ArchiveResolver;
use crate::cache::TypeCache;
use crate::common::CommonResolver;
use crate::error::RegistryError;
use crate::id::ResolverId;

/// Opens a catalog for a registered archive location.
pub type CatalogFactory =
	dyn Fn(&Location) -> Result<Arc<dyn TypeCatalog>, CatalogError> + Send + Sync;

pub(crate) struct RegistryCore {
	state: RwLock<RegistryState>,
	common: OnceLock<Arc<CommonResolver>>,
	pub(crate) cache: Arc<TypeCache>,
	pub(crate) host: Arc<dyn TypeCatalog>,
	metadata: Arc<dyn ExportMetadata>,
	open: Box<CatalogFactory>,
}

#[derive(Default)]
struct RegistryState {
	archives: BTreeMap<ResolverId, Arc<ArchiveResolver>>,
	namespace_index: FxHashMap<String, BTreeSet<ResolverId>>,
	next_id: u32,
}

impl RegistryCore {
	pub(crate) fn archive(&self, id: ResolverId) -> Option<Arc<ArchiveResolver>> {
		self.state.read().archives.get(&id).cloned()
	}

	pub(crate) fn archive_ids(&self) -> Vec<ResolverId> {
		self.state.read().archives.keys().copied().collect()
	}

	pub(crate) fn exporting(&self, namespace: &str) -> Vec<ResolverId> {
		self.state
			.read()
			.namespace_index
			.get(namespace)
			.map(|ids| ids.iter().copied().collect())
			.unwrap_or_default()
	}

	pub(crate) fn common_resolver(self: &Arc<Self>) -> Arc<CommonResolver> {
		self.common
			.get_or_init(|| {
				Arc::new(CommonResolver::new(
					Arc::downgrade(self),
					self.cache.clone(),
					self.host.clone(),
				))
			})
			.clone()
	}
}

/// Shared handle to the registry owning every archive resolver.
///
/// Cloning is cheap; all clones observe one id space, one namespace index and
/// one shared fallback resolver. Archives live until the last registry handle
/// is dropped (deployment-unit façades never own them).
#[derive(Clone)]
pub struct ResolverRegistry {
	core: Arc<RegistryCore>,
}

impl ResolverRegistry {
	/// Creates a registry with the default kernel wiring: strict manifest
	/// metadata, directory-archive catalogs and an empty host search path.
	pub fn new() -> Self {
		Self::with_parts(
			Arc::new(MemoryCatalog::empty("host:empty")),
			Arc::new(ManifestExports::new()),
			Box::new(|location| {
				Ok(Arc::new(DirCatalog::open(location.clone())?) as Arc<dyn TypeCatalog>)
			}),
		)
	}

	/// Creates a registry with an explicit host search path, export-metadata
	/// extractor and catalog factory.
	pub fn with_parts(
		host: Arc<dyn TypeCatalog>,
		metadata: Arc<dyn ExportMetadata>,
		open: Box<CatalogFactory>,
	) -> Self {
		Self {
			core: Arc::new(RegistryCore {
				state: RwLock::new(RegistryState::default()),
				common: OnceLock::new(),
				cache: Arc::new(TypeCache::new()),
				host,
				metadata,
				open,
			}),
		}
	}

	/// Registers a batch of archive locations, returning their fresh ids.
	///
	/// All export sets are extracted and all catalogs opened before any state
	/// changes, so a failing location aborts the whole call with the registry
	/// untouched. Safe to call concurrently with lookups.
	pub fn register(&self, locations: &[Location]) -> Result<BTreeSet<ResolverId>, RegistryError> {
		for location in locations {
			if location.is_empty() {
				return Err(RegistryError::InvalidArgument(
					"empty archive location".to_string(),
				));
			}
		}

		let mut staged = Vec::with_capacity(locations.len());
		for location in locations {
			let exports = self.core.metadata.exports(location)?;
			let catalog = (self.core.open)(location)?;
			staged.push((location.clone(), exports, catalog));
		}

		let weak = Arc::downgrade(&self.core);
		let mut ids = BTreeSet::new();
		let mut state = self.core.state.write();
		for (location, exports, catalog) in staged {
			let id = ResolverId::new(state.next_id);
			state.next_id += 1;

			for namespace in &exports {
				state
					.namespace_index
					.entry(namespace.clone())
					.or_default()
					.insert(id);
			}

			let archive = Arc::new(ArchiveResolver::new(
				id,
				location,
				exports,
				catalog,
				self.core.cache.clone(),
				self.core.host.clone(),
				weak.clone(),
			));
			tracing::info!(%id, location = %archive.location(), "registered archive");
			state.archives.insert(id, archive);
			ids.insert(id);
		}
		Ok(ids)
	}

	/// Returns the archive resolver registered under `id`.
	pub fn get(&self, id: ResolverId) -> Option<Arc<ArchiveResolver>> {
		self.core.archive(id)
	}

	/// Every id currently registered.
	pub fn all_ids(&self) -> BTreeSet<ResolverId> {
		self.core.state.read().archives.keys().copied().collect()
	}

	/// Ids of archives whose export set contains the symbol's namespace.
	pub fn ids_exporting(&self, symbol: &str) -> BTreeSet<ResolverId> {
		self.core
			.state
			.read()
			.namespace_index
			.get(namespace_of(symbol))
			.cloned()
			.unwrap_or_default()
	}

	/// The single shared fallback resolver, created on first use.
	pub fn common(&self) -> Arc<CommonResolver> {
		self.core.common_resolver()
	}

	/// Wires a one-directional import edge from `from` to `to`.
	///
	/// No cycle check: cyclic graphs are legal, and the resolution algorithm
	/// bounds its own depth.
	pub fn wire_import(&self, from: ResolverId, to: ResolverId) -> Result<(), RegistryError> {
		let archive = {
			let state = self.core.state.read();
			if !state.archives.contains_key(&to) {
				return Err(RegistryError::InvalidArgument(format!(
					"unknown import target id {to}"
				)));
			}
			state.archives.get(&from).cloned().ok_or_else(|| {
				RegistryError::InvalidArgument(format!("unknown importer id {from}"))
			})?
		};
		archive.add_import(to);
		tracing::debug!(%from, %to, "wired import edge");
		Ok(())
	}

	pub(crate) fn cache(&self) -> &Arc<TypeCache> {
		&self.core.cache
	}

	pub(crate) fn host(&self) -> &Arc<dyn TypeCatalog> {
		&self.core.host
	}
}

impl Default for ResolverRegistry {
	fn default() -> Self {
		Self::new()
	}
}
