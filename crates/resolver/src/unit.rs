//! The deployment-unit façade.
//!
//! One `UnitResolver` per deployed unit: it registers the unit's archive
//! batch and presents a single resolver-shaped interface over the members,
//! the shared fallback and a private search path. Dropping the façade never
//! frees the member archives; the registry owns them until it is torn down.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use strata_catalog::{Location, ResourceRef, TypeCatalog};

use crate::archive::ArchiveResolver;
use crate::diag::DiagnosticFlags;
use crate::error::{NotFound, RegistryError};
use crate::id::ResolverId;
use crate::registry::ResolverRegistry;
use crate::search;
use crate::symbol::LoadedType;

/// Aggregate resolver composing the archives of one deployment unit.
pub struct UnitResolver {
	registry: ResolverRegistry,
	members: BTreeSet<ResolverId>,
	own: RwLock<Vec<Arc<dyn TypeCatalog>>>,
	diag: DiagnosticFlags,
}

impl UnitResolver {
	/// Registers a batch of archive locations and becomes their façade.
	pub fn new(registry: ResolverRegistry, locations: &[Location]) -> Result<Self, RegistryError> {
		let members = registry.register(locations)?;
		Ok(Self {
			registry,
			members,
			own: RwLock::new(Vec::new()),
			diag: DiagnosticFlags::new(),
		})
	}

	/// The member archive ids registered for this unit, in id order.
	pub fn member_ids(&self) -> &BTreeSet<ResolverId> {
		&self.members
	}

	/// The registry this unit resolves through.
	pub fn registry(&self) -> &ResolverRegistry {
		&self.registry
	}

	/// Appends a location to the unit's private search path (grow-only).
	pub fn add_location(&self, catalog: Arc<dyn TypeCatalog>) {
		self.own.write().push(catalog);
	}

	fn own_path(&self) -> Vec<Arc<dyn TypeCatalog>> {
		self.own.read().clone()
	}

	fn member(&self, id: ResolverId) -> Option<Arc<ArchiveResolver>> {
		self.registry.get(id)
	}

	/// Resolves a symbol through the unit's fixed precedence: own search
	/// path, each member's full resolve in id order, the shared fallback,
	/// then one unrestricted standard search.
	pub fn resolve(&self, symbol: &str) -> Result<Arc<LoadedType>, NotFound> {
		let own = self.own_path();
		if let Some(loaded) =
			search::standard_resolve(self.registry.cache(), self.registry.host(), own.iter(), symbol)
		{
			return Ok(loaded);
		}
		for &id in &self.members {
			if let Some(member) = self.member(id)
				&& let Ok(loaded) = member.resolve(symbol)
			{
				return Ok(loaded);
			}
		}
		if let Ok(loaded) = self.registry.common().resolve(symbol) {
			return Ok(loaded);
		}
		// Unrestricted last resort: symbols on the host's own search path are
		// always reachable even when no archive declares their namespace.
		search::standard_resolve(self.registry.cache(), self.registry.host(), own.iter(), symbol)
			.ok_or_else(|| NotFound::symbol(symbol))
	}

	/// First-match resource lookup: members in id order, then the common
	/// path, then the unit's own path.
	pub fn resource(&self, name: &str) -> Option<ResourceRef> {
		for &id in &self.members {
			if let Some(member) = self.member(id)
				&& let Some(hit) = member.resource(name)
			{
				return Some(hit);
			}
		}
		if let Some(hit) = self.registry.common().resource(name) {
			return Some(hit);
		}
		self.own_path()
			.iter()
			.find_map(|catalog| search::probe_resource(catalog.as_ref(), name))
	}

	/// Union enumeration: every source is queried and all hits concatenated
	/// (members, then the common path, then the own path). Resources are not
	/// required to be unique across sources.
	pub fn resources(&self, name: &str) -> Vec<ResourceRef> {
		let mut hits = Vec::new();
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				hits.extend(member.resources(name));
			}
		}
		hits.extend(self.registry.common().resources(name));
		for catalog in self.own_path() {
			hits.extend(search::probe_resources(catalog.as_ref(), name));
		}
		hits
	}

	/// Every search-path location visible to this unit: member archives, the
	/// common path, then the own path.
	pub fn locations(&self) -> Vec<Location> {
		let mut out = Vec::new();
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				out.push(member.location().clone());
			}
		}
		out.extend(self.registry.common().locations());
		out.extend(self.own_path().iter().map(|catalog| catalog.location().clone()));
		out
	}

	/// Broadcasts a per-symbol diagnostic flag to every member, the common
	/// resolver, then the unit's own flags.
	pub fn set_symbol_diagnostics(&self, symbol: &str, enabled: bool) {
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				member.set_symbol_diagnostics(symbol, enabled);
			}
		}
		self.registry.common().diagnostics().set_symbol(symbol, enabled);
		self.diag.set_symbol(symbol, enabled);
	}

	/// Broadcasts a per-namespace diagnostic flag.
	pub fn set_namespace_diagnostics(&self, namespace: &str, enabled: bool) {
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				member.set_namespace_diagnostics(namespace, enabled);
			}
		}
		self.registry
			.common()
			.diagnostics()
			.set_namespace(namespace, enabled);
		self.diag.set_namespace(namespace, enabled);
	}

	/// Broadcasts the default diagnostic flag.
	pub fn set_default_diagnostics(&self, enabled: bool) {
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				member.set_default_diagnostics(enabled);
			}
		}
		self.registry.common().diagnostics().set_default(enabled);
		self.diag.set_default(enabled);
	}

	/// Broadcasts a clear of every diagnostic flag.
	pub fn clear_diagnostics(&self) {
		for &id in &self.members {
			if let Some(member) = self.member(id) {
				member.clear_diagnostics();
			}
		}
		self.registry.common().diagnostics().clear();
		self.diag.clear();
	}

	/// The unit's own diagnostic flags.
	pub fn diagnostics(&self) -> &DiagnosticFlags {
		&self.diag
	}
}

impl fmt::Display for UnitResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let own: Vec<Location> = self
			.own_path()
			.iter()
			.map(|catalog| catalog.location().clone())
			.collect();
		write!(f, "UnitResolver[members={:?}, own={:?}]", self.members, own)
	}
}
