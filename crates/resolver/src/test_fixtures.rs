//! Shared fixtures: registries over in-memory archives with fixed export
//! tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_catalog::{FixedExports, Location, MemoryCatalog, TypeCatalog};

use crate::registry::ResolverRegistry;

/// Builder for a registry whose archives are in-memory catalogs.
pub(crate) struct FixtureRegistry {
	exports: FixedExports,
	catalogs: BTreeMap<Location, Arc<dyn TypeCatalog>>,
	host: Arc<dyn TypeCatalog>,
}

impl FixtureRegistry {
	pub(crate) fn new() -> Self {
		Self {
			exports: FixedExports::new(),
			catalogs: BTreeMap::new(),
			host: Arc::new(MemoryCatalog::empty("host:empty")),
		}
	}

	/// Installs a host default search path.
	pub(crate) fn host(mut self, catalog: MemoryCatalog) -> Self {
		self.host = Arc::new(catalog);
		self
	}

	/// Declares an archive at `location` exporting `exports` and containing
	/// the given symbol byte-code entries.
	pub(crate) fn archive(self, location: &str, exports: &[&str], types: &[(&str, &[u8])]) -> Self {
		let mut builder = MemoryCatalog::builder(location);
		for (symbol, bytes) in types {
			builder = builder.with_type(*symbol, bytes);
		}
		self.archive_catalog(location, exports, builder.build())
	}

	/// Declares an archive with a fully custom catalog.
	pub(crate) fn archive_catalog(
		mut self,
		location: &str,
		exports: &[&str],
		catalog: MemoryCatalog,
	) -> Self {
		self.exports = self.exports.insert(location, exports.iter().copied());
		self.catalogs.insert(Location::from(location), Arc::new(catalog));
		self
	}

	pub(crate) fn build(self) -> ResolverRegistry {
		let catalogs = self.catalogs;
		ResolverRegistry::with_parts(
			self.host,
			Arc::new(self.exports),
			Box::new(move |location| {
				Ok(catalogs
					.get(location)
					.expect("catalog registered for test location")
					.clone())
			}),
		)
	}
}
