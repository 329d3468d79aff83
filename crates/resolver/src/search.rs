//! Standard resolution shared by every resolver: the already-loaded cache,
//! the host default path, then local catalogs in order.

use std::sync::Arc;

use strata_catalog::{Bytecode, ResourceRef, TypeCatalog};

use crate::cache::TypeCache;
use crate::symbol::LoadedType;

/// Probes one catalog for a symbol. A catalog I/O failure degrades to a miss
/// so resolution never hangs or aborts on a broken archive.
pub(crate) fn probe(catalog: &dyn TypeCatalog, symbol: &str) -> Option<Bytecode> {
	match catalog.load_type(symbol) {
		Ok(found) => found,
		Err(error) => {
			tracing::warn!(location = %catalog.location(), %symbol, %error, "catalog probe failed");
			None
		}
	}
}

/// Standard resolution: the cache, then the host default path, then each
/// local catalog in order. Successful loads are published to the cache; the
/// first publication for a symbol wins.
pub(crate) fn standard_resolve<'a>(
	cache: &TypeCache,
	host: &Arc<dyn TypeCatalog>,
	locals: impl IntoIterator<Item = &'a Arc<dyn TypeCatalog>>,
	symbol: &str,
) -> Option<Arc<LoadedType>> {
	if let Some(loaded) = cache.get(symbol) {
		return Some(loaded);
	}
	if let Some(bytecode) = probe(host.as_ref(), symbol) {
		let loaded = LoadedType::new(symbol, bytecode, host.location().clone());
		return Some(cache.insert(loaded));
	}
	for catalog in locals {
		if let Some(bytecode) = probe(catalog.as_ref(), symbol) {
			let loaded = LoadedType::new(symbol, bytecode, catalog.location().clone());
			return Some(cache.insert(loaded));
		}
	}
	None
}

/// Probes one catalog for a single resource, degrading failures to a miss.
pub(crate) fn probe_resource(catalog: &dyn TypeCatalog, name: &str) -> Option<ResourceRef> {
	match catalog.resource(name) {
		Ok(found) => found,
		Err(error) => {
			tracing::warn!(location = %catalog.location(), %name, %error, "resource probe failed");
			None
		}
	}
}

/// Probes one catalog for every resource matching `name`.
pub(crate) fn probe_resources(catalog: &dyn TypeCatalog, name: &str) -> Vec<ResourceRef> {
	match catalog.resources(name) {
		Ok(found) => found,
		Err(error) => {
			tracing::warn!(location = %catalog.location(), %name, %error, "resource enumeration failed");
			Vec::new()
		}
	}
}
