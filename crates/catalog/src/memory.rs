//! In-memory archive catalog for embedded archives and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{Bytecode, ResourceRef, TypeCatalog};
use crate::error::CatalogError;
use crate::location::Location;

/// A catalog holding its byte-code and resources in memory.
pub struct MemoryCatalog {
	location: Location,
	types: BTreeMap<String, Bytecode>,
	resources: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryCatalog {
	/// Starts building a catalog with the given synthetic location.
	pub fn builder(location: impl Into<Location>) -> MemoryCatalogBuilder {
		MemoryCatalogBuilder {
			location: location.into(),
			types: BTreeMap::new(),
			resources: BTreeMap::new(),
		}
	}

	/// Creates a catalog with no contents.
	pub fn empty(location: impl Into<Location>) -> Self {
		Self::builder(location).build()
	}
}

impl TypeCatalog for MemoryCatalog {
	fn location(&self) -> &Location {
		&self.location
	}

	fn load_type(&self, symbol: &str) -> Result<Option<Bytecode>, CatalogError> {
		Ok(self.types.get(symbol).cloned())
	}

	fn resource(&self, name: &str) -> Result<Option<ResourceRef>, CatalogError> {
		Ok(self.resources.get(name).map(|data| ResourceRef {
			origin: self.location.clone(),
			name: name.to_string(),
			data: data.clone(),
		}))
	}
}

/// Builder for [`MemoryCatalog`].
pub struct MemoryCatalogBuilder {
	location: Location,
	types: BTreeMap<String, Bytecode>,
	resources: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryCatalogBuilder {
	/// Adds byte-code for a fully qualified symbol name.
	pub fn with_type(mut self, symbol: impl Into<String>, bytes: &[u8]) -> Self {
		self.types.insert(symbol.into(), Arc::from(bytes));
		self
	}

	/// Adds a resource under the given name.
	pub fn with_resource(mut self, name: impl Into<String>, bytes: &[u8]) -> Self {
		self.resources.insert(name.into(), Arc::from(bytes));
		self
	}

	/// Finishes the catalog.
	pub fn build(self) -> MemoryCatalog {
		MemoryCatalog {
			location: self.location,
			types: self.types,
			resources: self.resources,
		}
	}
}
