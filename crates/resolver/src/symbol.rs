use strata_catalog::{Bytecode, Location, namespace_of};

/// A successfully resolved symbol: its loadable byte-code plus provenance.
///
/// Resolution always yields `Arc<LoadedType>`; the process-wide
/// [`TypeCache`](crate::cache::TypeCache) guarantees repeated resolution of
/// one symbol returns the same allocation.
#[derive(Debug, Clone)]
pub struct LoadedType {
	/// Fully qualified symbol name.
	pub name: String,
	/// The symbol's namespace (portion before the final separator).
	pub namespace: String,
	/// The loadable byte-code.
	pub bytecode: Bytecode,
	/// The archive or search-path location that provided the byte-code.
	pub origin: Location,
}

impl LoadedType {
	pub(crate) fn new(name: &str, bytecode: Bytecode, origin: Location) -> Self {
		Self {
			namespace: namespace_of(name).to_string(),
			name: name.to_string(),
			bytecode,
			origin,
		}
	}
}
