//! The byte-code access seam between archives and the resolver core.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::location::Location;

/// Opaque loadable byte-code for one symbol.
pub type Bytecode = Arc<[u8]>;

/// One resource hit, tagged with the archive it came from.
///
/// Resources are not unique across archives; enumeration callers receive one
/// `ResourceRef` per archive that carries the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
	/// The archive the resource was read from.
	pub origin: Location,
	/// The resource name as requested.
	pub name: String,
	/// The resource contents.
	pub data: Arc<[u8]>,
}

/// Byte-code and resource access for one archive location.
///
/// The resolver core treats this as an injected capability and never reads
/// archive contents directly. Implementations must be cheap to probe: a
/// symbol that is simply absent is `Ok(None)`, not an error.
pub trait TypeCatalog: Send + Sync {
	/// The archive location this catalog reads from.
	fn location(&self) -> &Location;

	/// Loads the byte-code for a fully qualified symbol name.
	///
	/// `Ok(None)` means the symbol is not present here; `Err` is an I/O or
	/// format failure while reading an entry.
	fn load_type(&self, symbol: &str) -> Result<Option<Bytecode>, CatalogError>;

	/// Looks up a single resource by name.
	fn resource(&self, name: &str) -> Result<Option<ResourceRef>, CatalogError>;

	/// Returns every resource matching `name`.
	///
	/// Catalogs with at most one entry per name can rely on the default.
	fn resources(&self, name: &str) -> Result<Vec<ResourceRef>, CatalogError> {
		Ok(self.resource(name)?.into_iter().collect())
	}
}

/// Returns the namespace of a fully qualified symbol name: the portion before
/// the final `.`, or the root namespace (empty) if there is no separator.
pub fn namespace_of(symbol: &str) -> &str {
	match symbol.rfind('.') {
		Some(idx) => &symbol[..idx],
		None => "",
	}
}

/// Maps a fully qualified symbol name to its relative byte-code path
/// (`a.b.C` becomes `a/b/C.tc`).
pub fn symbol_rel_path(symbol: &str) -> PathBuf {
	let mut path: PathBuf = symbol.split('.').collect();
	path.set_extension("tc");
	path
}
