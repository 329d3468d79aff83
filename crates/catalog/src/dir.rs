//! Directory-backed archive catalog.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{Bytecode, ResourceRef, TypeCatalog, symbol_rel_path};
use crate::error::CatalogError;
use crate::location::Location;

/// Reads byte-code and resources from an archive laid out as a directory
/// tree: symbol `a.b.C` is stored at `a/b/C.tc`, resources at their relative
/// paths under the archive root.
#[derive(Debug)]
pub struct DirCatalog {
	location: Location,
}

impl DirCatalog {
	/// Opens a directory archive.
	pub fn open(location: Location) -> Result<Self, CatalogError> {
		if !location.path().is_dir() {
			return Err(CatalogError::NotADirectory { location });
		}
		Ok(Self { location })
	}

	fn read_entry(&self, rel: &Path) -> Result<Option<Arc<[u8]>>, CatalogError> {
		let full = self.location.path().join(rel);
		match fs::read(&full) {
			Ok(bytes) => Ok(Some(Arc::from(bytes))),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(source) => Err(CatalogError::Io {
				location: self.location.clone(),
				path: rel.to_path_buf(),
				source,
			}),
		}
	}
}

impl TypeCatalog for DirCatalog {
	fn location(&self) -> &Location {
		&self.location
	}

	fn load_type(&self, symbol: &str) -> Result<Option<Bytecode>, CatalogError> {
		self.read_entry(&symbol_rel_path(symbol))
	}

	fn resource(&self, name: &str) -> Result<Option<ResourceRef>, CatalogError> {
		Ok(self.read_entry(Path::new(name))?.map(|data| ResourceRef {
			origin: self.location.clone(),
			name: name.to_string(),
			data,
		}))
	}
}
