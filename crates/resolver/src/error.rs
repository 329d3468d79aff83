use strata_catalog::{CatalogError, MetadataError};

/// A symbol or resource was absent after exhausting the defined search order.
///
/// Not-found is a normal, recoverable outcome of resolution; callers decide
/// whether an unresolved symbol is fatal for their use case.
#[derive(Debug, Clone, thiserror::Error)]
#[error("symbol not found: {symbol}")]
pub struct NotFound {
	/// The fully qualified symbol name that exhausted the search order.
	pub symbol: String,
}

impl NotFound {
	pub(crate) fn symbol(symbol: &str) -> Self {
		Self {
			symbol: symbol.to_string(),
		}
	}
}

/// Failures of registry mutations (registration and import wiring).
///
/// These abort the single operation immediately and never leave the registry
/// partially mutated: registration is all-or-nothing per call.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	/// A precondition violation: empty location or unknown resolver id.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// Export-metadata extraction failed for one of the locations.
	#[error(transparent)]
	Metadata(#[from] MetadataError),

	/// An archive location could not be opened as a catalog.
	#[error("unreadable archive: {0}")]
	Catalog(#[from] CatalogError),
}
