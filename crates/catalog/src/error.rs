use std::path::PathBuf;

use crate::location::Location;

/// Failures while reading byte-code or resources from an archive.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	/// The archive location does not exist or is not a directory.
	#[error("not a directory archive: {location}")]
	NotADirectory {
		/// The offending location.
		location: Location,
	},

	/// An entry failed to read with a real I/O error (absence is `Ok(None)`).
	#[error("i/o error in {location} at {path}: {source}")]
	Io {
		/// The archive being read.
		location: Location,
		/// The entry path relative to the archive root.
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Failures while extracting an archive's declared export metadata.
///
/// These abort registration of the whole batch; they are never degraded to
/// an empty export set.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
	/// The archive carries no manifest entry.
	#[error("missing manifest in {location}")]
	MissingManifest {
		/// The archive missing its manifest.
		location: Location,
	},

	/// The manifest entry exists but does not parse.
	#[error("malformed manifest in {location}: {source}")]
	Parse {
		/// The archive with the malformed manifest.
		location: Location,
		#[source]
		source: toml::de::Error,
	},

	/// The manifest entry failed to read.
	#[error("i/o error reading manifest in {location}: {source}")]
	Io {
		/// The archive whose manifest failed to read.
		location: Location,
		#[source]
		source: std::io::Error,
	},
}
