//! Export-metadata extraction from archive manifests.
//!
//! Registration needs one fact per archive: the set of namespaces it declares
//! exported. The kernel treats this as a pure function of the location; the
//! default implementation reads a `strata.toml` entry from the archive root.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;

use serde::Deserialize;

use crate::error::MetadataError;
use crate::location::Location;

/// Name of the manifest entry inside an archive.
pub const MANIFEST_NAME: &str = "strata.toml";

/// Declared metadata for one archive.
///
/// ```toml
/// [archive]
/// exports = ["pkg.a", "pkg.b"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveManifest {
	/// The `[archive]` section.
	pub archive: ArchiveSection,
}

/// The `[archive]` manifest section.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSection {
	/// Namespaces this archive declares exported.
	#[serde(default)]
	pub exports: Vec<String>,
}

impl ArchiveManifest {
	/// Parses manifest text for the given archive.
	pub fn parse(location: &Location, text: &str) -> Result<Self, MetadataError> {
		toml::from_str(text).map_err(|source| MetadataError::Parse {
			location: location.clone(),
			source,
		})
	}
}

/// Extracts the declared export namespaces for an archive location.
pub trait ExportMetadata: Send + Sync {
	/// Returns the export set for `location`, or an error that aborts the
	/// registration it is part of.
	fn exports(&self, location: &Location) -> Result<BTreeSet<String>, MetadataError>;
}

/// Default extractor: reads [`MANIFEST_NAME`] from the archive root.
pub struct ManifestExports {
	lenient: bool,
}

impl ManifestExports {
	/// Strict mode: a missing manifest fails registration.
	pub fn new() -> Self {
		Self { lenient: false }
	}

	/// Lenient mode: an archive without a manifest exports nothing, matching
	/// how plain unannotated archives are deployed.
	pub fn lenient() -> Self {
		Self { lenient: true }
	}
}

impl Default for ManifestExports {
	fn default() -> Self {
		Self::new()
	}
}

impl ExportMetadata for ManifestExports {
	fn exports(&self, location: &Location) -> Result<BTreeSet<String>, MetadataError> {
		let path = location.path().join(MANIFEST_NAME);
		let text = match fs::read_to_string(&path) {
			Ok(text) => text,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				if self.lenient {
					tracing::debug!(%location, "archive has no manifest, exporting nothing");
					return Ok(BTreeSet::new());
				}
				return Err(MetadataError::MissingManifest {
					location: location.clone(),
				});
			}
			Err(source) => {
				return Err(MetadataError::Io {
					location: location.clone(),
					source,
				});
			}
		};
		let manifest = ArchiveManifest::parse(location, &text)?;
		Ok(manifest.archive.exports.into_iter().collect())
	}
}

/// A fixed location-to-exports table, for embedded archives and tests.
#[derive(Debug, Default)]
pub struct FixedExports {
	table: BTreeMap<Location, BTreeSet<String>>,
}

impl FixedExports {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares the export set for one location.
	pub fn insert<I, S>(mut self, location: impl Into<Location>, exports: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.table
			.insert(location.into(), exports.into_iter().map(Into::into).collect());
		self
	}
}

impl ExportMetadata for FixedExports {
	fn exports(&self, location: &Location) -> Result<BTreeSet<String>, MetadataError> {
		self.table
			.get(location)
			.cloned()
			.ok_or_else(|| MetadataError::MissingManifest {
				location: location.clone(),
			})
	}
}
