use std::fmt;
use std::path::{Path, PathBuf};

/// An immutable archive location: a directory or packed-bundle path.
///
/// Locations identify archives for their whole registration lifetime; the
/// resolver core only ever compares and displays them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(PathBuf);

impl Location {
	/// Creates a location from a path.
	///
	/// Emptiness is validated at registration time, not here, so callers can
	/// build locations infallibly.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self(path.into())
	}

	/// Returns the underlying path.
	pub fn path(&self) -> &Path {
		&self.0
	}

	/// Returns true for the empty location, which no operation accepts.
	pub fn is_empty(&self) -> bool {
		self.0.as_os_str().is_empty()
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.display())
	}
}

impl From<PathBuf> for Location {
	fn from(path: PathBuf) -> Self {
		Self(path)
	}
}

impl From<&Path> for Location {
	fn from(path: &Path) -> Self {
		Self(path.to_path_buf())
	}
}

impl From<&str> for Location {
	fn from(path: &str) -> Self {
		Self(PathBuf::from(path))
	}
}
