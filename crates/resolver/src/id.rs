use std::fmt;

/// Unique identifier for a registered archive resolver.
///
/// Minted by the registry, unique for the registry's lifetime, never reused.
/// Ids order numerically, which is the stable iteration order used wherever
/// the contract leaves ordering unspecified.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolverId(u32);

impl ResolverId {
	pub(crate) const fn new(raw: u32) -> Self {
		Self(raw)
	}

	/// Returns the raw id value.
	pub const fn as_u32(self) -> u32 {
		self.0
	}
}

impl fmt::Display for ResolverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

impl fmt::Debug for ResolverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}
