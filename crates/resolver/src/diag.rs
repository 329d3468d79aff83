//! Per-resolver diagnostic flag state.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use strata_catalog::namespace_of;

/// Diagnostic enablement flags for one resolver: a default, per-namespace
/// overrides and per-symbol overrides.
///
/// The aggregate resolver broadcasts flag changes to every member, the common
/// resolver and its own flags; there is no result aggregation.
#[derive(Default)]
pub struct DiagnosticFlags {
	state: RwLock<DiagState>,
}

#[derive(Default)]
struct DiagState {
	default_enabled: bool,
	namespaces: FxHashMap<String, bool>,
	symbols: FxHashMap<String, bool>,
}

impl DiagnosticFlags {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Sets the default for symbols with no more specific override.
	pub fn set_default(&self, enabled: bool) {
		self.state.write().default_enabled = enabled;
	}

	/// Overrides the flag for every symbol in a namespace.
	pub fn set_namespace(&self, namespace: &str, enabled: bool) {
		self.state.write().namespaces.insert(namespace.to_string(), enabled);
	}

	/// Overrides the flag for a single symbol.
	pub fn set_symbol(&self, symbol: &str, enabled: bool) {
		self.state.write().symbols.insert(symbol.to_string(), enabled);
	}

	/// Drops every override and resets the default.
	pub fn clear(&self) {
		*self.state.write() = DiagState::default();
	}

	/// Resolves the effective flag for a symbol: symbol override, then its
	/// namespace, then the default.
	pub fn enabled_for(&self, symbol: &str) -> bool {
		let state = self.state.read();
		if let Some(&enabled) = state.symbols.get(symbol) {
			return enabled;
		}
		if let Some(&enabled) = state.namespaces.get(namespace_of(symbol)) {
			return enabled;
		}
		state.default_enabled
	}
}
