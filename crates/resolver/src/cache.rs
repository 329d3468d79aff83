//! Process-wide already-loaded type cache.
//!
//! # Role
//!
//! Every resolver consults this cache before any search and publishes every
//! successful load into it. Reads are lock-free snapshot loads; inserts
//! publish a new snapshot through a compare-and-swap loop.
//!
//! # Invariants
//!
//! - The first insert for a symbol wins; later inserts return the pinned
//!   entry, so a symbol resolves to one `Arc<LoadedType>` for the cache's
//!   lifetime.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::symbol::LoadedType;

/// Map from fully qualified symbol name to its loaded type.
pub struct TypeCache {
	map: ArcSwap<FxHashMap<String, Arc<LoadedType>>>,
}

impl TypeCache {
	pub(crate) fn new() -> Self {
		Self {
			map: ArcSwap::from_pointee(FxHashMap::default()),
		}
	}

	/// Returns the cached type for `symbol`, if any.
	pub fn get(&self, symbol: &str) -> Option<Arc<LoadedType>> {
		self.map.load().get(symbol).cloned()
	}

	/// Inserts `loaded` unless the symbol is already cached; returns the
	/// winning entry either way.
	pub fn insert(&self, loaded: LoadedType) -> Arc<LoadedType> {
		let candidate = Arc::new(loaded);
		loop {
			let old = self.map.load_full();
			if let Some(existing) = old.get(&candidate.name) {
				return existing.clone();
			}
			let mut next = (*old).clone();
			next.insert(candidate.name.clone(), candidate.clone());

			let prev = self.map.compare_and_swap(&old, Arc::new(next));
			if Arc::ptr_eq(&prev, &old) {
				return candidate;
			}
			// Lost the race; retry against the new snapshot.
		}
	}

	/// Number of cached types.
	pub fn len(&self) -> usize {
		self.map.load().len()
	}

	/// True when nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
