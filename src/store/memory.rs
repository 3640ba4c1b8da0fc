//! Thread-safe in-memory [`TokenStore`] implementation.
//!
//! Concurrent refreshes for one key race benignly: both writers store valid bearer tokens and
//! the last insert wins.

// self
use crate::{
	_prelude::*,
	store::{CacheKey, StoreFuture, TokenCacheEntry, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<CacheKey, TokenCacheEntry>>>;

/// Process-local token cache.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of cached entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether the cache is empty.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryStore {
	fn fetch<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<TokenCacheEntry>> {
		let entry = self.0.read().get(key).cloned();

		Box::pin(async move { Ok(entry) })
	}

	fn save(&self, key: CacheKey, entry: TokenCacheEntry) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key, entry);

			Ok(())
		})
	}
}
