//! Token cache contract and the built-in in-memory implementation.
//!
//! The cache is injectable so hosts wire one process-wide instance while tests use a fresh
//! one per run. Entries are only ever replaced, never mutated in place or evicted.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for cached access tokens.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the entry cached under `key`, if any.
	fn fetch<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<TokenCacheEntry>>;

	/// Stores `entry` under `key`, replacing any previous entry.
	fn save(&self, key: CacheKey, entry: TokenCacheEntry) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Composite cache key; each component isolates tokens independently.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	/// Integration key (OAuth client id).
	pub client_id: String,
	/// Impersonated user id.
	pub subject_id: String,
	/// OAuth host the token was minted by.
	pub auth_host: String,
}
impl CacheKey {
	/// Builds a key from its three components.
	pub fn new(
		client_id: impl Into<String>,
		subject_id: impl Into<String>,
		auth_host: impl Into<String>,
	) -> Self {
		Self { client_id: client_id.into(), subject_id: subject_id.into(), auth_host: auth_host.into() }
	}
}

/// Cached access token with its absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenCacheEntry {
	/// Bearer token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant the provider stops accepting the token.
	pub expires_at: OffsetDateTime,
}
impl TokenCacheEntry {
	/// Returns `true` when more than `buffer` remains before expiry at `now`.
	pub fn is_live_at(&self, now: OffsetDateTime, buffer: Duration) -> bool {
		self.expires_at - now > buffer
	}
}
