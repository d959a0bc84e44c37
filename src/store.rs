//! Token cache contract and built-in cache implementations.
//!
//! The session mirrors every issued bearer token into a [`TokenCache`] under the configured
//! cache key so that other client instances (or later processes, with [`FileCache`]) can reuse
//! it. Implementations must make `put` atomic; concurrent clients sharing a key may then
//! re-authenticate redundantly but never observe a torn value.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

// self
use crate::{_prelude::*, auth::AccessToken};

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key-value cache collaborator holding bearer tokens.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the token stored under `key`, if present and not past its TTL.
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<AccessToken>>;

	/// Stores `token` under `key` for `ttl`.
	fn put<'a>(&'a self, key: &'a str, token: AccessToken, ttl: Duration) -> CacheFuture<'a, ()>;

	/// Removes the entry stored under `key`.
	fn forget<'a>(&'a self, key: &'a str) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Cached token plus the instant after which it must read as absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
	/// Cached token.
	pub token: AccessToken,
	/// Instant the entry's TTL runs out.
	pub evict_at: OffsetDateTime,
}
impl CacheEntry {
	/// Creates an entry that lives for `ttl` from `now`.
	pub fn new(token: AccessToken, ttl: Duration, now: OffsetDateTime) -> Self {
		Self { token, evict_at: now + ttl }
	}

	/// Returns true while the TTL has not elapsed.
	pub fn is_live_at(&self, now: OffsetDateTime) -> bool {
		now < self.evict_at
	}
}
