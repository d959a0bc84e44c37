//! Thread-safe in-memory [`TokenCache`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	store::{CacheEntry, CacheError, CacheFuture, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Cache backend that keeps tokens in-process, evicting them lazily once their TTL elapses.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Returns the number of live entries.
	pub fn len(&self) -> usize {
		let now = OffsetDateTime::now_utc();

		self.0.read().values().filter(|entry| entry.is_live_at(now)).count()
	}

	/// Returns true when no live entry remains.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get_now(map: CacheMap, key: &str) -> Option<AccessToken> {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.write();

		match guard.get(key) {
			Some(entry) if entry.is_live_at(now) => Some(entry.token.clone()),
			Some(_) => {
				guard.remove(key);

				None
			},
			None => None,
		}
	}

	fn put_now(map: CacheMap, key: &str, token: AccessToken, ttl: Duration) -> Result<(), CacheError> {
		let now = OffsetDateTime::now_utc();

		if !ttl.is_positive() {
			map.write().remove(key);

			return Ok(());
		}

		map.write().insert(key.to_owned(), CacheEntry::new(token, ttl, now));

		Ok(())
	}
}
impl TokenCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<AccessToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn put<'a>(&'a self, key: &'a str, token: AccessToken, ttl: Duration) -> CacheFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, key, token, ttl) })
	}

	fn forget<'a>(&'a self, key: &'a str) -> CacheFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}
