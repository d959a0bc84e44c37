//! File-backed [`TokenCache`] that lets a token outlive the process that fetched it.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	store::{CacheEntry, CacheError, CacheFuture, TokenCache},
};

/// Persists cache entries to a JSON snapshot after each mutation.
///
/// Keys are stored as SHA-256 fingerprints so the snapshot never reveals which application or
/// tenant a token belongs to.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}
impl FileCache {
	/// Opens (or creates) a cache at the provided path, eagerly loading existing entries.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn fingerprint(key: &str) -> String {
		Sha256::digest(key.as_bytes()).iter().map(|byte| format!("{byte:02x}")).collect()
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, CacheEntry>, CacheError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, CacheEntry>) -> Result<(), CacheError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenCache for FileCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<AccessToken>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let fingerprint = Self::fingerprint(key);

			Ok(self
				.inner
				.read()
				.get(&fingerprint)
				.filter(|entry| entry.is_live_at(now))
				.map(|entry| entry.token.clone()))
		})
	}

	fn put<'a>(&'a self, key: &'a str, token: AccessToken, ttl: Duration) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let fingerprint = Self::fingerprint(key);
			let mut guard = self.inner.write();

			if ttl.is_positive() {
				guard.insert(fingerprint, CacheEntry::new(token, ttl, OffsetDateTime::now_utc()));
			} else {
				guard.remove(&fingerprint);
			}

			self.persist_locked(&guard)
		})
	}

	fn forget<'a>(&'a self, key: &'a str) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(&Self::fingerprint(key)).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}
}
