//! Bearer token lifecycle for the client-credentials grant.
//!
//! [`AuthSession::authenticate`] returns the token already held in memory (or adopted from the
//! cache) unless the caller forces a new exchange. The session never inspects the local clock to
//! decide a token is stale; the dispatcher forces re-authentication when the API answers with an
//! expired-token challenge. Exchanges are serialized by an async mutex so concurrent callers
//! sharing a session piggy-back on one token request instead of stampeding the endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, basic_header},
	config::ClientConfig,
	error::ConfigError,
	http::{HttpRequest, HttpTransport, Method, header},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::TokenCache,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";
const GRANT_BODY: &[u8] = b"grant_type=client_credentials";

/// Owns the bearer token and performs the client-credentials exchange.
pub struct AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	config: Arc<ClientConfig>,
	http_client: Arc<C>,
	cache: Option<Arc<dyn TokenCache>>,
	token: RwLock<Option<AccessToken>>,
	exchange_guard: AsyncMutex<()>,
}
impl<C> AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a session; `cache` is consulted only when the config carries a cache key.
	pub fn new(
		config: Arc<ClientConfig>,
		http_client: Arc<C>,
		cache: Option<Arc<dyn TokenCache>>,
	) -> Self {
		Self {
			config,
			http_client,
			cache,
			token: RwLock::new(None),
			exchange_guard: AsyncMutex::new(()),
		}
	}

	/// Seeds the in-memory token, e.g. from a token obtained out of band.
	pub fn with_token(self, token: AccessToken) -> Self {
		*self.token.write() = Some(token);

		self
	}

	/// Returns the token currently held in memory.
	pub fn token(&self) -> Option<AccessToken> {
		self.token.read().clone().filter(|token| !token.value.is_empty())
	}

	/// Returns the active cache key when caching is enabled.
	pub fn cache_key(&self) -> Option<&str> {
		self.cache.as_ref().and(self.config.cache_key.as_deref())
	}

	/// Ensures a bearer token is available, exchanging credentials when needed.
	///
	/// Without `force`, a token held in memory or found in the cache is returned without any
	/// network call. With `force`, a new token is always requested and mirrored into the cache.
	pub async fn authenticate(&self, force: bool) -> Result<AccessToken> {
		if !force && let Some(token) = self.token() {
			return Ok(token);
		}

		const KIND: CallKind = CallKind::Authenticate;

		let span = CallSpan::new(KIND, if force { "forced" } else { "lazy" });

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _exchange = self.exchange_guard.lock().await;

				if !force {
					// Another caller may have finished an exchange while we waited.
					if let Some(token) = self.token() {
						return Ok(token);
					}
					if let Some(token) = self.load_cached().await? {
						*self.token.write() = Some(token.clone());

						return Ok(token);
					}
				}

				let token = self.exchange().await?;

				*self.token.write() = Some(token.clone());
				self.persist(&token).await?;

				Ok(token)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Drops the in-memory token and forgets the cached copy.
	pub async fn clear_cached_token(&self) -> Result<()> {
		*self.token.write() = None;

		if let (Some(cache), Some(key)) = (self.cache.as_ref(), self.config.cache_key.as_deref()) {
			cache.forget(key).await?;
		}

		Ok(())
	}

	async fn load_cached(&self) -> Result<Option<AccessToken>> {
		let (Some(cache), Some(key)) = (self.cache.as_ref(), self.config.cache_key.as_deref())
		else {
			return Ok(None);
		};

		Ok(cache.get(key).await?.filter(|token| !token.value.is_empty()))
	}

	async fn persist(&self, token: &AccessToken) -> Result<()> {
		let (Some(cache), Some(key)) = (self.cache.as_ref(), self.config.cache_key.as_deref())
		else {
			return Ok(());
		};
		let Some(ttl) = token.ttl_at(OffsetDateTime::now_utc()) else {
			return Ok(());
		};

		cache.put(key, token.clone(), ttl).await?;

		Ok(())
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let (Some(id), Some(secret)) = (
			self.config.client_id.as_ref().filter(|id| !id.as_str().is_empty()),
			self.config.client_secret.as_ref().filter(|secret| !secret.secret().is_empty()),
		) else {
			return Err(ConfigError::MissingCredentials.into());
		};
		let url = self.config.token_url()?;
		let request: HttpRequest = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(header::AUTHORIZATION, basic_header(id.as_str(), secret.secret()))
			.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(header::ACCEPT, "application/json")
			.body(GRANT_BODY.to_vec())
			.map_err(ConfigError::from)?;
		let response = self.http_client.execute(request).await?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::Authentication {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		AccessToken::from_response_body(response.body(), OffsetDateTime::now_utc())
	}
}
impl<C> Debug for AuthSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthSession")
			.field("server_address", &self.config.server_address.as_str())
			.field("cache_key", &self.cache_key())
			.field("token_set", &self.token.read().is_some())
			.finish()
	}
}
