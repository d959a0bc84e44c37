//! Client configuration: server address, client credentials, and token-cache settings.
//!
//! [`ClientConfig`] is immutable once built. Validation happens in
//! [`ClientConfigBuilder::build`] so the session and dispatcher can assume a parseable HTTP(S)
//! base address and a positive attempt bound. Missing client credentials are tolerated here
//! because a cached token may still be usable; the session reports them only when an exchange is
//! actually required.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{_prelude::*, error::ConfigError};

/// Cache key used when callers enable caching without choosing their own key.
pub const DEFAULT_CACHE_KEY: &str = "powerschool_token";
/// Path of the OAuth token endpoint relative to the server address.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/access_token";
/// Total attempts allowed when the API keeps reporting an expired token.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Immutable connection settings shared by the session and dispatcher.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base address of the PowerSchool instance.
	pub server_address: Url,
	/// OAuth client identifier, if configured.
	pub client_id: Option<ClientId>,
	/// OAuth client secret, if configured. Redacted from `Debug` output.
	pub client_secret: Option<ClientSecret>,
	/// Key under which the bearer token is mirrored into the cache; `None` disables caching.
	pub cache_key: Option<String>,
	/// Token endpoint path joined onto the server address.
	pub token_path: String,
	/// Total attempts per logical call while the API reports an expired token.
	pub max_attempts: u8,
}
impl ClientConfig {
	/// Creates an empty builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Returns true when both the client id and secret are present and non-empty.
	pub fn has_credentials(&self) -> bool {
		let id = self.client_id.as_ref().is_some_and(|id| !id.as_str().is_empty());
		let secret = self.client_secret.as_ref().is_some_and(|s| !s.secret().is_empty());

		id && secret
	}

	/// Resolves `endpoint` against the server address.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		self.server_address.join(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
			endpoint: endpoint.to_owned(),
			source,
		})
	}

	/// Resolves the token endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.endpoint_url(&self.token_path)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	server_address: Option<String>,
	client_id: Option<String>,
	client_secret: Option<String>,
	cache_key: Option<String>,
	token_path: Option<String>,
	max_attempts: Option<u8>,
}
impl ClientConfigBuilder {
	/// Sets the server address (scheme + host, optionally a port).
	pub fn server_address(mut self, address: impl Into<String>) -> Self {
		self.server_address = Some(address.into());

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, id: impl Into<String>) -> Self {
		self.client_id = Some(id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Enables token caching under `key`.
	pub fn cache_key(mut self, key: impl Into<String>) -> Self {
		self.cache_key = Some(key.into());

		self
	}

	/// Enables token caching under [`DEFAULT_CACHE_KEY`].
	pub fn default_cache_key(self) -> Self {
		self.cache_key(DEFAULT_CACHE_KEY)
	}

	/// Overrides the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = Some(path.into());

		self
	}

	/// Overrides the total attempt bound for expired-token retries.
	pub fn max_attempts(mut self, attempts: u8) -> Self {
		self.max_attempts = Some(attempts);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let address = self
			.server_address
			.filter(|address| !address.trim().is_empty())
			.ok_or(ConfigError::MissingServerAddress)?;
		let server_address = Url::parse(address.trim()).map_err(|source| {
			ConfigError::InvalidServerAddress { address: address.clone(), source }
		})?;

		if !matches!(server_address.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme {
				scheme: server_address.scheme().to_owned(),
			});
		}

		let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);

		if max_attempts == 0 {
			return Err(ConfigError::InvalidMaxAttempts);
		}

		Ok(ClientConfig {
			server_address,
			client_id: self.client_id.map(ClientId::new),
			client_secret: self.client_secret.map(ClientSecret::new),
			cache_key: self.cache_key.filter(|key| !key.is_empty()),
			token_path: self.token_path.unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_owned()),
			max_attempts,
		})
	}
}
