//! Bearer token records and token-endpoint payload parsing.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const FALLBACK_TTL: Duration = Duration::hours(1);

/// Bearer token issued by the client-credentials exchange.
///
/// `expires_at` is informational: the session never distrusts a token because of the local
/// clock. Expiry is detected from the API's 401 challenge instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Token value sent as `Authorization: Bearer <value>`.
	pub value: TokenSecret,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Instant the server said the token stops being valid.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a token issued at `issued_at` that lives for `lifetime`.
	pub fn new(value: impl Into<String>, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		Self { value: TokenSecret::new(value), issued_at, expires_at: issued_at + lifetime }
	}

	/// Parses a token-endpoint body, reporting the failing field path on malformed JSON.
	pub fn from_response_body(body: &[u8], issued_at: OffsetDateTime) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let payload: TokenPayload = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::TokenResponse { source })?;
		let lifetime = payload.expires_in.map(Duration::seconds).unwrap_or(FALLBACK_TTL);

		Ok(Self::new(payload.access_token, issued_at, lifetime))
	}

	/// Remaining lifetime used as the cache TTL, or `None` when nothing is left to cache.
	pub fn ttl_at(&self, now: OffsetDateTime) -> Option<Duration> {
		let remaining = self.expires_at - now;

		remaining.is_positive().then_some(remaining)
	}
}

#[derive(Deserialize)]
struct TokenPayload {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}
