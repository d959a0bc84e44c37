//! Redacting wrappers and header encoders for bearer tokens and client credentials.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Bearer token wrapper that keeps the value out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true for the empty token the API never issues.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Formats the `Authorization` header value for API calls.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Formats the `Authorization: Basic` header value used by the token exchange.
///
/// The id and secret are joined with `:` and base64-encoded verbatim, without the
/// form-urlencoding some OAuth libraries apply first.
pub fn basic_header(client_id: &str, client_secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}
