//! Client-level error types shared across the session, dispatcher, builder, and caches.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::store::CacheError,
	),
	/// Local configuration problem; never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint rejected the client-credentials exchange.
	#[error("Token endpoint rejected the exchange with status {status}.")]
	Authentication {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Token endpoint answered 2xx but the payload could not be parsed.
	#[error("Token endpoint returned a malformed payload.")]
	TokenResponse {
		/// Structured parsing failure including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// API answered with a 4xx status other than a retryable expired token.
	#[error("API request failed with client error {status}.")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Decoded response body, or the raw text wrapped in a JSON string.
		body: Value,
	},
	/// API answered with a 5xx status.
	#[error("API request failed with server error {status}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Decoded response body, or the raw text wrapped in a JSON string.
		body: Value,
	},
	/// Every attempt was answered with an expired-token challenge.
	#[error("Access token still reported expired after {attempts} attempts.")]
	ExhaustedRetries {
		/// Number of attempts performed, including the first.
		attempts: u8,
		/// Body of the last 401 response.
		body: Value,
	},
	/// A successful response carried a body that is not valid JSON.
	#[error("API response with status {status} is not valid JSON.")]
	Decode {
		/// HTTP status code.
		status: u16,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}
impl Error {
	/// Returns the HTTP status attached to the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. }
			| Self::Client { status, .. }
			| Self::Server { status, .. }
			| Self::Decode { status, .. } => Some(*status),
			Self::ExhaustedRetries { .. } => Some(401),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),

	/// No server address was configured.
	#[error("No PowerSchool server address has been configured.")]
	MissingServerAddress,
	/// Server address cannot be parsed.
	#[error("Server address `{address}` is invalid.")]
	InvalidServerAddress {
		/// Address that failed to parse.
		address: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Server address uses something other than HTTP(S).
	#[error("Server address must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Rejected scheme.
		scheme: String,
	},
	/// Retry bound must allow at least one attempt.
	#[error("The attempt bound must be at least 1.")]
	InvalidMaxAttempts,
	/// Client id or secret is missing while a token exchange is required.
	#[error("Missing either client ID or secret; cannot authenticate.")]
	MissingCredentials,
	/// Request was sent without choosing an HTTP method.
	#[error("Request method has not been set.")]
	MissingMethod,
	/// Request was sent without a table, named query, or endpoint.
	#[error("Request endpoint has not been set.")]
	MissingEndpoint,
	/// Endpoint could not be joined onto the server address.
	#[error("Endpoint `{endpoint}` is invalid.")]
	InvalidEndpoint {
		/// Offending endpoint path.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
