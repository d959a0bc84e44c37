//! Transport primitives for API calls and token exchanges.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. Requests and responses
//! are the `http` crate types re-exported by `oauth2` ([`HttpRequest`], [`HttpResponse`]), so
//! any client that can execute an `http::Request<Vec<u8>>` can be plugged in. The transport
//! never interprets status codes; 4xx/5xx answers are returned as ordinary responses and
//! classified by the dispatcher.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

pub use oauth2::{
	HttpRequest, HttpResponse,
	http::{HeaderMap, HeaderValue, Method, StatusCode, header},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients able to execute a single request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// session and every request builder cloned from a client. Timeouts, TLS, and connection
/// pooling belong to the implementation.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the response regardless of its status code.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut converted = HttpResponse::new(response.bytes().await?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

/// Decodes a response body as JSON, mapping an empty body to `null`.
pub fn decode_json(response: &HttpResponse) -> Result<Value, serde_json::Error> {
	let body = response.body();

	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(body)
}

/// Decodes an error body as JSON, keeping non-JSON text as a JSON string.
pub fn decode_error_body(response: &HttpResponse) -> Value {
	decode_json(response)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(response.body()).into_owned()))
}
