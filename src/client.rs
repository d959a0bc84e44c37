//! Authenticated dispatcher shared by every request builder.
//!
//! [`Client::dispatch`] attaches JSON and bearer headers, executes the call, and recovers from
//! one specific failure: a `401` whose `WWW-Authenticate` header says the token *expired*. In
//! that case the session is forced to re-authenticate and the identical request is re-sent,
//! up to [`ClientConfig::max_attempts`] total attempts. Every other status is surfaced
//! unchanged.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthSession},
	config::ClientConfig,
	error::ConfigError,
	http::{self, HeaderMap, HeaderValue, HttpRequest, HttpResponse, HttpTransport, StatusCode, header},
	obs::{self, CallKind, CallOutcome, CallSpan, trace_debug},
	request::{ApiMethod, RequestBuilder},
	store::TokenCache,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type DefaultClient = Client<ReqwestHttpClient>;

const JSON: &str = "application/json";
const EXPIRED_MARKER: &str = "expired";

/// Wire-ready parts of a request that the dispatcher does not derive itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
	/// Pre-built query string without the leading `?`.
	pub query: Option<String>,
	/// JSON body.
	pub json: Option<Value>,
	/// Extra headers; `Accept`, `Content-Type`, and `Authorization` are always overwritten.
	pub headers: HeaderMap,
}

/// Entry point owning the configuration, transport, and auth session.
pub struct Client<C>
where
	C: ?Sized + HttpTransport,
{
	config: Arc<ClientConfig>,
	http_client: Arc<C>,
	session: Arc<AuthSession<C>>,
}
impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// `cache` is the key-value store the bearer token is mirrored into; it is only consulted
	/// when the configuration carries a cache key.
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		cache: Option<Arc<dyn TokenCache>>,
	) -> Self {
		let config = Arc::new(config);
		let http_client = http_client.into();
		let session = Arc::new(AuthSession::new(config.clone(), http_client.clone(), cache));

		Self { config, http_client, session }
	}

	/// Returns the validated configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Returns the auth session shared by every builder created from this client.
	pub fn session(&self) -> &AuthSession<C> {
		&self.session
	}

	/// Fetches a token, exchanging credentials when `force` is set or none is held.
	pub async fn authenticate(&self, force: bool) -> Result<AccessToken> {
		self.session.authenticate(force).await
	}

	/// Drops the held token and removes it from the cache.
	pub async fn clear_cached_token(&self) -> Result<()> {
		self.session.clear_cached_token().await
	}

	/// Starts an empty request.
	pub fn request(&self) -> RequestBuilder<C> {
		RequestBuilder::new(self.clone())
	}

	/// Starts a request against a table resource.
	pub fn table(&self, table: &str) -> RequestBuilder<C> {
		self.request().table(table)
	}

	/// Starts a named-query request.
	pub fn named_query(&self, name: &str) -> RequestBuilder<C> {
		self.request().named_query(name)
	}

	/// Starts a request against an arbitrary resource path.
	pub fn resource(&self, endpoint: &str) -> RequestBuilder<C> {
		self.request().resource(endpoint)
	}

	/// Executes an authenticated call and returns the decoded JSON body.
	pub async fn dispatch(
		&self,
		method: ApiMethod,
		endpoint: &str,
		options: &RequestOptions,
	) -> Result<Value> {
		const KIND: CallKind = CallKind::Dispatch;

		let span = CallSpan::new(KIND, method.as_str());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.dispatch_with_retry(method, endpoint, options)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn dispatch_with_retry(
		&self,
		method: ApiMethod,
		endpoint: &str,
		options: &RequestOptions,
	) -> Result<Value> {
		let url = self.request_url(endpoint, options.query.as_deref())?;
		let body = options.json.as_ref().map(|json| json.to_string().into_bytes());
		let mut token = self.session.authenticate(false).await?;
		let mut attempts = 0_u8;

		loop {
			attempts += 1;

			let request = build_request(method, &url, options, body.clone(), &token)?;
			let response = self.http_client.execute(request).await?;

			obs::record_response_status(response.status().as_u16());

			if !is_expired_token(&response) {
				return classify(response);
			}
			if attempts >= self.config.max_attempts {
				return Err(Error::ExhaustedRetries {
					attempts,
					body: http::decode_error_body(&response),
				});
			}

			obs::record_call_outcome(CallKind::Dispatch, CallOutcome::Retry);
			trace_debug!(attempts, endpoint, "Access token expired; re-authenticating.");

			token = self.session.authenticate(true).await?;
		}
	}

	fn request_url(&self, endpoint: &str, query: Option<&str>) -> Result<Url> {
		if endpoint.is_empty() {
			return Err(ConfigError::MissingEndpoint.into());
		}

		let mut url = self.config.endpoint_url(endpoint)?;

		if let Some(query) = query.filter(|query| !query.is_empty()) {
			url.set_query(Some(query));
		}

		Ok(url)
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: ClientConfig, cache: Option<Arc<dyn TokenCache>>) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default(), cache)
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			http_client: self.http_client.clone(),
			session: self.session.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("session", &self.session)
			.finish()
	}
}

/// Reports whether `response` is the API's expired-token challenge.
///
/// Only a `401` whose `WWW-Authenticate` value contains the literal `expired` qualifies;
/// malformed or revoked tokens produce other challenge texts and are not retried.
pub fn is_expired_token(response: &HttpResponse) -> bool {
	response.status() == StatusCode::UNAUTHORIZED
		&& response
			.headers()
			.get_all(header::WWW_AUTHENTICATE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.any(|value| value.contains(EXPIRED_MARKER))
}

fn build_request(
	method: ApiMethod,
	url: &Url,
	options: &RequestOptions,
	body: Option<Vec<u8>>,
	token: &AccessToken,
) -> Result<HttpRequest> {
	let mut headers = options.headers.clone();
	let bearer = HeaderValue::from_str(&token.value.bearer_header())
		.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)))?;

	headers.insert(header::ACCEPT, HeaderValue::from_static(JSON));
	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
	headers.insert(header::AUTHORIZATION, bearer);

	let mut request = oauth2::http::Request::builder()
		.method(method.as_http())
		.uri(url.as_str())
		.body(body.unwrap_or_default())
		.map_err(ConfigError::from)?;

	*request.headers_mut() = headers;

	Ok(request)
}

fn classify(response: HttpResponse) -> Result<Value> {
	let status = response.status();

	if status.is_success() {
		return http::decode_json(&response)
			.map_err(|source| Error::Decode { status: status.as_u16(), source });
	}

	let body = http::decode_error_body(&response);

	if status.is_server_error() {
		Err(Error::Server { status: status.as_u16(), body })
	} else {
		Err(Error::Client { status: status.as_u16(), body })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: StatusCode, challenge: Option<&str>) -> HttpResponse {
		let mut response = HttpResponse::new(Vec::new());

		*response.status_mut() = status;

		if let Some(challenge) = challenge {
			response.headers_mut().insert(
				header::WWW_AUTHENTICATE,
				HeaderValue::from_str(challenge).expect("Fixture header should be valid."),
			);
		}

		response
	}

	#[test]
	fn only_expired_challenges_are_retryable() {
		assert!(is_expired_token(&response(
			StatusCode::UNAUTHORIZED,
			Some("Bearer error=\"invalid_token\", error_description=\"The access token expired\""),
		)));
		assert!(!is_expired_token(&response(
			StatusCode::UNAUTHORIZED,
			Some("Bearer error=\"invalid_token\", error_description=\"Malformed token\""),
		)));
		assert!(!is_expired_token(&response(StatusCode::UNAUTHORIZED, None)));
		assert!(!is_expired_token(&response(StatusCode::FORBIDDEN, Some("token expired"))));
	}

	#[test]
	fn build_request_overwrites_reserved_headers() {
		let url = Url::parse("https://ps.example.com/ws/v1/district?expansions=a")
			.expect("Fixture URL should parse.");
		let mut options = RequestOptions::default();

		options.headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
		options.headers.insert("x-trace", HeaderValue::from_static("abc"));

		let token = AccessToken::new("T", OffsetDateTime::now_utc(), Duration::hours(1));
		let request = build_request(ApiMethod::Get, &url, &options, None, &token)
			.expect("Request should build.");

		assert_eq!(request.headers()[header::ACCEPT], JSON);
		assert_eq!(request.headers()[header::CONTENT_TYPE], JSON);
		assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer T");
		assert_eq!(request.headers()["x-trace"], "abc");
		assert_eq!(request.uri().query(), Some("expansions=a"));
	}

	#[test]
	fn classify_splits_client_and_server_errors() {
		let err = classify(response(StatusCode::NOT_FOUND, None))
			.expect_err("404 should be surfaced.");

		assert!(matches!(err, Error::Client { status: 404, .. }));

		let err = classify(response(StatusCode::INTERNAL_SERVER_ERROR, None))
			.expect_err("500 should be surfaced.");

		assert!(matches!(err, Error::Server { status: 500, .. }));
		assert_eq!(
			classify(response(StatusCode::NO_CONTENT, None)).expect("204 should decode."),
			Value::Null
		);
	}
}
