//! Async client for the PowerSchool REST API: client-credentials sessions that recover from
//! expired tokens, a fluent request builder that emits wire-exact table, named-query, and
//! resource calls, and a response envelope that normalizes the service's inconsistent JSON.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod paginator;
pub mod request;
pub mod response;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::Client,
		config::ClientConfig,
		http::ReqwestHttpClient,
		store::{MemoryCache, TokenCache},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestHttpClient>;

	/// Cache key shared by integration tests.
	pub const TEST_CACHE_KEY: &str = "powerschool_test_token";

	/// Builds a validated configuration pointing at `server_url` with caching enabled.
	pub fn test_config(server_url: &str, client_id: &str, client_secret: &str) -> ClientConfig {
		ClientConfig::builder()
			.server_address(server_url)
			.client_id(client_id)
			.client_secret(client_secret)
			.cache_key(TEST_CACHE_KEY)
			.build()
			.expect("Test configuration should build successfully.")
	}

	/// Constructs a [`Client`] backed by an in-memory cache and the reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_client(
		server_url: &str,
		client_id: &str,
		client_secret: &str,
	) -> (ReqwestTestClient, Arc<MemoryCache>) {
		let cache_backend = Arc::new(MemoryCache::default());
		let cache: Arc<dyn TokenCache> = cache_backend.clone();
		let client = Client::with_http_client(
			test_config(server_url, client_id, client_secret),
			ReqwestHttpClient::default(),
			Some(cache),
		);

		(client, cache_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use {serde_json, url};
#[cfg(test)] use {color_eyre as _, httpmock as _};
