//! Request construction for table, named-query, and raw resource endpoints.
//!
//! A [`PendingRequest`] is a plain state struct; [`PendingRequest::compile`] turns it into the
//! [`CompiledRequest`] that goes on the wire. [`RequestBuilder`] wraps the state with fluent
//! setters and a client handle. Builders are consumed by [`RequestBuilder::send`], so every
//! logical call starts from fresh state unless the caller explicitly keeps the builder around.

pub mod builder;
pub mod query;
pub mod sanitize;

pub use builder::*;
pub use query::*;
pub use sanitize::*;

// self
use crate::{_prelude::*, client::RequestOptions, error::ConfigError, http::Method};

/// Prefix of table endpoints.
pub const TABLE_PREFIX: &str = "/ws/schema/table/";
/// Prefix of named-query endpoints.
pub const NAMED_QUERY_PREFIX: &str = "/ws/schema/query/";
/// Prefix of data-version subscription endpoints.
pub const DATA_VERSION_PREFIX: &str = "/ws/dataversion/";
/// Record key used to locate the data of table and named-query responses.
pub const DEFAULT_RECORD_KEY: &str = "record";

/// HTTP methods the API accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl ApiMethod {
	/// Lowercase label used in spans and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "get",
			Self::Post => "post",
			Self::Put => "put",
			Self::Patch => "patch",
			Self::Delete => "delete",
		}
	}

	/// Converts into the `http` crate method.
	pub fn as_http(self) -> Method {
		match self {
			Self::Get => Method::GET,
			Self::Post => Method::POST,
			Self::Put => Method::PUT,
			Self::Patch => Method::PATCH,
			Self::Delete => Method::DELETE,
		}
	}

	/// Whether the method carries a JSON body.
	pub const fn has_body(self) -> bool {
		!matches!(self, Self::Get | Self::Delete)
	}

	/// Whether the accumulated query variables are sent.
	pub const fn has_query(self) -> bool {
		matches!(self, Self::Get | Self::Post)
	}
}
impl Display for ApiMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Which endpoint family a request targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndpointShape {
	/// `/ws/schema/table/{table}[/{id}]`.
	Table,
	/// `/ws/schema/query/{name}`, always `POST`.
	NamedQuery,
	/// Any endpoint set directly by the caller.
	#[default]
	Resource,
}

/// Mutable request state accumulated by the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRequest {
	/// Path relative to the server address.
	pub endpoint: Option<String>,
	/// HTTP method; sending without one is an error.
	pub method: Option<ApiMethod>,
	/// Table name for table endpoints.
	pub table: Option<String>,
	/// Record id when the request is scoped to one record.
	pub id: Option<Value>,
	/// Query variables in insertion order.
	pub query: QueryVars,
	/// Sanitized body fields.
	pub data: Option<Value>,
	/// Whether GET requests receive `projection=*` when no projection was set.
	pub include_projection: bool,
	/// Endpoint family.
	pub shape: EndpointShape,
	/// Key the response envelope looks for when locating data.
	pub record_key: String,
}
impl PendingRequest {
	/// Compiles the state into a wire-ready request.
	pub fn compile(&self) -> Result<CompiledRequest, ConfigError> {
		let method = self.method.ok_or(ConfigError::MissingMethod)?;
		let endpoint = self
			.endpoint
			.clone()
			.filter(|endpoint| !endpoint.is_empty())
			.ok_or(ConfigError::MissingEndpoint)?;

		Ok(CompiledRequest {
			method,
			endpoint,
			options: RequestOptions {
				query: self.build_query(method),
				json: self.build_body(method),
				..Default::default()
			},
		})
	}

	fn build_body(&self, method: ApiMethod) -> Option<Value> {
		if !method.has_body() {
			return None;
		}

		let data = self.data.as_ref().filter(|data| !is_blank(data));
		let mut body = Map::new();

		if let Some(table) = &self.table {
			let mut tables = Map::new();

			tables.insert(table.clone(), data.cloned().unwrap_or(Value::Null));
			body.insert("tables".into(), Value::Object(tables));
		}
		if let Some(id) = &self.id {
			body.insert("id".into(), id.clone());
			body.insert("name".into(), self.table.clone().map(Value::String).unwrap_or(Value::Null));
		}
		if self.table.is_none()
			&& let Some(data) = data
		{
			return Some(data.clone());
		}
		if body.is_empty() {
			return None;
		}

		Some(Value::Object(body))
	}

	fn build_query(&self, method: ApiMethod) -> Option<String> {
		if !method.has_query() {
			return None;
		}

		let mut query = self.query.clone();

		if method == ApiMethod::Get && self.include_projection && !query.has("projection") {
			query.insert("projection", "*");
		}

		Some(query.to_query_string()).filter(|query| !query.is_empty())
	}
}
impl Default for PendingRequest {
	fn default() -> Self {
		Self {
			endpoint: None,
			method: None,
			table: None,
			id: None,
			query: QueryVars::default(),
			data: None,
			include_projection: true,
			shape: EndpointShape::default(),
			record_key: String::new(),
		}
	}
}

/// Wire-ready request produced by [`PendingRequest::compile`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledRequest {
	/// HTTP method.
	pub method: ApiMethod,
	/// Path relative to the server address.
	pub endpoint: String,
	/// Query string and JSON body.
	pub options: RequestOptions,
}
impl CompiledRequest {
	/// Query string, if any.
	pub fn query(&self) -> Option<&str> {
		self.options.query.as_deref()
	}

	/// JSON body, if any.
	pub fn body(&self) -> Option<&Value> {
		self.options.json.as_ref()
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Object(map) => map.is_empty(),
		Value::Array(items) => items.is_empty(),
		_ => false,
	}
}
