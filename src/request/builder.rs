//! Fluent front-end over [`PendingRequest`].

// self
use crate::{
	_prelude::*,
	client::Client,
	http::HttpTransport,
	paginator::{DEFAULT_PAGE_SIZE, Paginator},
	request::{
		ApiMethod, ColumnList, CompiledRequest, DATA_VERSION_PREFIX, DEFAULT_RECORD_KEY,
		EndpointShape, NAMED_QUERY_PREFIX, PendingRequest, QueryVars, TABLE_PREFIX, plain_string,
		sanitize,
	},
	response::Response,
};

/// Fluent request builder bound to a [`Client`].
///
/// Setters consume and return the builder. [`send`](Self::send) and the method shortcuts
/// consume it too, so state never leaks into the next call; use
/// [`send_preserving`](Self::send_preserving) to re-send the same state.
///
/// ```no_run
/// # async fn demo(client: powerschool_api::client::DefaultClient) -> powerschool_api::error::Result<()> {
/// let students = client
/// 	.table("u_customtable")
/// 	.projection(["id", "column1"])
/// 	.q("column1==value")
/// 	.page_size(5)
/// 	.get()
/// 	.await?;
///
/// for record in &students {
/// 	println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder<C>
where
	C: ?Sized + HttpTransport,
{
	client: Client<C>,
	request: PendingRequest,
}
impl<C> RequestBuilder<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an empty builder.
	pub fn new(client: Client<C>) -> Self {
		Self { client, request: PendingRequest::default() }
	}

	/// Client the builder dispatches through.
	pub fn client(&self) -> &Client<C> {
		&self.client
	}

	/// Accumulated state.
	pub fn state(&self) -> &PendingRequest {
		&self.request
	}

	/// Mutable access to the accumulated state.
	pub fn state_mut(&mut self) -> &mut PendingRequest {
		&mut self.request
	}

	/// Discards all accumulated state, keeping the client.
	pub fn freshen(mut self) -> Self {
		self.request = PendingRequest::default();

		self
	}

	/// Targets a table; the endpoint becomes `/ws/schema/table/{table}`.
	///
	/// A value starting with `/` is taken as the full endpoint path.
	pub fn table(mut self, table: &str) -> Self {
		self.request.endpoint = Some(if table.starts_with('/') {
			table.to_owned()
		} else {
			format!("{TABLE_PREFIX}{table}")
		});
		self.request.table = Some(table.to_owned());
		self.request.shape = EndpointShape::Table;
		self.request.record_key = DEFAULT_RECORD_KEY.into();

		self
	}

	/// Alias of [`table`](Self::table).
	pub fn for_table(self, table: &str) -> Self {
		self.table(table)
	}

	/// Scopes the request to one record by appending `/{id}` to the endpoint.
	pub fn id(mut self, id: impl Into<Value>) -> Self {
		let id = id.into();
		let segment = plain_string(&id);

		self.request.endpoint = Some(match self.request.endpoint.take() {
			Some(endpoint) => format!("{}/{segment}", endpoint.trim_end_matches('/')),
			None => format!("/{segment}"),
		});
		self.request.id = Some(id);

		self
	}

	/// Alias of [`id`](Self::id).
	pub fn for_id(self, id: impl Into<Value>) -> Self {
		self.id(id)
	}

	/// Sets the endpoint path without changing the endpoint family.
	pub fn endpoint(mut self, endpoint: &str) -> Self {
		self.request.endpoint = Some(endpoint.to_owned());

		self
	}

	/// Alias of [`endpoint`](Self::endpoint).
	pub fn to(self, endpoint: &str) -> Self {
		self.endpoint(endpoint)
	}

	/// Targets an arbitrary resource path; no projection is injected.
	pub fn resource(mut self, endpoint: &str) -> Self {
		self.request.endpoint = Some(endpoint.to_owned());
		self.request.include_projection = false;
		self.request.shape = EndpointShape::Resource;

		self
	}

	/// Targets `endpoint` with `method` and `data`, then sends immediately.
	pub async fn resource_with(
		self,
		endpoint: &str,
		method: ApiMethod,
		data: impl Into<Value>,
	) -> Result<Response> {
		self.resource(endpoint).method(method).data(data).send().await
	}

	/// Skips the default `projection=*` on GET requests.
	pub fn exclude_projection(mut self) -> Self {
		self.request.include_projection = false;

		self
	}

	/// Alias of [`exclude_projection`](Self::exclude_projection).
	pub fn without_projection(self) -> Self {
		self.exclude_projection()
	}

	/// Targets the named query `name`; the method is fixed to `POST`.
	pub fn named_query(mut self, name: &str) -> Self {
		self.request.endpoint = Some(format!("{NAMED_QUERY_PREFIX}{name}"));
		self.request.method = Some(ApiMethod::Post);
		self.request.include_projection = false;
		self.request.shape = EndpointShape::NamedQuery;
		self.request.record_key = DEFAULT_RECORD_KEY.into();

		self
	}

	/// Alias of [`named_query`](Self::named_query).
	pub fn power_query(self, name: &str) -> Self {
		self.named_query(name)
	}

	/// Runs the named query `name` with `data` as its parameters.
	pub async fn named_query_with(self, name: &str, data: impl Into<Value>) -> Result<Response> {
		self.named_query(name).data(data).post().await
	}

	/// Replaces the body fields; every scalar leaf is coerced to a string.
	pub fn data(mut self, data: impl Into<Value>) -> Self {
		self.request.data = Some(sanitize(data.into()));

		self
	}

	/// Alias of [`data`](Self::data).
	pub fn with(self, data: impl Into<Value>) -> Self {
		self.data(data)
	}

	/// Adds the `$dataversion` fields used by data-version subscriptions.
	pub fn data_version(mut self, version: u64, application: &str) -> Self {
		let mut data = match self.request.data.take() {
			Some(Value::Object(data)) => data,
			_ => Map::new(),
		};

		data.insert("$dataversion".into(), Value::String(version.to_string()));
		data.insert("$dataversion_applicationname".into(), Value::String(application.to_owned()));
		self.request.data = Some(Value::Object(data));

		self
	}

	/// Replaces all query variables with the pairs parsed from `query`.
	pub fn query_string(mut self, query: &str) -> Self {
		self.request.query = QueryVars::parse(query);

		self
	}

	/// Sets one query variable.
	pub fn query_var(mut self, key: &str, value: impl Display) -> Self {
		self.request.query.insert(key, value.to_string());

		self
	}

	/// Whether `key` is set to a non-empty value.
	pub fn has_query_var(&self, key: &str) -> bool {
		self.request.query.has(key)
	}

	/// Sets the `q` filter used by table endpoints.
	pub fn q(self, expression: &str) -> Self {
		self.query_var("q", expression)
	}

	/// Sets the `$q` filter used by named queries.
	pub fn filter(self, expression: &str) -> Self {
		self.query_var("$q", expression)
	}

	/// Alias of [`filter`](Self::filter).
	pub fn query_expression(self, expression: &str) -> Self {
		self.filter(expression)
	}

	/// Alias of [`filter`](Self::filter).
	pub fn ad_hoc_filter(self, expression: &str) -> Self {
		self.filter(expression)
	}

	/// Sets the `order` expression used by named queries.
	pub fn order(self, expression: &str) -> Self {
		self.query_var("order", expression)
	}

	/// Alias of [`order`](Self::order).
	pub fn ad_hoc_order(self, expression: &str) -> Self {
		self.order(expression)
	}

	/// Sorts by `columns`, optionally descending.
	pub fn sort(self, columns: impl ColumnList, descending: bool) -> Self {
		let builder = self.query_var("sort", columns.to_column_list());

		if descending { builder.query_var("sortdescending", "true") } else { builder }
	}

	/// Limits the returned columns.
	pub fn projection(self, columns: impl ColumnList) -> Self {
		self.query_var("projection", columns.to_column_list())
	}

	/// Sets `pagesize`.
	pub fn page_size(self, size: u32) -> Self {
		self.query_var("pagesize", size)
	}

	/// Sets `page`; pages start at 1.
	pub fn page(self, page: u32) -> Self {
		self.query_var("page", page)
	}

	/// Asks a named query to report its total row count.
	pub fn include_count(self) -> Self {
		self.query_var("count", "true")
	}

	/// Requests resource expansions.
	pub fn expansions(self, names: impl ColumnList) -> Self {
		self.query_var("expansions", names.to_column_list())
	}

	/// Requests resource extensions.
	pub fn extensions(self, names: impl ColumnList) -> Self {
		self.query_var("extensions", names.to_column_list())
	}

	/// Overrides the key the response envelope looks for when locating data.
	pub fn record_key(mut self, key: &str) -> Self {
		self.request.record_key = key.to_owned();

		self
	}

	/// Sets the HTTP method without sending.
	pub fn method(mut self, method: ApiMethod) -> Self {
		self.request.method = Some(method);

		self
	}

	/// Compiles the current state without sending it.
	pub fn compile(&self) -> Result<CompiledRequest> {
		Ok(self.request.compile()?)
	}

	/// Sends the request and wraps the reply in a [`Response`].
	pub async fn send(self) -> Result<Response> {
		self.send_preserving().await
	}

	/// Sends the request, keeping the builder state for another call.
	pub async fn send_preserving(&self) -> Result<Response> {
		let raw = self.send_raw_preserving().await?;

		Ok(self.wrap(raw))
	}

	/// Sends the request and returns the decoded JSON untouched.
	pub async fn send_raw(self) -> Result<Value> {
		self.send_raw_preserving().await
	}

	async fn send_raw_preserving(&self) -> Result<Value> {
		let compiled = self.compile()?;

		self.client.dispatch(compiled.method, &compiled.endpoint, &compiled.options).await
	}

	/// Sends as `GET`.
	pub async fn get(self) -> Result<Response> {
		self.method(ApiMethod::Get).send().await
	}

	/// Sends as `POST`.
	pub async fn post(self) -> Result<Response> {
		self.method(ApiMethod::Post).send().await
	}

	/// Sends as `PUT`.
	pub async fn put(self) -> Result<Response> {
		self.method(ApiMethod::Put).send().await
	}

	/// Sends as `PATCH`.
	pub async fn patch(self) -> Result<Response> {
		self.method(ApiMethod::Patch).send().await
	}

	/// Sends as `DELETE`.
	pub async fn delete(self) -> Result<Response> {
		self.method(ApiMethod::Delete).send().await
	}

	/// Fetches the row count of the current endpoint via `{endpoint}/count`.
	pub async fn count(mut self) -> Result<Response> {
		let endpoint = self.request.endpoint.take().unwrap_or_default();

		self.request.endpoint = Some(format!("{}/count", endpoint.trim_end_matches('/')));

		self.exclude_projection().get().await
	}

	/// Fetches the changes recorded for `application` since data version `version`.
	pub async fn data_subscription_changes(
		self,
		application: &str,
		version: u64,
	) -> Result<Response> {
		self.resource(&format!("{DATA_VERSION_PREFIX}{application}/{version}")).get().await
	}

	/// Turns the builder into a page-by-page cursor of `page_size` records.
	pub fn paginate(self, page_size: u32) -> Paginator<C> {
		Paginator::new(self, page_size)
	}

	/// Pages through results [`DEFAULT_PAGE_SIZE`] records at a time.
	pub fn paginate_default(self) -> Paginator<C> {
		self.paginate(DEFAULT_PAGE_SIZE)
	}

	fn wrap(&self, raw: Value) -> Response {
		let response = Response::new(raw, &self.request.record_key);

		match &self.request.table {
			Some(table) => response.with_table_name(table),
			None => response,
		}
	}
}
impl<C> Clone for RequestBuilder<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { client: self.client.clone(), request: self.request.clone() }
	}
}
impl<C> Debug for RequestBuilder<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestBuilder").field("request", &self.request).finish()
	}
}
