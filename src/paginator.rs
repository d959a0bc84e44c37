//! Page-by-page cursor over a prepared request.

// self
use crate::{
	_prelude::*,
	http::HttpTransport,
	obs::{self, CallKind, CallOutcome, CallSpan, trace_debug},
	request::{ApiMethod, RequestBuilder},
	response::Response,
};

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Fetches consecutive pages of a request until one comes back empty.
///
/// After the empty page the cursor rewinds to page 1, so a subsequent
/// [`next_page`](Self::next_page) starts the listing over.
pub struct Paginator<C>
where
	C: ?Sized + HttpTransport,
{
	builder: RequestBuilder<C>,
	page: u32,
}
impl<C> Paginator<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a cursor over `builder` that requests `page_size` records per page.
	///
	/// Requests without a method are paged with `GET`.
	pub fn new(builder: RequestBuilder<C>, page_size: u32) -> Self {
		let builder = if builder.state().method.is_some() {
			builder
		} else {
			builder.method(ApiMethod::Get)
		};

		Self { builder: builder.page_size(page_size.max(1)), page: 1 }
	}

	/// Page the next call will request.
	pub fn page_number(&self) -> u32 {
		self.page
	}

	/// Returns the underlying builder with the paging variables still set.
	pub fn into_builder(self) -> RequestBuilder<C> {
		self.builder
	}

	/// Fetches the next page; `None` marks the end of the listing.
	pub async fn next_page(&mut self) -> Result<Option<Response>> {
		const KIND: CallKind = CallKind::Paginate;

		let span = CallSpan::new(KIND, "next_page");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.fetch()).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn fetch(&mut self) -> Result<Option<Response>> {
		let page = self.page;

		self.builder.state_mut().query.insert("page", page.to_string());

		let mut response = self.builder.send_preserving().await?;

		response.wrap_single_record();

		if response.is_empty() {
			trace_debug!(page, "Empty page reached; rewinding.");

			self.page = 1;

			return Ok(None);
		}

		self.page += 1;

		Ok(Some(response))
	}
}
impl<C> Debug for Paginator<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Paginator").field("builder", &self.builder).field("page", &self.page).finish()
	}
}
