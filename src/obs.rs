//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `powerschool_api.call` with the `call`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `powerschool_api_call_total` counter for every
//!   attempt/success/failure/retry, labeled by `call` + `outcome`, and the
//!   `powerschool_api_response_total` counter labeled by status `class`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Client-credentials token exchange.
	Authenticate,
	/// Authenticated API request, including expired-token retries.
	Dispatch,
	/// One page fetched by a paginator.
	Paginate,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Authenticate => "authenticate",
			CallKind::Dispatch => "dispatch",
			CallKind::Paginate => "paginate",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Expired token detected; the request is re-sent after re-authenticating.
	Retry,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the terminal outcome of `result` for `kind`.
pub fn record_result<T>(kind: CallKind, result: &Result<T>) {
	match result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(_) => record_call_outcome(kind, CallOutcome::Failure),
	}
}
