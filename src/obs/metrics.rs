// self
use crate::obs::{CallKind, CallOutcome};

/// Increments `powerschool_api_call_total{call,outcome}` when `metrics` is enabled.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"powerschool_api_call_total",
		"call" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Increments `powerschool_api_response_total{class}` for every API response received,
/// expired-token challenges included.
pub fn record_response_status(status: u16) {
	#[cfg(feature = "metrics")]
	metrics::counter!("powerschool_api_response_total", "class" => status_class(status))
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	{
		let _ = status;
	}
}

/// Buckets a status code into `1xx`..`5xx`, or `other` outside that range.
pub const fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}
