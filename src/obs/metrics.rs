//! Counters for outbound music-service traffic.

// self
use crate::obs::{CallOutcome, UpstreamCall};

/// Increments `beatdrops_upstream_call_total` for one music-service call.
///
/// The `call` label is the token exchange or Web API request (`client_credentials`,
/// `authorization_code`, `refresh`, `search`, `currently_playing`); `outcome` is `attempt`,
/// `success`, or `failure`. Without the `metrics` feature this is a no-op.
pub fn record_call_outcome(call: UpstreamCall, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"beatdrops_upstream_call_total",
			"call" => call.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (call, outcome);
	}
}
