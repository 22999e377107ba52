//! Observability helpers for outbound music-service calls.
//!
//! Every upstream call runs inside an `info_span!("beatdrops.upstream")` carrying the `call`
//! kind and the `stage` (call site). Enable the `metrics` feature to increment the
//! `beatdrops_upstream_call_total` counter for every attempt/success/failure, labeled by
//! `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outbound call kinds issued against the music service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpstreamCall {
	/// `client_credentials` token exchange.
	ClientCredentials,
	/// `authorization_code` token exchange.
	AuthorizationCode,
	/// `refresh_token` token exchange.
	Refresh,
	/// Catalog track search.
	Search,
	/// Currently-playing lookup with a user token.
	CurrentlyPlaying,
}
impl UpstreamCall {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			UpstreamCall::ClientCredentials => "client_credentials",
			UpstreamCall::AuthorizationCode => "authorization_code",
			UpstreamCall::Refresh => "refresh",
			UpstreamCall::Search => "search",
			UpstreamCall::CurrentlyPlaying => "currently_playing",
		}
	}
}
impl Display for UpstreamCall {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Call submitted.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an upstream span, recording attempt and outcome.
pub async fn observe<Fut, T>(call: UpstreamCall, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = UpstreamSpan::new(call, stage);

	record_call_outcome(call, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_call_outcome(call, CallOutcome::Success),
		Err(e) => {
			::tracing::warn!(call = call.as_str(), stage, error = %e, "upstream call failed");
			record_call_outcome(call, CallOutcome::Failure);
		},
	}

	result
}
