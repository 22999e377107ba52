// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	broker::Broker,
	obs::{self, UpstreamCall},
};

impl Broker {
	/// Exchanges the service's own client id/secret for a bearer token.
	///
	/// Nothing is cached: every call performs a fresh `client_credentials` grant through the
	/// limiter. Any failed exchange (rejection, server error, transport or parse failure)
	/// surfaces as [`Error::UpstreamAuth`] with the cause in `reason`.
	pub async fn client_credentials_token(&self) -> Result<TokenSecret> {
		let grant = obs::observe(
			UpstreamCall::ClientCredentials,
			"client_credentials_token",
			self.limiter.schedule(|| self.facade.exchange_client_credentials()),
		)
		.await
		.map_err(|e| match e {
			Error::UpstreamAuth { .. } => e,
			other => Error::UpstreamAuth { reason: other.to_string() },
		})?;

		tracing::debug!(expires_in = grant.expires_in, "client credentials token issued");

		Ok(grant.access_token)
	}
}
