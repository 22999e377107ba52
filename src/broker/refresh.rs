// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	broker::Broker,
	obs::{self, UpstreamCall},
};

/// Access token minted from a refresh token.
///
/// No new refresh token is surfaced; the presented one stays valid.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
	/// Fresh bearer token.
	pub access_token: TokenSecret,
	/// Lifetime of `access_token` in seconds.
	pub expires_in: i64,
}

impl Broker {
	/// Exchanges `refresh_token` for a new access token.
	pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken> {
		let grant = obs::observe(
			UpstreamCall::Refresh,
			"refresh",
			self.limiter.schedule(|| self.facade.exchange_refresh_token(refresh_token)),
		)
		.await?;

		Ok(RefreshedToken { access_token: grant.access_token, expires_in: grant.expires_in })
	}
}
