// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	broker::Broker,
	obs::{self, UpstreamCall},
};

const STATE_LEN: usize = 16;

/// Token set issued for a user-presented authorization code.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCodeTokens {
	/// Bearer token for Web API calls on the user's behalf.
	pub access_token: TokenSecret,
	/// Long-lived refresh token.
	pub refresh_token: TokenSecret,
	/// Lifetime of `access_token` in seconds.
	pub expires_in: i64,
}

/// Authorize URL plus the random `state` embedded in it.
#[derive(Clone, Debug, Serialize)]
pub struct AuthorizeRequest {
	/// URL the user's browser should be sent to.
	pub url: Url,
	/// Opaque value echoed back on the redirect.
	pub state: String,
}

impl Broker {
	/// Builds the authorize URL (`response_type=code`, client id, redirect URI, scopes, `state`).
	pub fn authorize_url(&self, state: &str) -> Url {
		self.facade.authorize_url(state.to_owned(), &self.descriptor.scopes)
	}

	/// Builds an authorize URL with a freshly generated random `state`.
	pub fn start_authorization(&self) -> AuthorizeRequest {
		let state = random_state();

		AuthorizeRequest { url: self.authorize_url(&state), state }
	}

	/// Exchanges an authorization code for `{access_token, refresh_token, expires_in}`.
	pub async fn exchange_auth_code(&self, code: &str) -> Result<AuthCodeTokens> {
		let grant = obs::observe(
			UpstreamCall::AuthorizationCode,
			"exchange_auth_code",
			self.limiter.schedule(|| self.facade.exchange_code(code)),
		)
		.await?;
		let refresh_token = grant.refresh_token.ok_or_else(|| Error::UpstreamAuth {
			reason: "authorization code exchange returned no refresh token".into(),
		})?;

		Ok(AuthCodeTokens {
			access_token: grant.access_token,
			refresh_token,
			expires_in: grant.expires_in,
		})
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn random_state_is_alphanumeric() {
		let state = random_state();

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(state, random_state());
	}
}
