//! Token Broker: obtains access tokens from the music service's token endpoint.
//!
//! Three grants are supported: `client_credentials` for server-initiated catalog lookups, and
//! `authorization_code` / `refresh_token` for user-delegated sessions. Every exchange is
//! submitted through the shared [`OutboundLimiter`]. The broker keeps no token cache; each call
//! is independent.

mod auth_code;
mod client_credentials;
mod refresh;

pub use auth_code::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	http::ReqwestHttpClient,
	limiter::OutboundLimiter,
	oauth::BasicFacade,
	provider::ProviderDescriptor,
};

/// Coordinates token exchanges against a single music-service descriptor.
#[derive(Clone)]
pub struct Broker {
	/// Descriptor that defines the token, authorize, and API endpoints.
	pub descriptor: ProviderDescriptor,
	/// The service's own client credentials.
	pub credentials: ClientCredentials,
	facade: BasicFacade,
	limiter: Arc<OutboundLimiter>,
}
impl Broker {
	/// Creates a broker bound to `descriptor`, authenticating as `credentials`.
	pub fn new(
		descriptor: ProviderDescriptor,
		credentials: ClientCredentials,
		http_client: ReqwestHttpClient,
		limiter: Arc<OutboundLimiter>,
	) -> Result<Self> {
		let facade = BasicFacade::from_descriptor(&descriptor, &credentials, http_client)?;

		Ok(Self { descriptor, credentials, facade, limiter })
	}

	/// Shared limiter every exchange is scheduled on.
	pub fn limiter(&self) -> &Arc<OutboundLimiter> {
		&self.limiter
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor)
			.field("credentials", &self.credentials)
			.finish()
	}
}
