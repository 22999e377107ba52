//! Music-service descriptor (data) and token-error classification (behavior).
//!
//! `descriptor` exposes validated endpoint metadata for the accounts service (token + authorize)
//! and the Web API. `strategy` maps token-endpoint failures into the service error taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;

// self
use crate::_prelude::*;

/// Scopes requested when a user connects their music-service account.
pub const DEFAULT_SCOPES: &[&str] = &[
	"streaming",
	"user-read-email",
	"user-read-private",
	"user-library-read",
	"user-library-modify",
	"user-read-playback-state",
	"user-modify-playback-state",
];

/// OAuth 2.0 grant types the service uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant presented by a user's browser.
	AuthorizationCode,
	/// Refresh Token grant for long-lived user sessions.
	RefreshToken,
	/// Client Credentials grant for server-initiated catalog lookups.
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
