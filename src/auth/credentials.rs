//! The service's own client credentials for the music service.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client id/secret pair the service presents to the music service's token endpoint.
#[derive(Clone)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Validates and wraps a client id/secret pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
		let client_id = client_id.into();
		let client_secret = TokenSecret::new(client_secret);

		if client_id.trim().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "id" }.into());
		}
		if client_secret.expose().trim().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "secret" }.into());
		}

		Ok(Self { client_id, client_secret })
	}

	/// Returns the client secret.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// HTTP Basic `Authorization` header value for the pair (`Basic base64(id:secret)`).
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_authorization_encodes_pair() {
		let credentials =
			ClientCredentials::new("abc", "xyz").expect("Credential fixture should be valid.");

		assert_eq!(credentials.basic_authorization(), "Basic YWJjOnh5eg==");
	}

	#[test]
	fn rejects_blank_values_and_redacts_secret() {
		assert!(ClientCredentials::new(" ", "secret").is_err());
		assert!(ClientCredentials::new("id", "").is_err());

		let credentials =
			ClientCredentials::new("id", "hunter2").expect("Credential fixture should be valid.");

		assert!(!format!("{credentials:?}").contains("hunter2"));
	}
}
