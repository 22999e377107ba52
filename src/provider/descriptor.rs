//! Validated endpoint metadata for the music service.

// self
use crate::{_prelude::*, error::ConfigError, provider::DEFAULT_SCOPES};

const TOKEN_PATH: &str = "api/token";
const AUTHORIZE_PATH: &str = "authorize";

/// Endpoint set used by the broker and the lookup service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for every grant.
	pub token: Url,
	/// Web API base; always ends with `/` so relative joins stay under it.
	pub api: Url,
}

/// Immutable music-service descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions.
	pub endpoints: ProviderEndpoints,
	/// Redirect URI registered for the authorization-code flow.
	pub redirect_uri: Url,
	/// Scopes requested in the authorize URL.
	pub scopes: Vec<String>,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Resolves `path` relative to the Web API base.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.endpoints
			.api
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidDescriptor { source }.into())
	}
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Accounts service base; token and authorize endpoints hang off it.
	pub accounts_base: Option<Url>,
	/// Web API base.
	pub api_base: Option<Url>,
	/// Redirect URI for the authorization-code flow.
	pub redirect_uri: Option<Url>,
	/// Scopes requested in the authorize URL.
	pub scopes: Option<Vec<String>>,
}
impl ProviderDescriptorBuilder {
	/// Sets the accounts service base URL.
	pub fn accounts_base(mut self, url: Url) -> Self {
		self.accounts_base = Some(url);

		self
	}

	/// Sets the Web API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the requested scopes (defaults to [`DEFAULT_SCOPES`]).
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = Some(scopes.into_iter().map(Into::into).collect());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor> {
		let accounts =
			self.accounts_base.ok_or(ConfigError::MissingEndpoint { endpoint: "accounts" })?;
		let mut api = self.api_base.ok_or(ConfigError::MissingEndpoint { endpoint: "api" })?;
		let redirect_uri =
			self.redirect_uri.ok_or(ConfigError::MissingEndpoint { endpoint: "redirect" })?;

		if !api.path().ends_with('/') {
			let path = format!("{}/", api.path());

			api.set_path(&path);
		}

		let join = |path: &str| {
			accounts.join(path).map_err(|source| ConfigError::InvalidDescriptor { source })
		};
		let endpoints = ProviderEndpoints {
			authorization: join(AUTHORIZE_PATH)?,
			token: join(TOKEN_PATH)?,
			api,
		};

		validate_endpoint("authorization", &endpoints.authorization)?;
		validate_endpoint("token", &endpoints.token)?;
		validate_endpoint("api", &endpoints.api)?;

		Ok(ProviderDescriptor {
			endpoints,
			redirect_uri,
			scopes: self
				.scopes
				.unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
		})
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn builds_spotify_endpoints() {
		let descriptor = ProviderDescriptor::builder()
			.accounts_base(url("https://accounts.spotify.com"))
			.api_base(url("https://api.spotify.com/v1"))
			.redirect_uri(url("http://localhost:3000/home"))
			.build()
			.expect("Descriptor should build.");

		assert_eq!(descriptor.endpoints.token.as_str(), "https://accounts.spotify.com/api/token");
		assert_eq!(
			descriptor.endpoints.authorization.as_str(),
			"https://accounts.spotify.com/authorize"
		);
		assert_eq!(
			descriptor.api_url("/search").expect("Search URL should join.").as_str(),
			"https://api.spotify.com/v1/search"
		);
		assert_eq!(descriptor.scopes.len(), DEFAULT_SCOPES.len());
	}

	#[test]
	fn rejects_plain_http_outside_loopback() {
		let err = ProviderDescriptor::builder()
			.accounts_base(url("http://accounts.example.com"))
			.api_base(url("https://api.example.com/v1/"))
			.redirect_uri(url("http://localhost:3000/home"))
			.build()
			.expect_err("Plain HTTP accounts endpoint should be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::InsecureEndpoint { endpoint: "authorization", .. })
		));
		assert!(
			ProviderDescriptor::builder()
				.accounts_base(url("http://127.0.0.1:8080"))
				.api_base(url("http://127.0.0.1:8080/v1/"))
				.redirect_uri(url("http://localhost:3000/home"))
				.build()
				.is_ok()
		);
	}

	#[test]
	fn missing_endpoints_are_reported() {
		let err = ProviderDescriptor::builder()
			.api_base(url("https://api.example.com/v1/"))
			.build()
			.expect_err("Missing accounts base should fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingEndpoint { endpoint: "accounts" })
		));
	}
}
