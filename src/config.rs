//! Environment-driven service configuration.
//!
//! [`Config::from_env`] reads the process environment; [`Config::from_lookup`] takes any
//! name-to-value function so tests can supply a fixed map.

// std
use std::{path::PathBuf, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	error::ConfigError,
	provider::{DEFAULT_SCOPES, ProviderDescriptor},
};

const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/home";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1/";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MIN_INTERVAL_MS: u64 = 333;
const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Where posts and users are persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
	/// Process memory; lost on restart.
	Memory,
	/// JSON snapshot file rewritten after each mutation.
	File(PathBuf),
}
impl FromStr for StoreLocation {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == "memory://" || s == "memory" {
			return Ok(Self::Memory);
		}
		if let Some(path) = s.strip_prefix("file://") {
			if !path.is_empty() {
				return Ok(Self::File(PathBuf::from(path)));
			}
		}

		Err(ConfigError::UnsupportedStore(s.to_owned()))
	}
}

/// Fully resolved service configuration.
#[derive(Clone, Debug)]
pub struct Config {
	/// The service's own music-service client credentials.
	pub credentials: ClientCredentials,
	/// Secret used to sign session tokens.
	pub session_secret: TokenSecret,
	/// Document store location.
	pub store: StoreLocation,
	/// Browser origin allowed to call the API with credentials.
	pub allowed_origin: String,
	/// Redirect URI registered for the authorization-code flow.
	pub redirect_uri: Url,
	/// Music-service accounts base URL (token + authorize endpoints).
	pub accounts_url: Url,
	/// Music-service Web API base URL.
	pub api_url: Url,
	/// Listen port.
	pub port: u16,
	/// Minimum spacing between outbound calls.
	pub outbound_min_interval: StdDuration,
	/// Session token and cookie lifetime in seconds.
	pub session_ttl_secs: i64,
}
impl Config {
	/// Reads configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads configuration through `lookup`, applying defaults for optional values.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingVar { name })
		};
		let optional = |name: &'static str, default: &str| {
			lookup(name).unwrap_or_else(|| {
				tracing::info!("{name} not set, using default: {default}");

				default.to_owned()
			})
		};
		let credentials =
			ClientCredentials::new(required("CLIENT_ID")?, required("CLIENT_SECRET")?)?;
		let session_secret = TokenSecret::new(required("JWT_SECRET")?);
		let store = optional("CONNECTION_URL", "memory://").parse::<StoreLocation>()?;
		let allowed_origin = optional("ALLOWED_ORIGIN", DEFAULT_ORIGIN);
		let redirect_uri =
			parse_url("REDIRECT_URI", &optional("REDIRECT_URI", DEFAULT_REDIRECT_URI))?;
		let accounts_url = parse_url(
			"SPOTIFY_ACCOUNTS_URL",
			&optional("SPOTIFY_ACCOUNTS_URL", DEFAULT_ACCOUNTS_URL),
		)?;
		let api_url = parse_url("SPOTIFY_API_URL", &optional("SPOTIFY_API_URL", DEFAULT_API_URL))?;
		let port = parse_number("PORT", &optional("PORT", &DEFAULT_PORT.to_string()))?;
		let interval_ms = parse_number::<u64>(
			"OUTBOUND_MIN_INTERVAL_MS",
			&optional("OUTBOUND_MIN_INTERVAL_MS", &DEFAULT_MIN_INTERVAL_MS.to_string()),
		)?;
		let session_ttl_secs = parse_number::<i64>(
			"SESSION_TTL_SECS",
			&optional("SESSION_TTL_SECS", &DEFAULT_SESSION_TTL_SECS.to_string()),
		)?;

		if session_ttl_secs <= 0 {
			return Err(ConfigError::InvalidVar {
				name: "SESSION_TTL_SECS",
				reason: "must be positive".into(),
			}
			.into());
		}

		Ok(Self {
			credentials,
			session_secret,
			store,
			allowed_origin,
			redirect_uri,
			accounts_url,
			api_url,
			port,
			outbound_min_interval: StdDuration::from_millis(interval_ms),
			session_ttl_secs,
		})
	}

	/// Builds the music-service descriptor from the configured endpoints.
	pub fn descriptor(&self) -> Result<ProviderDescriptor> {
		ProviderDescriptor::builder()
			.accounts_base(self.accounts_url.clone())
			.api_base(self.api_url.clone())
			.redirect_uri(self.redirect_uri.clone())
			.scopes(DEFAULT_SCOPES.iter().copied())
			.build()
	}

	/// Configuration pointing every music-service endpoint at `base`.
	#[cfg(any(test, feature = "test"))]
	pub fn for_tests(base: &str) -> Self {
		let base = Url::parse(base).expect("Test base URL should parse.");

		Self {
			credentials: ClientCredentials::new("test-client", "test-secret")
				.expect("Test credentials should be valid."),
			session_secret: TokenSecret::new("test-session-secret"),
			store: StoreLocation::Memory,
			allowed_origin: DEFAULT_ORIGIN.into(),
			redirect_uri: Url::parse(DEFAULT_REDIRECT_URI).expect("Redirect should parse."),
			api_url: base.join("/v1/").expect("API base should join."),
			accounts_url: base,
			port: 0,
			outbound_min_interval: StdDuration::ZERO,
			session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
		}
	}
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() }.into())
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T>
where
	T: FromStr,
	T::Err: Display,
{
	raw.trim().parse().map_err(|e: T::Err| {
		tracing::warn!("Invalid {name} value: {e}");

		ConfigError::InvalidVar { name, reason: e.to_string() }.into()
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
		move |name| pairs.iter().find(|(key, _)| *key == name).map(|(_, value)| value.to_string())
	}

	#[test]
	fn defaults_apply_when_optional_values_are_missing() {
		let config = Config::from_lookup(lookup(&[
			("CLIENT_ID", "id"),
			("CLIENT_SECRET", "secret"),
			("JWT_SECRET", "jwt"),
		]))
		.expect("Minimal configuration should load.");

		assert_eq!(config.store, StoreLocation::Memory);
		assert_eq!(config.port, 5000);
		assert_eq!(config.outbound_min_interval, StdDuration::from_millis(333));
		assert_eq!(config.allowed_origin, "http://localhost:3000");
		assert_eq!(config.accounts_url.as_str(), "https://accounts.spotify.com/");
		assert!(config.descriptor().is_ok());
	}

	#[test]
	fn missing_and_invalid_values_are_reported_by_name() {
		let err = Config::from_lookup(lookup(&[("CLIENT_ID", "id"), ("JWT_SECRET", "jwt")]))
			.expect_err("Missing secret should fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingVar { name: "CLIENT_SECRET" })
		));

		let err = Config::from_lookup(lookup(&[
			("CLIENT_ID", "id"),
			("CLIENT_SECRET", "secret"),
			("JWT_SECRET", "jwt"),
			("PORT", "eighty"),
		]))
		.expect_err("Non-numeric port should fail.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidVar { name: "PORT", .. })));
	}

	#[test]
	fn store_location_parses_supported_schemes() {
		assert_eq!("memory://".parse::<StoreLocation>().ok(), Some(StoreLocation::Memory));
		assert_eq!(
			"file:///var/lib/beatdrops.json".parse::<StoreLocation>().ok(),
			Some(StoreLocation::File(PathBuf::from("/var/lib/beatdrops.json")))
		);
		assert!("mongodb://localhost/beatdrops".parse::<StoreLocation>().is_err());
	}
}
