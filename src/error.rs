//! Service-level error types shared across the broker, lookup, repositories, and HTTP surface.

// self
use crate::_prelude::*;

/// Service-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Session token could not be issued or verified.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// One or more document fields failed validation.
	#[error(transparent)]
	Validation(#[from] ValidationErrors),
	/// Email/password authentication failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Listener or socket failure in the HTTP server.
	#[error("Server I/O failure.")]
	Server(#[source] std::io::Error),

	/// Requested document does not exist.
	#[error("{resource} `{id}` was not found.")]
	NotFound {
		/// Kind of document (post, user).
		resource: &'static str,
		/// Identifier that was looked up.
		id: String,
	},
	/// The music service rejected our credentials or the presented grant.
	#[error("Music service rejected the token request: {reason}.")]
	UpstreamAuth {
		/// Provider- or service-supplied reason string.
		reason: String,
	},
	/// Song lookup produced no usable match.
	#[error("Song lookup failed: {reason}.")]
	LookupFailed {
		/// Human-readable cause.
		reason: String,
	},
	/// Password hashing or verification could not run.
	#[error("Password hashing failed: {reason}.")]
	PasswordHash {
		/// Hasher-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Shorthand for [`Error::NotFound`].
	pub fn not_found(resource: &'static str, id: impl Display) -> Self {
		Self::NotFound { resource, id: id.to_string() }
	}

	/// Shorthand for [`Error::LookupFailed`].
	pub fn lookup_failed(reason: impl Into<String>) -> Self {
		Self::LookupFailed { reason: reason.into() }
	}
}

/// Configuration and validation failures raised while wiring the service.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds an unusable value.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Parser-supplied reason string.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor lacks a required endpoint.
	#[error("Descriptor is missing the {endpoint} endpoint.")]
	MissingEndpoint {
		/// Endpoint label.
		endpoint: &'static str,
	},
	/// Provider descriptor points at a plain-HTTP endpoint outside loopback.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint label.
		endpoint: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Client credentials are empty.
	#[error("Client {field} cannot be empty.")]
	EmptyCredential {
		/// Which half of the credential pair is empty.
		field: &'static str,
	},
	/// Store connection string uses an unsupported scheme.
	#[error("Unsupported store connection string `{0}`.")]
	UnsupportedStore(String),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Music service returned an unexpected but non-fatal response.
	#[error("Music service returned an unexpected response: {message}.")]
	Upstream {
		/// Provider- or service-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Music service responded with JSON that does not match the expected shape.
	#[error("Music service returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the music service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the music service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Session-token failures.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// Signing a new session token failed.
	#[error("Session token could not be signed.")]
	Sign(#[source] jsonwebtoken::errors::Error),
	/// Presented session token is malformed, tampered with, or expired.
	#[error("Session token is invalid.")]
	Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Email/password authentication failures.
///
/// Both variants surface to HTTP clients as a 400 with a field-level message, but remain distinct
/// internally so callers and logs can tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum AuthError {
	/// No user is registered with the presented email.
	#[error("incorrect email")]
	IncorrectEmail,
	/// The email exists but the password does not match its hash.
	#[error("incorrect password")]
	IncorrectPassword,
}
impl AuthError {
	/// Field the failure is reported against.
	pub const fn field(self) -> &'static str {
		match self {
			AuthError::IncorrectEmail => "email",
			AuthError::IncorrectPassword => "password",
		}
	}

	/// User-facing message for the failing field.
	pub const fn message(self) -> &'static str {
		match self {
			AuthError::IncorrectEmail => "Email is not registered.",
			AuthError::IncorrectPassword => "Password is incorrect.",
		}
	}
}

/// Field-level validation failures keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ThisError)]
#[error("User validation failed: {}.", join_fields(.0))]
pub struct ValidationErrors(BTreeMap<String, String>);
impl ValidationErrors {
	/// Creates a set holding a single failure.
	pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
		let mut errors = Self::default();

		errors.push(field, reason);

		errors
	}

	/// Records a failure; the first reason reported for a field wins.
	pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
		self.0.entry(field.into()).or_insert_with(|| reason.into());
	}

	/// Returns the reason recorded for `field`, if any.
	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	/// Returns true when no field failed.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates `(field, reason)` pairs in field order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(field, reason)| (field.as_str(), reason.as_str()))
	}

	/// Converts into `Err(self)` when any field failed.
	pub fn into_result(self) -> Result<(), Self> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

fn join_fields(fields: &BTreeMap<String, String>) -> String {
	fields.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validation_errors_keep_first_reason_per_field() {
		let mut errors = ValidationErrors::default();

		errors.push("email", "Email already in use.");
		errors.push("email", "Please enter a valid email.");
		errors.push("password", "Minimum password length is 6 characters.");

		assert_eq!(errors.get("email"), Some("Email already in use."));
		assert_eq!(errors.to_string(), "User validation failed: email, password.");
		assert!(errors.into_result().is_err());
		assert!(ValidationErrors::default().into_result().is_ok());
	}

	#[test]
	fn auth_errors_stay_distinct() {
		assert_ne!(AuthError::IncorrectEmail, AuthError::IncorrectPassword);
		assert_eq!(AuthError::IncorrectEmail.field(), "email");
		assert_eq!(AuthError::IncorrectPassword.field(), "password");
	}
}
