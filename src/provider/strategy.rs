//! Token-endpoint error classification.
//!
//! Structured OAuth fields (`error`, `error_description`) win, then body hints, then the HTTP
//! status code. Transport failures never reach classification; they surface as
//! [`crate::error::TransportError`].

// self
use crate::provider::GrantType;

/// Canonical categories for token-endpoint failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The presented code or refresh token was rejected.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes were rejected.
	InsufficientScope,
	/// Failure is temporary.
	Transient,
}

/// Primitive facts about a failed token request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Grant type associated with the failing request.
	pub grant_type: GrantType,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl ProviderErrorContext {
	/// Creates a new context scoped to the provided grant type.
	pub fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			http_status: None,
			oauth_error: None,
			error_description: None,
		}
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Classifies the failure.
	pub fn classify(&self) -> ProviderErrorKind {
		self.oauth_error
			.as_deref()
			.and_then(match_exact_value)
			.or_else(|| self.error_description.as_deref().and_then(match_exact_value))
			.or_else(|| self.error_description.as_deref().and_then(classify_body))
			.unwrap_or_else(|| classify_status(self.http_status))
	}
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope") {
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: &str) -> Option<ProviderErrorKind> {
	let lowered = body.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("authorization code") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") || text.contains("client secret") =>
			Some(ProviderErrorKind::InvalidClient),
		text if text.contains("scope") => Some(ProviderErrorKind::InsufficientScope),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_fields_take_precedence() {
		let ctx = ProviderErrorContext::new(GrantType::AuthorizationCode)
			.with_http_status(500)
			.with_oauth_error("invalid_grant");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidGrant);

		let ctx = ProviderErrorContext::new(GrantType::ClientCredentials)
			.with_http_status(400)
			.with_oauth_error("invalid_client");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidClient);
	}

	#[test]
	fn falls_back_to_description_then_status() {
		let ctx = ProviderErrorContext::new(GrantType::RefreshToken)
			.with_error_description("Invalid refresh token; invalid_grant");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidGrant);

		let ctx = ProviderErrorContext::new(GrantType::ClientCredentials).with_http_status(401);

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidClient);

		let ctx = ProviderErrorContext::new(GrantType::ClientCredentials).with_http_status(503);

		assert_eq!(ctx.classify(), ProviderErrorKind::Transient);
	}

	#[test]
	fn contexts_without_facts_are_transient() {
		let ctx = ProviderErrorContext::new(GrantType::RefreshToken);

		assert_eq!(ctx.http_status, None);
		assert_eq!(ctx.classify(), ProviderErrorKind::Transient);
	}
}
