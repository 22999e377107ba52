//! `oauth2`-crate facade for the music service's token endpoint.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
	EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, Scope,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{GrantType, ProviderDescriptor, ProviderErrorContext, ProviderErrorKind},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Token material returned by any grant.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Bearer token for Web API calls.
	pub access_token: TokenSecret,
	/// Refresh token, when the grant issues one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime of `access_token` in seconds.
	pub expires_in: i64,
}

/// Wraps a configured [`BasicClient`] and the shared transport.
///
/// Client authentication always uses HTTP Basic (`Authorization: Basic base64(id:secret)`).
#[derive(Clone)]
pub struct BasicFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl BasicFacade {
	/// Builds the facade from a validated descriptor and the service's client credentials.
	pub fn from_descriptor(
		descriptor: &ProviderDescriptor,
		credentials: &ClientCredentials,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let redirect_url = RedirectUrl::new(descriptor.redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let oauth_client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret().expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::BasicAuth);

		Ok(Self { oauth_client, http_client })
	}

	/// Builds the user-facing authorize URL carrying `state` and `scopes`.
	pub fn authorize_url(&self, state: String, scopes: &[String]) -> Url {
		let (url, _state) = self
			.oauth_client
			.authorize_url(move || CsrfToken::new(state))
			.add_scopes(scopes.iter().cloned().map(Scope::new))
			.url();

		url
	}

	/// Performs `grant_type=client_credentials`.
	pub async fn exchange_client_credentials(&self) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::ClientCredentials, meta.take(), err))?;

		map_token_response(response, meta.take())
	}

	/// Performs `grant_type=authorization_code` with the descriptor's redirect URI.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::AuthorizationCode, meta.take(), err))?;

		map_token_response(response, meta.take())
	}

	/// Performs `grant_type=refresh_token`.
	pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let refresh = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::RefreshToken, meta.take(), err))?;

		map_token_response(response, meta.take())
	}
}
impl Debug for BasicFacade {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicFacade").field("client_id", self.oauth_client.client_id()).finish()
	}
}

fn map_token_response(
	response: BasicTokenResponse,
	meta: Option<ResponseMetadata>,
) -> Result<TokenGrant> {
	let expires_in = response
		.expires_in()
		.and_then(|value| i64::try_from(value.as_secs()).ok())
		.filter(|secs| *secs > 0)
		.ok_or_else(|| TransientError::Upstream {
			message: "Token response carried no usable expires_in".into(),
			status: meta_status(meta.as_ref()),
			retry_after: None,
		})?;

	Ok(TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned())),
		expires_in,
	})
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, meta),
		RequestTokenError::Request(error) => map_transport_error(grant, meta, error),
		RequestTokenError::Parse(source, _body) =>
			TransientError::ResponseParse { source, status: meta_status(meta) }.into(),
		RequestTokenError::Other(message) => TransientError::Upstream {
			message: format!("Token endpoint returned an unexpected response: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_server_response_error(
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx =
		ProviderErrorContext::new(grant).with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let message = match response.error_description() {
		Some(description) => format!("{} ({description})", response.error().as_ref()),
		None => response.error().as_ref().to_string(),
	};

	match ctx.classify() {
		ProviderErrorKind::InvalidGrant
		| ProviderErrorKind::InvalidClient
		| ProviderErrorKind::InsufficientScope => Error::UpstreamAuth { reason: message },
		ProviderErrorKind::Transient => TransientError::Upstream {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_transport_error(
	grant: GrantType,
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<ReqwestError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => {
			if inner.is_builder() {
				return ConfigError::from(*inner).into();
			}
			if inner.is_timeout() {
				return TransientError::Upstream {
					message: format!("Request timed out during the {grant} exchange"),
					status: meta_status(meta),
					retry_after: meta_retry_after(meta),
				}
				.into();
			}

			TransportError::from(*inner).into()
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::Upstream {
			message: format!("HTTP client error during the {grant} exchange: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => TransientError::Upstream {
			message: format!("HTTP client error during the {grant} exchange"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
