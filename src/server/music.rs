//! Music-account handlers: authorize URL, code exchange, token refresh, and playback lookup.

// crates.io
use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	broker::{AuthCodeTokens, AuthorizeRequest, RefreshedToken},
	server::{ApiError, AppState, session},
};

/// `POST /auth/login` body.
#[derive(Debug, Deserialize)]
pub struct CodeExchange {
	code: String,
}

/// `POST /auth/refresh` body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
	refresh_token: String,
}
impl Debug for RefreshRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshRequest(<redacted>)")
	}
}

/// `POST /current` body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRequest {
	access_token: String,
}
impl Debug for PlaybackRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PlaybackRequest(<redacted>)")
	}
}

/// `POST /current` response; `song` is `null` when nothing is playing.
#[derive(Debug, Serialize)]
pub struct NowPlaying {
	song: Option<String>,
}

/// Returns an authorize URL with a fresh `state`.
pub async fn authorize_url(State(state): State<AppState>) -> Json<AuthorizeRequest> {
	Json(state.broker.start_authorization())
}

/// Exchanges an authorization code for user tokens.
///
/// With a valid session, the issued refresh token is also stored on the session user.
pub async fn auth_login(
	State(state): State<AppState>,
	jar: CookieJar,
	Json(body): Json<CodeExchange>,
) -> Result<Json<AuthCodeTokens>, ApiError> {
	let tokens = state.broker.exchange_auth_code(&body.code).await?;

	if let Some(user) = session::authenticate(&state, &jar).await {
		state.users.update_refresh_token(&user.id, tokens.refresh_token.clone()).await?;
		tracing::info!(user = %user.id, "music account connected");
	}

	Ok(Json(tokens))
}

/// Mints a new access token from a refresh token.
pub async fn auth_refresh(
	State(state): State<AppState>,
	Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshedToken>, ApiError> {
	Ok(Json(state.broker.refresh(&body.refresh_token).await?))
}

/// Names the track playing on the account behind `accessToken`.
pub async fn currently_playing(
	State(state): State<AppState>,
	Json(body): Json<PlaybackRequest>,
) -> Result<Json<NowPlaying>, ApiError> {
	let song = state.lookup.currently_playing(&body.access_token).await?;

	Ok(Json(NowPlaying { song }))
}
