//! Account handlers: signup, login, logout, and user read accessors.

// crates.io
use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
	response::Redirect,
};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	auth::{PostId, UserId},
	model::{LikedPosts, NewUser, PublicUser, User},
	server::{ApiError, AppState, session},
};

/// `POST /login` body.
#[derive(Deserialize)]
pub struct Credentials {
	#[serde(default)]
	email: String,
	#[serde(default)]
	password: String,
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Response wrapping a single public user.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
	user: PublicUser,
}

/// Registers a user and starts a session.
pub async fn signup(
	State(state): State<AppState>,
	jar: CookieJar,
	Json(body): Json<NewUser>,
) -> Result<(StatusCode, CookieJar, Json<UserEnvelope>), ApiError> {
	let user = state.users.add_user(body).await?;
	let jar = start_session(&state, jar, &user)?;

	Ok((StatusCode::CREATED, jar, Json(UserEnvelope { user: user.public() })))
}

/// Authenticates by email and password and starts a session.
pub async fn login(
	State(state): State<AppState>,
	jar: CookieJar,
	Json(body): Json<Credentials>,
) -> Result<(CookieJar, Json<UserEnvelope>), ApiError> {
	let user = state.users.login(&body.email, &body.password).await?;
	let jar = start_session(&state, jar, &user)?;

	tracing::info!(user = %user.id, "user logged in");

	Ok((jar, Json(UserEnvelope { user: user.public() })))
}

/// Clears the session cookie and redirects to the site root.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
	(jar.remove(session::clear_session_cookie()), Redirect::to("/"))
}

/// Returns the public view of a user.
pub async fn get_user(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
	let id = parse_user_id(&id)?;
	let user =
		state.users.find_user_by_id(&id).await?.ok_or_else(|| Error::not_found("user", &id))?;

	Ok(Json(UserEnvelope { user: user.public() }))
}

/// Returns the ids of the posts a user has liked.
pub async fn get_user_liked(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<LikedPosts>, ApiError> {
	let id = parse_user_id(&id)?;
	let liked: BTreeSet<PostId> =
		state.users.get_user_liked(&id).await?.ok_or_else(|| Error::not_found("user", &id))?;

	Ok(Json(LikedPosts { liked }))
}

fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar> {
	let token = state.sessions.issue(&user.id)?;

	Ok(jar.add(session::session_cookie(token, state.sessions.ttl())))
}

fn parse_user_id(raw: &str) -> Result<UserId> {
	UserId::new(raw).map_err(|_| Error::not_found("user", raw))
}
