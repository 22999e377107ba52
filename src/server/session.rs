//! Session cookie handling.

// crates.io
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
// self
use crate::{_prelude::*, auth::SESSION_COOKIE, model::User, server::AppState};

/// Resolves the session cookie in `jar` to a stored user.
///
/// Returns `None` when the cookie is missing, its token is invalid or expired, or the user no
/// longer exists. Never fails the request.
pub async fn authenticate(state: &AppState, jar: &CookieJar) -> Option<User> {
	let token = jar.get(SESSION_COOKIE)?.value();
	let claims = match state.sessions.verify(token) {
		Ok(claims) => claims,
		Err(e) => {
			tracing::debug!("ignoring session cookie: {e}");

			return None;
		},
	};

	match state.users.find_user_by_id(&claims.id).await {
		Ok(user) => user,
		Err(e) => {
			tracing::debug!(user = %claims.id, "session user lookup failed: {e}");

			None
		},
	}
}

/// Builds the http-only session cookie carrying `token`.
pub fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
	Cookie::build((SESSION_COOKIE, token))
		.http_only(true)
		.path("/")
		.same_site(SameSite::Lax)
		.max_age(ttl)
		.build()
}

/// Builds a removal cookie for the session.
pub fn clear_session_cookie() -> Cookie<'static> {
	Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_cookie_is_http_only_with_max_age() {
		let cookie = session_cookie("token".into(), Duration::days(3));

		assert_eq!(cookie.name(), "jwt");
		assert_eq!(cookie.http_only(), Some(true));
		assert_eq!(cookie.max_age(), Some(Duration::days(3)));
		assert_eq!(cookie.path(), Some("/"));
	}
}
