//! Feed handlers: listing, creation through the song lookup, and the like toggle.

// crates.io
use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	auth::{PostId, UserId},
	model::{Post, PublicUser},
	repo::PostOrder,
	server::{ApiError, AppState, session},
};

/// `GET /posts` query string.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
	sort: Option<PostOrder>,
}

/// `GET /posts` response.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
	posts: Vec<Post>,
	user: Option<PublicUser>,
}

/// `POST /create` body.
#[derive(Debug, Deserialize)]
pub struct CreatePost {
	#[serde(default)]
	title: String,
	#[serde(default)]
	artist: String,
	#[serde(default)]
	location: Option<String>,
}

/// `PATCH /user/{id}/liked` body.
#[derive(Debug, Deserialize)]
pub struct ToggleLike {
	post: String,
	liked: bool,
}

/// `PATCH /user/{id}/liked` response.
#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
	post: Post,
	user: PublicUser,
}

/// Lists the feed along with the session user, if any.
pub async fn list_posts(
	State(state): State<AppState>,
	jar: CookieJar,
	Query(query): Query<FeedQuery>,
) -> Result<(StatusCode, Json<FeedResponse>), ApiError> {
	let posts = match query.sort {
		Some(order) => state.posts.list_posts_ordered(order).await?,
		None => state.posts.list_posts().await?,
	};
	let user = session::authenticate(&state, &jar).await.map(|user| user.public());

	Ok((StatusCode::CREATED, Json(FeedResponse { posts, user })))
}

/// Resolves the submitted song against the catalog and stores it as a post.
///
/// Nothing is stored when the lookup fails.
pub async fn create_post(
	State(state): State<AppState>,
	Json(body): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
	let draft = state.lookup.lookup(&body.title, &body.artist, body.location).await?;
	let post = state.posts.add_post(draft).await?;

	Ok((StatusCode::CREATED, Json(post)))
}

/// Likes (`liked == false`) or unlikes (`liked == true`) a post for the user in the path.
///
/// The user's liked set decides whether the counter moves: a like for a post already in the set,
/// or an unlike for a post not in it, changes nothing and answers with the current documents.
/// Otherwise the post counter and the liked set are written separately, the post first. An
/// unknown user or post answers 404 before any write.
pub async fn toggle_like(
	State(state): State<AppState>,
	Path(user_id): Path<String>,
	Json(body): Json<ToggleLike>,
) -> Result<(StatusCode, Json<ToggleLikeResponse>), ApiError> {
	let user_id = UserId::new(&user_id).map_err(|_| Error::not_found("user", &user_id))?;
	let post_id = PostId::new(&body.post).map_err(|_| Error::not_found("post", &body.post))?;
	let user = state
		.users
		.find_user_by_id(&user_id)
		.await?
		.ok_or_else(|| Error::not_found("user", &user_id))?;
	let currently_liked = user.liked.contains(&post_id);

	if currently_liked != body.liked {
		let post = state
			.posts
			.find_post(&post_id)
			.await?
			.ok_or_else(|| Error::not_found("post", &post_id))?;

		tracing::debug!(
			user = %user_id,
			post = %post_id,
			currently_liked,
			"like toggle does not match the liked set, nothing changed"
		);

		return Ok((StatusCode::CREATED, Json(ToggleLikeResponse { post, user: user.public() })));
	}

	let post = state.posts.update_like_status(&post_id, currently_liked).await?;
	let user = if currently_liked {
		state.users.remove_user_liked(&user_id, post_id).await?
	} else {
		state.users.add_user_liked(&user_id, post_id).await?
	};

	Ok((StatusCode::CREATED, Json(ToggleLikeResponse { post, user: user.public() })))
}
