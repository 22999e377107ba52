//! Storage contract and built-in document stores for posts and users.
//!
//! Each operation is atomic with respect to a single document: a like-counter adjustment or a
//! liked-set edit never interleaves with another write to the same post or user. Nothing spans
//! two documents.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{PostId, TokenSecret, UserId},
	config::StoreLocation,
	model::{Post, User},
};

/// Boxed future returned by [`DocumentStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract implemented by document stores.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	/// Appends a new post.
	fn insert_post(&self, post: Post) -> StoreFuture<'_, ()>;

	/// Returns every post in insertion order.
	fn list_posts(&self) -> StoreFuture<'_, Vec<Post>>;

	/// Fetches a post by id.
	fn find_post<'a>(&'a self, id: &'a PostId) -> StoreFuture<'a, Option<Post>>;

	/// Applies `change` to a post's like counter and returns the updated post.
	fn adjust_likes<'a>(
		&'a self,
		id: &'a PostId,
		change: LikeChange,
	) -> StoreFuture<'a, Option<Post>>;

	/// Inserts `user` unless another user already holds the same email.
	fn insert_user(&self, user: User) -> StoreFuture<'_, InsertOutcome>;

	/// Returns every user in insertion order.
	fn list_users(&self) -> StoreFuture<'_, Vec<User>>;

	/// Fetches a user by id.
	fn find_user<'a>(&'a self, id: &'a UserId) -> StoreFuture<'a, Option<User>>;

	/// Fetches a user by (already normalized) email.
	fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>>;

	/// Applies `change` to a user's liked set and returns the updated user.
	fn update_liked<'a>(
		&'a self,
		id: &'a UserId,
		change: LikedChange,
	) -> StoreFuture<'a, Option<User>>;

	/// Replaces a user's stored music-service refresh token.
	fn set_refresh_token<'a>(
		&'a self,
		id: &'a UserId,
		token: TokenSecret,
	) -> StoreFuture<'a, Option<User>>;
}

/// Opens the store named by `location`.
pub fn open(location: &StoreLocation) -> Result<Arc<dyn DocumentStore>> {
	match location {
		StoreLocation::Memory => Ok(Arc::new(MemoryStore::default())),
		StoreLocation::File(path) => Ok(Arc::new(FileStore::open(path)?)),
	}
}

/// Like-counter transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeChange {
	/// `likes + 1`.
	Increment,
	/// `likes - 1`, saturating at zero.
	Decrement,
}

/// Liked-set transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LikedChange {
	/// Insert the post id (no-op if present).
	Add(PostId),
	/// Remove the post id (no-op if absent).
	Remove(PostId),
}

/// Result of a user insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
	/// The user was stored.
	Inserted,
	/// Another user already holds this email; nothing was stored.
	DuplicateEmail,
}

/// Error type produced by [`DocumentStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Document collections shared by the built-in stores.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Documents {
	#[serde(default)]
	posts: Vec<Post>,
	#[serde(default)]
	users: Vec<User>,
}
impl Documents {
	fn post_mut(&mut self, id: &PostId) -> Option<&mut Post> {
		self.posts.iter_mut().find(|post| &post.id == id)
	}

	fn user_mut(&mut self, id: &UserId) -> Option<&mut User> {
		self.users.iter_mut().find(|user| &user.id == id)
	}

	fn find_post(&self, id: &PostId) -> Option<Post> {
		self.posts.iter().find(|post| &post.id == id).cloned()
	}

	fn find_user(&self, id: &UserId) -> Option<User> {
		self.users.iter().find(|user| &user.id == id).cloned()
	}

	fn find_user_by_email(&self, email: &str) -> Option<User> {
		self.users.iter().find(|user| user.email == email).cloned()
	}

	fn adjust_likes(&mut self, id: &PostId, change: LikeChange) -> Option<Post> {
		let post = self.post_mut(id)?;

		match change {
			LikeChange::Increment => post.likes = post.likes.saturating_add(1),
			LikeChange::Decrement =>
				if post.likes == 0 {
					tracing::warn!(post = %post.id, "unlike on a post with zero likes, kept at 0");
				} else {
					post.likes -= 1;
				},
		}

		Some(post.clone())
	}

	fn insert_user(&mut self, user: User) -> InsertOutcome {
		if self.users.iter().any(|existing| existing.email == user.email) {
			return InsertOutcome::DuplicateEmail;
		}

		self.users.push(user);

		InsertOutcome::Inserted
	}

	fn update_liked(&mut self, id: &UserId, change: LikedChange) -> Option<User> {
		let user = self.user_mut(id)?;

		match change {
			LikedChange::Add(post) => {
				user.liked.insert(post);
			},
			LikedChange::Remove(post) => {
				user.liked.remove(&post);
			},
		}

		Some(user.clone())
	}

	fn set_refresh_token(&mut self, id: &UserId, token: TokenSecret) -> Option<User> {
		let user = self.user_mut(id)?;

		user.refresh_token = Some(token);

		Some(user.clone())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::model::PostDraft;

	fn post(likes: u64) -> Post {
		Post::from_draft(
			PostDraft {
				title: "Yesterday".into(),
				artist: "The Beatles".into(),
				url: "https://open.spotify.com/track/1".into(),
				likes,
				location: None,
				thumbnail: None,
				uri: None,
			},
			OffsetDateTime::now_utc(),
		)
	}

	#[test]
	fn store_error_converts_into_service_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Service error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn likes_never_go_negative() {
		let mut docs = Documents::default();
		let post = post(0);
		let id = post.id.clone();

		docs.posts.push(post);

		let after = docs.adjust_likes(&id, LikeChange::Decrement).expect("Post should exist.");

		assert_eq!(after.likes, 0);

		let after = docs.adjust_likes(&id, LikeChange::Increment).expect("Post should exist.");

		assert_eq!(after.likes, 1);
		assert!(docs.adjust_likes(&PostId::generate(), LikeChange::Increment).is_none());
	}
}
