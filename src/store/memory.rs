//! Thread-safe in-memory [`DocumentStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{PostId, TokenSecret, UserId},
	model::{Post, User},
	store::{DocumentStore, Documents, InsertOutcome, LikeChange, LikedChange, StoreFuture},
};

/// Process-local storage backend; contents are lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Documents>>);
impl DocumentStore for MemoryStore {
	fn insert_post(&self, post: Post) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.0.write().posts.push(post);

			Ok(())
		})
	}

	fn list_posts(&self) -> StoreFuture<'_, Vec<Post>> {
		Box::pin(async move { Ok(self.0.read().posts.clone()) })
	}

	fn find_post<'a>(&'a self, id: &'a PostId) -> StoreFuture<'a, Option<Post>> {
		Box::pin(async move { Ok(self.0.read().find_post(id)) })
	}

	fn adjust_likes<'a>(
		&'a self,
		id: &'a PostId,
		change: LikeChange,
	) -> StoreFuture<'a, Option<Post>> {
		Box::pin(async move { Ok(self.0.write().adjust_likes(id, change)) })
	}

	fn insert_user(&self, user: User) -> StoreFuture<'_, InsertOutcome> {
		Box::pin(async move { Ok(self.0.write().insert_user(user)) })
	}

	fn list_users(&self) -> StoreFuture<'_, Vec<User>> {
		Box::pin(async move { Ok(self.0.read().users.clone()) })
	}

	fn find_user<'a>(&'a self, id: &'a UserId) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.0.read().find_user(id)) })
	}

	fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.0.read().find_user_by_email(email)) })
	}

	fn update_liked<'a>(
		&'a self,
		id: &'a UserId,
		change: LikedChange,
	) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.0.write().update_liked(id, change)) })
	}

	fn set_refresh_token<'a>(
		&'a self,
		id: &'a UserId,
		token: TokenSecret,
	) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.0.write().set_refresh_token(id, token)) })
	}
}
