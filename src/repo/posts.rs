//! Post Repository: feed documents and their like counters.

// self
use crate::{
	_prelude::*,
	auth::PostId,
	model::{Post, PostDraft},
	store::{DocumentStore, LikeChange},
};

/// Feed ordering accepted by [`PostRepository::list_posts_ordered`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostOrder {
	/// Newest `created_at` first.
	Recent,
	/// Most likes first; ties broken by recency.
	Popular,
}

/// Post persistence.
#[derive(Clone)]
pub struct PostRepository {
	store: Arc<dyn DocumentStore>,
}
impl PostRepository {
	/// Creates a repository backed by `store`.
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Persists `draft`, assigning an id and `created_at`.
	pub async fn add_post(&self, draft: PostDraft) -> Result<Post> {
		let post = Post::from_draft(draft, OffsetDateTime::now_utc());

		self.store.insert_post(post.clone()).await?;
		tracing::info!(post = %post.id, title = %post.title, "post created");

		Ok(post)
	}

	/// Returns every post in insertion order.
	pub async fn list_posts(&self) -> Result<Vec<Post>> {
		Ok(self.store.list_posts().await?)
	}

	/// Fetches a post; `Ok(None)` when absent.
	pub async fn find_post(&self, id: &PostId) -> Result<Option<Post>> {
		Ok(self.store.find_post(id).await?)
	}

	/// Returns every post sorted by `order`.
	pub async fn list_posts_ordered(&self, order: PostOrder) -> Result<Vec<Post>> {
		let mut posts = self.list_posts().await?;

		match order {
			PostOrder::Recent => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
			PostOrder::Popular => posts.sort_by(|a, b| {
				b.likes.cmp(&a.likes).then_with(|| b.created_at.cmp(&a.created_at))
			}),
		}

		Ok(posts)
	}

	/// Unlikes (`currently_liked == true`) or likes the post and returns it.
	pub async fn update_like_status(&self, id: &PostId, currently_liked: bool) -> Result<Post> {
		let change = if currently_liked { LikeChange::Decrement } else { LikeChange::Increment };

		self.store.adjust_likes(id, change).await?.ok_or_else(|| Error::not_found("post", id))
	}
}
impl Debug for PostRepository {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PostRepository(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn draft(title: &str) -> PostDraft {
		PostDraft {
			title: title.into(),
			artist: "The Beatles".into(),
			url: format!("https://open.spotify.com/track/{title}"),
			likes: 0,
			location: None,
			thumbnail: None,
			uri: None,
		}
	}

	#[tokio::test]
	async fn like_then_unlike_restores_the_counter() {
		let repo = PostRepository::new(Arc::new(MemoryStore::default()));
		let mut seeded = draft("Yesterday");

		seeded.likes = 3;

		let post = repo.add_post(seeded).await.expect("Post should be stored.");
		let liked = repo.update_like_status(&post.id, false).await.expect("Like should apply.");

		assert_eq!(liked.likes, 4);

		let unliked =
			repo.update_like_status(&post.id, true).await.expect("Unlike should apply.");

		assert_eq!(unliked.likes, 3);
		assert_eq!(repo.find_post(&post.id).await.expect("Lookup should run."), Some(unliked));
	}

	#[tokio::test]
	async fn unknown_post_is_not_found() {
		let repo = PostRepository::new(Arc::new(MemoryStore::default()));
		let err = repo
			.update_like_status(&PostId::generate(), false)
			.await
			.expect_err("Unknown post should fail.");

		assert!(matches!(err, Error::NotFound { resource: "post", .. }));
		assert!(repo.find_post(&PostId::generate()).await.expect("Lookup should run.").is_none());
	}

	#[tokio::test]
	async fn listing_is_stable_and_orderable() {
		let repo = PostRepository::new(Arc::new(MemoryStore::default()));
		let first = repo.add_post(draft("Help")).await.expect("Post should be stored.");
		let second = repo.add_post(draft("Something")).await.expect("Post should be stored.");

		repo.update_like_status(&first.id, false).await.expect("Like should apply.");

		let once = repo.list_posts().await.expect("Posts should list.");
		let twice = repo.list_posts().await.expect("Posts should list.");

		assert_eq!(once, twice);
		assert_eq!(once.iter().map(|p| p.id.clone()).collect::<Vec<_>>(), vec![
			first.id.clone(),
			second.id.clone()
		]);

		let popular =
			repo.list_posts_ordered(PostOrder::Popular).await.expect("Posts should sort.");

		assert_eq!(popular[0].id, first.id);

		let recent = repo.list_posts_ordered(PostOrder::Recent).await.expect("Posts should sort.");

		assert!(recent[0].created_at >= recent[1].created_at);
	}
}
