//! JSON-file [`DocumentStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{PostId, TokenSecret, UserId},
	model::{Post, User},
	store::{
		DocumentStore, Documents, InsertOutcome, LikeChange, LikedChange, StoreError, StoreFuture,
	},
};

/// Persists every document to a JSON snapshot after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Documents>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Documents, StoreError> {
		if !path.exists() {
			return Ok(Documents::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(Documents::default());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Documents) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Runs `mutate` under the write lock and persists the snapshot before releasing it.
	fn mutate<T>(&self, mutate: impl FnOnce(&mut Documents) -> T) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let value = mutate(&mut guard);

		self.persist_locked(&guard)?;

		Ok(value)
	}
}
impl DocumentStore for FileStore {
	fn insert_post(&self, post: Post) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|docs| docs.posts.push(post)) })
	}

	fn list_posts(&self) -> StoreFuture<'_, Vec<Post>> {
		Box::pin(async move { Ok(self.inner.read().posts.clone()) })
	}

	fn find_post<'a>(&'a self, id: &'a PostId) -> StoreFuture<'a, Option<Post>> {
		Box::pin(async move { Ok(self.inner.read().find_post(id)) })
	}

	fn adjust_likes<'a>(
		&'a self,
		id: &'a PostId,
		change: LikeChange,
	) -> StoreFuture<'a, Option<Post>> {
		Box::pin(async move { self.mutate(|docs| docs.adjust_likes(id, change)) })
	}

	fn insert_user(&self, user: User) -> StoreFuture<'_, InsertOutcome> {
		Box::pin(async move { self.mutate(|docs| docs.insert_user(user)) })
	}

	fn list_users(&self) -> StoreFuture<'_, Vec<User>> {
		Box::pin(async move { Ok(self.inner.read().users.clone()) })
	}

	fn find_user<'a>(&'a self, id: &'a UserId) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.inner.read().find_user(id)) })
	}

	fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.inner.read().find_user_by_email(email)) })
	}

	fn update_liked<'a>(
		&'a self,
		id: &'a UserId,
		change: LikedChange,
	) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { self.mutate(|docs| docs.update_liked(id, change)) })
	}

	fn set_refresh_token<'a>(
		&'a self,
		id: &'a UserId,
		token: TokenSecret,
	) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { self.mutate(|docs| docs.set_refresh_token(id, token)) })
	}
}
