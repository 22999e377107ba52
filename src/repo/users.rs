//! User Repository: accounts, email/password login, liked sets, and stored music tokens.

// self
use crate::{
	_prelude::*,
	auth::{self, PostId, TokenSecret, UserId},
	error::{AuthError, ValidationErrors},
	model::{NewUser, User},
	store::{DocumentStore, InsertOutcome, LikedChange},
};

const MIN_PASSWORD_LEN: usize = 6;

/// User persistence and email/password authentication.
#[derive(Clone)]
pub struct UserRepository {
	store: Arc<dyn DocumentStore>,
}
impl UserRepository {
	/// Creates a repository backed by `store`.
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Validates and stores a new user with a hashed password.
	///
	/// Every failing field is reported at once; a duplicate email is reported on `email` and
	/// stores nothing.
	pub async fn add_user(&self, fields: NewUser) -> Result<User> {
		let NewUser { username, email, password } = fields;
		let username = username.trim().to_owned();
		let email = normalize_email(&email);

		validate(&username, &email, &password).into_result()?;

		let user = User {
			id: UserId::generate(),
			username,
			email,
			password: auth::hash_password(&password)?,
			liked: BTreeSet::new(),
			refresh_token: None,
		};

		match self.store.insert_user(user.clone()).await? {
			InsertOutcome::Inserted => {
				tracing::info!(user = %user.id, "user registered");

				Ok(user)
			},
			InsertOutcome::DuplicateEmail =>
				Err(ValidationErrors::single("email", "Email already in use.").into()),
		}
	}

	/// Authenticates by email and password.
	///
	/// Fails with [`AuthError::IncorrectEmail`] when no user holds the email and with
	/// [`AuthError::IncorrectPassword`] when the hash comparison fails.
	pub async fn login(&self, email: &str, password: &str) -> Result<User> {
		let user = self
			.store
			.find_user_by_email(&normalize_email(email))
			.await?
			.ok_or(AuthError::IncorrectEmail)?;

		if auth::verify_password(password, &user.password)? {
			Ok(user)
		} else {
			Err(AuthError::IncorrectPassword.into())
		}
	}

	/// Adds `post` to the user's liked set.
	pub async fn add_user_liked(&self, id: &UserId, post: PostId) -> Result<User> {
		self.update_liked(id, LikedChange::Add(post)).await
	}

	/// Removes `post` from the user's liked set.
	pub async fn remove_user_liked(&self, id: &UserId, post: PostId) -> Result<User> {
		self.update_liked(id, LikedChange::Remove(post)).await
	}

	/// Fetches a user; `Ok(None)` when absent.
	pub async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>> {
		Ok(self.store.find_user(id).await?)
	}

	/// Fetches a user's liked set; `Ok(None)` when the user is absent.
	pub async fn get_user_liked(&self, id: &UserId) -> Result<Option<BTreeSet<PostId>>> {
		Ok(self.find_user_by_id(id).await?.map(|user| user.liked))
	}

	/// Stores the music-service refresh token issued to this user.
	pub async fn update_refresh_token(&self, id: &UserId, token: TokenSecret) -> Result<User> {
		self.store.set_refresh_token(id, token).await?.ok_or_else(|| Error::not_found("user", id))
	}

	/// Returns every user.
	pub async fn list_users(&self) -> Result<Vec<User>> {
		Ok(self.store.list_users().await?)
	}

	async fn update_liked(&self, id: &UserId, change: LikedChange) -> Result<User> {
		self.store.update_liked(id, change).await?.ok_or_else(|| Error::not_found("user", id))
	}
}
impl Debug for UserRepository {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("UserRepository(..)")
	}
}

fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

fn validate(username: &str, email: &str, password: &str) -> ValidationErrors {
	let mut errors = ValidationErrors::default();

	if username.is_empty() {
		errors.push("username", "Please enter a username.");
	}
	if email.is_empty() {
		errors.push("email", "Please enter an email.");
	} else if !looks_like_email(email) {
		errors.push("email", "Please enter a valid email.");
	}
	if password.is_empty() {
		errors.push("password", "Please enter a password.");
	} else if password.chars().count() < MIN_PASSWORD_LEN {
		errors.push("password", "Minimum password length is 6 characters.");
	}

	errors
}

fn looks_like_email(email: &str) -> bool {
	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};

	!local.is_empty()
		&& !domain.contains('@')
		&& !email.chars().any(char::is_whitespace)
		&& domain.split('.').count() >= 2
		&& domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn new_user(email: &str, password: &str) -> NewUser {
		NewUser { username: "ringo".into(), email: email.into(), password: password.into() }
	}

	#[test]
	fn email_shape_check() {
		assert!(looks_like_email("ringo@example.com"));
		assert!(!looks_like_email("ringo@example"));
		assert!(!looks_like_email("@example.com"));
		assert!(!looks_like_email("rin go@example.com"));
		assert!(!looks_like_email("ringo@@example.com"));
	}

	#[tokio::test]
	async fn signup_reports_every_failing_field() {
		let repo = UserRepository::new(Arc::new(MemoryStore::default()));
		let err = repo
			.add_user(NewUser {
				username: " ".into(),
				email: "nope".into(),
				password: "123".into(),
			})
			.await
			.expect_err("Invalid signup should fail.");
		let Error::Validation(errors) = err else { panic!("Expected a validation error.") };

		assert_eq!(errors.get("username"), Some("Please enter a username."));
		assert_eq!(errors.get("email"), Some("Please enter a valid email."));
		assert_eq!(errors.get("password"), Some("Minimum password length is 6 characters."));
		assert!(repo.list_users().await.expect("Users should list.").is_empty());
	}

	#[tokio::test]
	async fn duplicate_email_is_rejected_without_a_second_record() {
		let repo = UserRepository::new(Arc::new(MemoryStore::default()));

		repo.add_user(new_user("Ringo@Example.com", "octopus")).await.expect("First signup works.");

		let err = repo
			.add_user(new_user("ringo@example.com", "garden!"))
			.await
			.expect_err("Duplicate email should fail.");

		assert!(matches!(
			&err,
			Error::Validation(errors) if errors.get("email") == Some("Email already in use.")
		));
		assert_eq!(repo.list_users().await.expect("Users should list.").len(), 1);
	}

	#[tokio::test]
	async fn login_distinguishes_unknown_email_from_wrong_password() {
		let repo = UserRepository::new(Arc::new(MemoryStore::default()));
		let user =
			repo.add_user(new_user("ringo@example.com", "octopus")).await.expect("Signup works.");

		assert_ne!(user.password.expose(), "octopus");

		let wrong_email = repo
			.login("paul@example.com", "octopus")
			.await
			.expect_err("Unknown email should fail.");
		let wrong_password = repo
			.login("ringo@example.com", "garden")
			.await
			.expect_err("Wrong password should fail.");

		assert!(matches!(wrong_email, Error::Auth(AuthError::IncorrectEmail)));
		assert!(matches!(wrong_password, Error::Auth(AuthError::IncorrectPassword)));

		let logged_in =
			repo.login("RINGO@example.com", "octopus").await.expect("Correct login works.");

		assert_eq!(logged_in.id, user.id);
	}

	#[tokio::test]
	async fn liked_set_holds_each_post_once() {
		let repo = UserRepository::new(Arc::new(MemoryStore::default()));
		let user =
			repo.add_user(new_user("ringo@example.com", "octopus")).await.expect("Signup works.");
		let post = PostId::generate();

		repo.add_user_liked(&user.id, post.clone()).await.expect("Like should apply.");

		let twice = repo.add_user_liked(&user.id, post.clone()).await.expect("Like is idempotent.");

		assert_eq!(twice.liked.len(), 1);

		repo.remove_user_liked(&user.id, post).await.expect("Unlike should apply.");

		assert_eq!(
			repo.get_user_liked(&user.id).await.expect("Read works."),
			Some(BTreeSet::new())
		);
		assert_eq!(repo.get_user_liked(&UserId::generate()).await.expect("Read works."), None);
		assert!(matches!(
			repo.add_user_liked(&UserId::generate(), PostId::generate()).await,
			Err(Error::NotFound { resource: "user", .. })
		));
	}

	#[tokio::test]
	async fn refresh_token_is_stored_on_the_user() {
		let repo = UserRepository::new(Arc::new(MemoryStore::default()));
		let user =
			repo.add_user(new_user("ringo@example.com", "octopus")).await.expect("Signup works.");
		let updated = repo
			.update_refresh_token(&user.id, TokenSecret::new("refresh-1"))
			.await
			.expect("Refresh token should be stored.");

		assert_eq!(updated.refresh_token.as_ref().map(TokenSecret::expose), Some("refresh-1"));
	}
}
