//! Persisted documents and their client-facing views.
//!
//! Documents serialize with camelCase field names and `_id` identifiers, matching the JSON the
//! web client consumes.

// self
use crate::{
	_prelude::*,
	auth::{PostId, TokenSecret, UserId},
};

/// Canonical post payload produced by a successful song lookup, before persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
	/// Track title as the catalog spells it.
	pub title: String,
	/// Primary artist as the catalog spells it.
	pub artist: String,
	/// Canonical link to the track.
	pub url: String,
	/// Initial like counter; always zero for drafts built by the lookup.
	pub likes: u64,
	/// Caller-supplied location.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	/// Smallest album-art image, when the catalog has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thumbnail: Option<String>,
	/// Internal catalog URI, when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
}

/// Persisted post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	/// Store-assigned identifier.
	#[serde(rename = "_id")]
	pub id: PostId,
	/// Track title.
	pub title: String,
	/// Primary artist.
	pub artist: String,
	/// Canonical link to the track.
	pub url: String,
	/// Like counter; never negative.
	pub likes: u64,
	/// Optional location string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	/// Smallest album-art image.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thumbnail: Option<String>,
	/// Internal catalog URI.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
	/// Creation timestamp; set once.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl Post {
	/// Materializes `draft` with a fresh id and `created_at`.
	pub fn from_draft(draft: PostDraft, created_at: OffsetDateTime) -> Self {
		Self {
			id: PostId::generate(),
			title: draft.title,
			artist: draft.artist,
			url: draft.url,
			likes: draft.likes,
			location: draft.location,
			thumbnail: draft.thumbnail,
			uri: draft.uri,
			created_at,
		}
	}
}

/// Signup payload.
#[derive(Clone, Default, Deserialize)]
pub struct NewUser {
	/// Display name.
	#[serde(default)]
	pub username: String,
	/// Login email; normalized to lowercase before storage.
	#[serde(default)]
	pub email: String,
	/// Plaintext password; hashed before storage.
	#[serde(default)]
	pub password: String,
}
impl Debug for NewUser {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NewUser")
			.field("username", &self.username)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Persisted user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// Store-assigned identifier.
	#[serde(rename = "_id")]
	pub id: UserId,
	/// Display name.
	pub username: String,
	/// Unique, lowercase email.
	pub email: String,
	/// Argon2 PHC hash of the password.
	pub password: TokenSecret,
	/// Posts this user has liked; each id at most once.
	#[serde(default)]
	pub liked: BTreeSet<PostId>,
	/// Music-service refresh token from the most recent account connection.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl User {
	/// Returns the client-facing view.
	pub fn public(&self) -> PublicUser {
		PublicUser::from(self)
	}
}

/// Client-facing user view without credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicUser {
	/// Identifier.
	#[serde(rename = "_id")]
	pub id: UserId,
	/// Display name.
	pub username: String,
	/// Email.
	pub email: String,
	/// Liked post ids.
	pub liked: BTreeSet<PostId>,
}
impl From<&User> for PublicUser {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.clone(),
			username: user.username.clone(),
			email: user.email.clone(),
			liked: user.liked.clone(),
		}
	}
}

/// Liked-set projection returned by `GET /user/:id/liked`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LikedPosts {
	/// Liked post ids.
	pub liked: BTreeSet<PostId>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn post_serializes_with_client_field_names() {
		let post = Post {
			id: PostId::new("post-1").expect("Fixture id should be valid."),
			title: "Yesterday - Remastered".into(),
			artist: "The Beatles".into(),
			url: "https://open.spotify.com/track/1".into(),
			likes: 3,
			location: None,
			thumbnail: None,
			uri: None,
			created_at: time::macros::datetime!(2024-01-02 03:04:05 UTC),
		};
		let value = serde_json::to_value(&post).expect("Post should serialize.");

		assert_eq!(value["_id"], "post-1");
		assert_eq!(value["createdAt"], "2024-01-02T03:04:05Z");
		assert!(value.get("location").is_none());

		let back: Post = serde_json::from_value(value).expect("Post should deserialize.");

		assert_eq!(back, post);
	}

	#[test]
	fn public_view_hides_credentials() {
		let user = User {
			id: UserId::new("user-1").expect("Fixture id should be valid."),
			username: "ringo".into(),
			email: "ringo@example.com".into(),
			password: TokenSecret::new("$argon2id$hash"),
			liked: BTreeSet::new(),
			refresh_token: Some(TokenSecret::new("refresh")),
		};
		let value = serde_json::to_value(user.public()).expect("Public user should serialize.");

		assert_eq!(value["_id"], "user-1");
		assert!(value.get("password").is_none());
		assert!(value.get("refreshToken").is_none());
		assert_eq!(value["liked"], serde_json::json!([]));
	}
}
