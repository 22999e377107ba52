//! Strongly typed document identifiers assigned by the store.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates an identifier from an existing value after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Mints a fresh random identifier.
			pub fn generate() -> Self {
				Self(random_id())
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 64;
const RANDOM_ID_BYTES: usize = 12;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (post, user).
		kind: &'static str,
	},
	/// The identifier contains characters outside `[A-Za-z0-9_-]`.
	#[error("{kind} identifier contains invalid characters.")]
	InvalidCharacters {
		/// Kind of identifier (post, user).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (post, user).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { PostId, "Store-assigned identifier of a post.", "Post" }
def_id! { UserId, "Store-assigned identifier of a user.", "User" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if !view.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
		return Err(IdentifierError::InvalidCharacters { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn random_id() -> String {
	let mut bytes = [0_u8; RANDOM_ID_BYTES];

	rand::rng().fill_bytes(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate() {
		assert!(PostId::new("").is_err());
		assert!(PostId::new("with space").is_err());
		assert!(UserId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let id = PostId::new("64b0f1c2e4a1").expect("Hex-like id should be valid.");

		assert_eq!(id.as_ref(), "64b0f1c2e4a1");
	}

	#[test]
	fn generated_identifiers_are_valid_and_distinct() {
		let first = PostId::generate();
		let second = PostId::generate();

		assert_ne!(first, second);
		assert!(PostId::new(first.as_ref()).is_ok());
		assert_eq!(first.len(), 16);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: UserId =
			serde_json::from_str("\"user-42\"").expect("User id should deserialize successfully.");

		assert_eq!(id.as_ref(), "user-42");
		assert!(serde_json::from_str::<UserId>("\"user 42\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<PostId, u8> = HashMap::from_iter([(
			PostId::new("post-123").expect("Post used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("post-123"), Some(&7));
	}
}
