//! Signed session tokens carried in an http-only cookie.

// crates.io
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
// self
use crate::{_prelude::*, auth::UserId, error::SessionError};

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Claims embedded in a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	/// Authenticated user.
	pub id: UserId,
	/// Issued-at (unix seconds).
	pub iat: i64,
	/// Expiry (unix seconds).
	pub exp: i64,
}

/// Issues and verifies HMAC-signed session tokens with a fixed lifetime.
#[derive(Clone)]
pub struct SessionSigner {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	ttl: Duration,
}
impl SessionSigner {
	/// Creates a signer for `secret` whose tokens live for `ttl`.
	pub fn new(secret: &str, ttl: Duration) -> Self {
		let mut validation = Validation::default();

		validation.leeway = 0;

		Self {
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
			validation,
			ttl,
		}
	}

	/// Token lifetime, also used as the cookie max-age.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Signs a token for `user` valid from now until now + ttl.
	pub fn issue(&self, user: &UserId) -> Result<String> {
		self.issue_at(user, OffsetDateTime::now_utc())
	}

	/// Signs a token as if issued at `now`.
	pub fn issue_at(&self, user: &UserId, now: OffsetDateTime) -> Result<String> {
		let claims = SessionClaims {
			id: user.clone(),
			iat: now.unix_timestamp(),
			exp: (now + self.ttl).unix_timestamp(),
		};

		jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
			.map_err(|e| SessionError::Sign(e).into())
	}

	/// Verifies signature and expiry, returning the embedded claims.
	pub fn verify(&self, token: &str) -> Result<SessionClaims> {
		jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| SessionError::Invalid(e).into())
	}
}
impl Debug for SessionSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionSigner").field("ttl", &self.ttl).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn user() -> UserId {
		UserId::new("user-1").expect("User fixture should be valid.")
	}

	#[test]
	fn issued_token_verifies() {
		let signer = SessionSigner::new("secret", Duration::hours(1));
		let token = signer.issue(&user()).expect("Signing should succeed.");
		let claims = signer.verify(&token).expect("Fresh token should verify.");

		assert_eq!(claims.id, user());
		assert_eq!(claims.exp - claims.iat, 3600);
	}

	#[test]
	fn expired_or_foreign_tokens_are_rejected() {
		let signer = SessionSigner::new("secret", Duration::hours(1));
		let stale = signer
			.issue_at(&user(), OffsetDateTime::now_utc() - Duration::hours(2))
			.expect("Signing should succeed.");

		assert!(matches!(signer.verify(&stale), Err(Error::Session(SessionError::Invalid(_)))));

		let foreign = SessionSigner::new("other-secret", Duration::hours(1))
			.issue(&user())
			.expect("Signing should succeed.");

		assert!(signer.verify(&foreign).is_err());
		assert!(signer.verify("not-a-token").is_err());
	}
}
