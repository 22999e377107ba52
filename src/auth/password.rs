//! Salted password hashing backed by Argon2.

// crates.io
use argon2::{
	Argon2,
	password_hash::{
		Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
		rand_core::OsRng,
	},
};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Hashes `password` with a fresh random salt into a PHC string.
pub fn hash_password(password: &str) -> Result<TokenSecret> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|e| Error::PasswordHash { reason: e.to_string() })?;

	Ok(TokenSecret::new(hash.to_string()))
}

/// Returns whether `password` matches the stored PHC `hash`.
///
/// A mismatch is `Ok(false)`; a corrupt stored hash is an error.
pub fn verify_password(password: &str, hash: &TokenSecret) -> Result<bool> {
	let parsed = PasswordHash::new(hash.expose())
		.map_err(|e| Error::PasswordHash { reason: e.to_string() })?;

	match Argon2::default().verify_password(password.as_bytes(), &parsed) {
		Ok(()) => Ok(true),
		Err(PasswordHashError::Password) => Ok(false),
		Err(e) => Err(Error::PasswordHash { reason: e.to_string() }),
	}
}
