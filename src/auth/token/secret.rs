//! Redacted wrapper for serialized tokens and one-time reset secrets.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Sensitive string (bearer token or reset secret) kept out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Draws `len` bytes from the thread-local CSPRNG and encodes them URL-safe.
	pub fn generate(len: usize) -> Self {
		let mut bytes = vec![0_u8; len];

		rand::rng().fill_bytes(&mut bytes);

		Self(URL_SAFE_NO_PAD.encode(bytes))
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Unwraps the secret for hand-off to the transport layer.
	pub fn into_inner(self) -> String {
		self.0
	}

	/// SHA-256 digest of the secret, URL-safe base64 without padding.
	///
	/// Only this digest is ever persisted for reset secrets.
	pub fn digest(&self) -> String {
		digest_secret(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Hashes a presented secret the same way [`TokenSecret::digest`] does.
pub fn digest_secret(presented: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(presented.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
