//! Signing authority: seals claims into tamper-evident envelopes and opens them again.

pub mod envelope;
pub mod key;

pub use envelope::TokenEnvelope;
pub use key::{KeyRing, MIN_KEY_BYTES, SigningKey};

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Mac;
// self
use crate::{
	_prelude::*,
	auth::{KeyId, TokenClaims, TokenSecret},
};

/// Signature-level failures, kept distinct so callers can tell garbage from forgery.
#[derive(Debug, ThisError)]
pub enum SignatureError {
	/// Envelope or claims payload could not be parsed.
	#[error("Token envelope is malformed: {reason}.")]
	Malformed {
		/// What failed to parse.
		reason: String,
	},
	/// MAC does not match the presented key id and payload.
	#[error("Signature does not match the presented claims.")]
	Mismatch,
	/// Envelope names a key that is neither current nor retired.
	#[error("Signing key `{key_id}` is not accepted.")]
	UnknownKey {
		/// Key id named by the envelope.
		key_id: KeyId,
	},
	/// Claims could not be serialized for signing.
	#[error("Claims could not be encoded.")]
	Encode(#[source] serde_json::Error),
}
impl SignatureError {
	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		Self::Malformed { reason: reason.into() }
	}
}

/// Serialized, signed token ready for transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedToken(TokenSecret);
impl SignedToken {
	/// Transport form. Callers must avoid logging this string.
	pub fn as_str(&self) -> &str {
		self.0.expose()
	}

	/// Unwraps the redacted secret.
	pub fn into_secret(self) -> TokenSecret {
		self.0
	}
}
impl AsRef<str> for SignedToken {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

/// Holds the key ring and performs every sign/verify operation.
///
/// The ring sits behind a lock so operators can rotate keys at runtime; each
/// operation works on a snapshot and never holds the lock while hashing.
#[derive(Debug)]
pub struct SigningAuthority {
	ring: RwLock<Arc<KeyRing>>,
}
impl SigningAuthority {
	/// Creates an authority over the provided ring.
	pub fn new(ring: KeyRing) -> Self {
		Self { ring: RwLock::new(Arc::new(ring)) }
	}

	/// Current ring snapshot.
	pub fn key_ring(&self) -> Arc<KeyRing> {
		self.ring.read().clone()
	}

	/// Promotes `next` to the signing key; the previous key keeps verifying.
	pub fn rotate_key(&self, next: SigningKey) -> Result<(), crate::error::ConfigError> {
		let mut guard = self.ring.write();
		let rotated = guard.rotate(next)?;

		*guard = Arc::new(rotated);

		Ok(())
	}

	/// Stops accepting a retired key.
	pub fn retire_key(&self, id: &KeyId) -> bool {
		let mut guard = self.ring.write();
		let mut ring = KeyRing::clone(&guard);
		let dropped = ring.drop_retired(id);

		if dropped {
			*guard = Arc::new(ring);
		}

		dropped
	}

	/// Seals `claims` with the current key. Deterministic for a given key and claims.
	pub fn sign(&self, claims: &TokenClaims) -> Result<SignedToken, SignatureError> {
		let ring = self.key_ring();
		let key = ring.current();
		let payload =
			URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).map_err(SignatureError::Encode)?);
		let signing_input = envelope::signing_input(key.id(), &payload);
		let mut mac = key.mac();

		mac.update(signing_input.as_bytes());

		let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

		Ok(SignedToken(TokenSecret::new(format!("{signing_input}.{signature}"))))
	}

	/// Parses `token`, checks its MAC against the named key, and only then decodes claims.
	pub fn open_and_verify_signature(&self, token: &str) -> Result<TokenClaims, SignatureError> {
		let envelope = TokenEnvelope::parse(token)?;

		self.verify_envelope(&envelope)
	}

	/// Verifies an already parsed envelope.
	pub fn verify_envelope(&self, envelope: &TokenEnvelope) -> Result<TokenClaims, SignatureError> {
		let ring = self.key_ring();
		let key = ring
			.find(&envelope.key_id)
			.ok_or_else(|| SignatureError::UnknownKey { key_id: envelope.key_id.clone() })?;
		let mut mac = key.mac();

		mac.update(envelope.signing_input().as_bytes());
		mac.verify_slice(&envelope.signature).map_err(|_| SignatureError::Mismatch)?;

		serde_json::from_slice(&envelope.payload_bytes()?)
			.map_err(|e| SignatureError::malformed(format!("claims are not valid JSON ({e})")))
	}
}
