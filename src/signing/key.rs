//! HMAC signing keys and the current/retired key ring.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::KeyId, error::ConfigError};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key length in bytes.
pub const MIN_KEY_BYTES: usize = 32;

/// Symmetric HMAC-SHA256 key addressed by a [`KeyId`].
#[derive(Clone)]
pub struct SigningKey {
	id: KeyId,
	mac: HmacSha256,
}
impl SigningKey {
	/// Builds a key from raw material (at least [`MIN_KEY_BYTES`] bytes).
	pub fn new(id: KeyId, material: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let material = material.as_ref();

		if material.len() < MIN_KEY_BYTES {
			return Err(ConfigError::WeakKey {
				key_id: id.to_string(),
				actual: material.len(),
				min: MIN_KEY_BYTES,
			});
		}

		let mac = <HmacSha256 as Mac>::new_from_slice(material).map_err(|_| {
			ConfigError::WeakKey { key_id: id.to_string(), actual: material.len(), min: MIN_KEY_BYTES }
		})?;

		Ok(Self { id, mac })
	}

	/// Builds a key from base64url (no padding) material.
	pub fn from_base64(id: KeyId, encoded: &str) -> Result<Self, ConfigError> {
		let material = URL_SAFE_NO_PAD
			.decode(encoded.trim())
			.map_err(|source| ConfigError::KeyEncoding { key_id: id.to_string(), source })?;

		Self::new(id, material)
	}

	/// Generates a key with fresh random material.
	pub fn generate(id: KeyId) -> Result<Self, ConfigError> {
		let mut material = [0_u8; MIN_KEY_BYTES];

		rand::rng().fill_bytes(&mut material);

		Self::new(id, material)
	}

	/// Identifier embedded in envelopes signed by this key.
	pub fn id(&self) -> &KeyId {
		&self.id
	}

	pub(crate) fn mac(&self) -> HmacSha256 {
		self.mac.clone()
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningKey").field("id", &self.id).field("material", &"<redacted>").finish()
	}
}

/// Current signing key plus retired keys still accepted for verification.
///
/// Retired keys are kept newest first so verification walks current, then the
/// most recently retired, down to the oldest.
#[derive(Clone, Debug)]
pub struct KeyRing {
	current: SigningKey,
	retired: Vec<SigningKey>,
}
impl KeyRing {
	/// Creates a ring with no retired keys.
	pub fn new(current: SigningKey) -> Self {
		Self { current, retired: Vec::new() }
	}

	/// Appends a retired key as the oldest accepted key.
	pub fn with_retired(mut self, key: SigningKey) -> Result<Self, ConfigError> {
		self.ensure_unique(key.id())?;
		self.retired.push(key);

		Ok(self)
	}

	/// Promotes `next` to current and retires the previous current key.
	pub fn rotate(&self, next: SigningKey) -> Result<Self, ConfigError> {
		self.ensure_unique(next.id())?;

		let mut retired = Vec::with_capacity(self.retired.len() + 1);

		retired.push(self.current.clone());
		retired.extend(self.retired.iter().cloned());

		Ok(Self { current: next, retired })
	}

	/// Stops accepting a retired key. Returns `false` if it was not retired.
	pub fn drop_retired(&mut self, id: &KeyId) -> bool {
		let before = self.retired.len();

		self.retired.retain(|key| key.id() != id);

		before != self.retired.len()
	}

	/// Key used for every new signature.
	pub fn current(&self) -> &SigningKey {
		&self.current
	}

	/// Retired keys, newest first.
	pub fn retired(&self) -> &[SigningKey] {
		&self.retired
	}

	/// All accepted keys in verification order.
	pub fn keys(&self) -> impl Iterator<Item = &SigningKey> {
		std::iter::once(&self.current).chain(self.retired.iter())
	}

	/// Looks up an accepted key by identifier.
	pub fn find(&self, id: &KeyId) -> Option<&SigningKey> {
		self.keys().find(|key| key.id() == id)
	}

	fn ensure_unique(&self, id: &KeyId) -> Result<(), ConfigError> {
		if self.find(id).is_some() {
			return Err(ConfigError::DuplicateKeyId { key_id: id.to_string() });
		}

		Ok(())
	}
}
