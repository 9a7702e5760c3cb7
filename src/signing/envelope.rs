//! Three-segment, URL-safe token envelope: `<key-id>.<payload>.<signature>`.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::KeyId, signing::SignatureError};

const SEGMENT_DELIMITER: char = '.';

/// Parsed but not yet verified token envelope.
///
/// Nothing inside the payload may be trusted until the signature verifies.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenEnvelope {
	/// Key the signature claims to be made with.
	pub key_id: KeyId,
	/// Base64url-encoded claims exactly as transmitted.
	pub payload: String,
	/// Raw MAC bytes.
	pub signature: Vec<u8>,
}
impl TokenEnvelope {
	/// Splits a serialized token into its segments.
	///
	/// Structural problems are [`SignatureError::Malformed`]; a signature segment that does
	/// not decode can never match and is reported as [`SignatureError::Mismatch`].
	pub fn parse(token: &str) -> Result<Self, SignatureError> {
		let mut segments = token.split(SEGMENT_DELIMITER);
		let (Some(key_id), Some(payload), Some(signature), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(SignatureError::malformed("expected three dot-separated segments"));
		};
		let key_id = KeyId::new(key_id)
			.map_err(|e| SignatureError::malformed(format!("invalid key id ({e})")))?;

		if payload.is_empty() || URL_SAFE_NO_PAD.decode(payload).is_err() {
			return Err(SignatureError::malformed("payload is not base64url"));
		}

		let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| SignatureError::Mismatch)?;

		Ok(Self { key_id, payload: payload.to_owned(), signature })
	}

	/// Bytes covered by the MAC.
	pub fn signing_input(&self) -> String {
		signing_input(&self.key_id, &self.payload)
	}

	/// Decoded claims payload.
	pub fn payload_bytes(&self) -> Result<Vec<u8>, SignatureError> {
		URL_SAFE_NO_PAD
			.decode(&self.payload)
			.map_err(|_| SignatureError::malformed("payload is not base64url"))
	}

	/// Serializes the envelope back into its transport form.
	pub fn encode(&self) -> String {
		format!(
			"{}{SEGMENT_DELIMITER}{}",
			self.signing_input(),
			URL_SAFE_NO_PAD.encode(&self.signature)
		)
	}
}
impl Debug for TokenEnvelope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEnvelope")
			.field("key_id", &self.key_id)
			.field("payload_len", &self.payload.len())
			.field("signature_len", &self.signature.len())
			.finish()
	}
}

pub(crate) fn signing_input(key_id: &KeyId, payload: &str) -> String {
	format!("{key_id}{SEGMENT_DELIMITER}{payload}")
}
