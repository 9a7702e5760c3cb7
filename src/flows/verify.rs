//! Inbound token verification and the `authenticate` entry points.

// self
use crate::{
	_prelude::*,
	auth::{TokenClaims, TokenKind, TokenStatus},
	clock::Clock,
	flows::{CredentialManager, common},
	obs::FlowKind,
	signing::SigningAuthority,
	store::RevocationStore,
};

const BEARER_SCHEME: &str = "bearer";

/// Validates inbound tokens: signature, kind, validity window, then revocation.
///
/// Every claim is read only after the signature verified, and each failure maps to its
/// own [`Error`] variant.
#[derive(Clone)]
pub struct TokenVerifier {
	authority: Arc<SigningAuthority>,
	revocations: Arc<dyn RevocationStore>,
	clock: Arc<dyn Clock>,
	skew: Duration,
}
impl TokenVerifier {
	/// Creates a verifier; `skew` widens both edges of the validity window.
	pub fn new(
		authority: Arc<SigningAuthority>,
		revocations: Arc<dyn RevocationStore>,
		clock: Arc<dyn Clock>,
		skew: Duration,
	) -> Self {
		Self { authority, revocations, clock, skew }
	}

	/// Full verification of `token` as a token of kind `expected`.
	pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims> {
		let claims = self.verify_unrevoked(token, expected)?;

		match self.revocations.lookup(&claims).await? {
			Some(entry) => Err(Error::Revoked { reason: entry.reason }),
			None => Ok(claims),
		}
	}

	/// Signature, kind, and validity window checks without the revocation lookup.
	///
	/// Rotation uses this so an already-rotated token reaches reuse detection instead of
	/// being reported as plainly revoked.
	pub(crate) fn verify_unrevoked(&self, token: &str, expected: TokenKind) -> Result<TokenClaims> {
		let claims = self.authority.open_and_verify_signature(token)?;

		if claims.kind != expected {
			return Err(Error::WrongTokenKind { expected, actual: claims.kind });
		}

		match claims.status_at(self.clock.now(), self.skew) {
			TokenStatus::Pending => Err(Error::NotYetValid),
			TokenStatus::Expired => Err(Error::Expired),
			TokenStatus::Active => Ok(claims),
		}
	}
}
impl Debug for TokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenVerifier").field("skew", &self.skew).finish_non_exhaustive()
	}
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; anything else is a malformed token.
pub fn bearer_token(header: &str) -> Result<&str> {
	let malformed = |reason: &str| Error::MalformedToken { reason: reason.into() };
	let (scheme, token) =
		header.trim().split_once(' ').ok_or_else(|| malformed("missing bearer scheme"))?;

	if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
		return Err(malformed("unsupported authorization scheme"));
	}

	let token = token.trim();

	if token.is_empty() || token.contains(char::is_whitespace) {
		return Err(malformed("bearer token is empty or contains whitespace"));
	}

	Ok(token)
}

impl CredentialManager {
	/// Verifies an access token presented on a protected request.
	pub async fn authenticate(&self, token: &str) -> Result<TokenClaims> {
		common::observe(FlowKind::Authenticate, "authenticate", async move {
			self.verifier.verify(token, TokenKind::Access).await
		})
		.await
	}

	/// Parses an `Authorization` header value and authenticates the bearer token.
	pub async fn authenticate_header(&self, header: &str) -> Result<TokenClaims> {
		let token = bearer_token(header)?;

		self.authenticate(token).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_header_parsing() {
		assert_eq!(bearer_token("Bearer abc.def.ghi").expect("Valid header."), "abc.def.ghi");
		assert_eq!(bearer_token("  bearer   abc.def.ghi ").expect("Valid header."), "abc.def.ghi");

		for header in ["", "Bearer", "Bearer ", "Basic abc", "Bearer a b", "abc.def.ghi"] {
			let err = bearer_token(header).expect_err("Invalid header must be rejected.");

			assert!(matches!(err, Error::MalformedToken { .. }), "{header:?} gave {err:?}");
		}
	}
}
