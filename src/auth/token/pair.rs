//! Access/refresh pair returned by login, rotation, and password change.

// self
use crate::{
	_prelude::*,
	auth::{FamilyId, PrincipalId, TokenClaims, TokenSecret},
};

/// Freshly minted access and refresh tokens sharing one family.
#[derive(Clone, Debug)]
pub struct TokenPair {
	/// Serialized access token handed to the client.
	pub access_token: TokenSecret,
	/// Serialized refresh token handed to the client.
	pub refresh_token: TokenSecret,
	/// Claims embedded in [`Self::access_token`].
	pub access_claims: TokenClaims,
	/// Claims embedded in [`Self::refresh_token`].
	pub refresh_claims: TokenClaims,
}
impl TokenPair {
	/// Family shared by both tokens.
	pub fn family_id(&self) -> &FamilyId {
		&self.refresh_claims.family_id
	}

	/// Principal both tokens were issued for.
	pub fn principal(&self) -> &PrincipalId {
		&self.access_claims.principal
	}

	/// Seconds until the access token expires, measured from its issued-at instant.
	pub fn access_expires_in(&self) -> i64 {
		(self.access_claims.expires_at - self.access_claims.issued_at).whole_seconds()
	}
}
