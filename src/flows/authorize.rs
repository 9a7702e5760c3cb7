//! At-least-one-of role authorization over verified claims.

// self
use crate::{
	_prelude::*,
	auth::{RoleSet, TokenClaims},
	flows::CredentialManager,
};

/// Decides whether verified claims may use a capability guarded by `required` roles.
///
/// An empty requirement is a public capability. There is no role hierarchy.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoleAuthorizer;
impl RoleAuthorizer {
	/// Returns `true` if `required` is empty or shares at least one role with the claims.
	pub fn authorize(&self, claims: &TokenClaims, required: &RoleSet) -> bool {
		required.is_empty() || claims.roles.intersects(required)
	}

	/// Like [`Self::authorize`], but fails with [`Error::Forbidden`].
	pub fn require(&self, claims: &TokenClaims, required: &RoleSet) -> Result<()> {
		if self.authorize(claims, required) {
			Ok(())
		} else {
			Err(Error::Forbidden { required: required.clone() })
		}
	}
}

impl CredentialManager {
	/// See [`RoleAuthorizer::authorize`].
	pub fn authorize(&self, claims: &TokenClaims, required: &RoleSet) -> bool {
		RoleAuthorizer.authorize(claims, required)
	}

	/// See [`RoleAuthorizer::require`].
	pub fn require_roles(&self, claims: &TokenClaims, required: &RoleSet) -> Result<()> {
		RoleAuthorizer.require(claims, required)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::{FamilyId, PrincipalId, TokenId, TokenKind};

	fn claims_with(roles: &[&str]) -> TokenClaims {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);

		TokenClaims {
			principal: PrincipalId::new("p-1").expect("Principal fixture should be valid."),
			roles: RoleSet::new(roles.iter().copied()).expect("Role fixture should be valid."),
			token_id: TokenId::new("tok-1").expect("Token fixture should be valid."),
			family_id: FamilyId::new("fam-1").expect("Family fixture should be valid."),
			issued_at,
			expires_at: issued_at + Duration::minutes(15),
			kind: TokenKind::Access,
		}
	}

	#[test]
	fn at_least_one_role_must_match() {
		let required = RoleSet::new(["admin", "lead-guide"]).expect("Role fixture should be valid.");

		assert!(!RoleAuthorizer.authorize(&claims_with(&["user"]), &required));
		assert!(RoleAuthorizer.authorize(&claims_with(&["user", "lead-guide"]), &required));
	}

	#[test]
	fn empty_requirement_is_public() {
		assert!(RoleAuthorizer.authorize(&claims_with(&[]), &RoleSet::default()));
	}

	#[test]
	fn no_implicit_hierarchy() {
		let required = RoleSet::new(["user"]).expect("Role fixture should be valid.");
		let err = RoleAuthorizer
			.require(&claims_with(&["admin"]), &required)
			.expect_err("Admin does not imply user.");

		assert!(matches!(err, Error::Forbidden { .. }));
		assert_eq!(err.status_hint(), 403);
	}
}
