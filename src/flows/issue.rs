//! Token pair issuance and the login entry points.

// self
use crate::{
	_prelude::*,
	auth::{FamilyId, Principal, PrincipalId, RoleSet, TokenClaims, TokenId, TokenKind, TokenPair},
	clock::Clock,
	config::LifecyclePolicy,
	flows::{CredentialManager, common},
	identity::IdentityError,
	obs::FlowKind,
	signing::SigningAuthority,
};

/// Mints access/refresh pairs. Issuance never writes to any store.
#[derive(Clone)]
pub struct TokenIssuer {
	authority: Arc<SigningAuthority>,
	policy: LifecyclePolicy,
	clock: Arc<dyn Clock>,
}
impl TokenIssuer {
	/// Creates an issuer signing with `authority` under `policy`.
	pub fn new(authority: Arc<SigningAuthority>, policy: LifecyclePolicy, clock: Arc<dyn Clock>) -> Self {
		Self { authority, policy, clock }
	}

	/// Signing authority used for every token.
	pub fn authority(&self) -> &Arc<SigningAuthority> {
		&self.authority
	}

	/// Issues a pair in a brand-new family.
	pub fn issue_pair(&self, principal: &Principal) -> Result<TokenPair> {
		self.issue_in_family(&principal.id, &principal.roles, FamilyId::generate())
	}

	/// Issues a pair continuing `family`; both tokens get fresh, independent ids.
	pub fn issue_in_family(
		&self,
		principal: &PrincipalId,
		roles: &RoleSet,
		family: FamilyId,
	) -> Result<TokenPair> {
		let now = self.clock.now();
		let access_claims = TokenClaims {
			principal: principal.clone(),
			roles: roles.clone(),
			token_id: TokenId::generate(),
			family_id: family.clone(),
			issued_at: now,
			expires_at: now + self.policy.access_token_ttl,
			kind: TokenKind::Access,
		};
		let refresh_claims = TokenClaims {
			token_id: TokenId::generate(),
			family_id: family,
			expires_at: now + self.policy.refresh_token_ttl,
			kind: TokenKind::Refresh,
			..access_claims.clone()
		};
		let access_token = self.authority.sign(&access_claims)?.into_secret();
		let refresh_token = self.authority.sign(&refresh_claims)?.into_secret();

		Ok(TokenPair { access_token, refresh_token, access_claims, refresh_claims })
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer").field("policy", &self.policy).finish_non_exhaustive()
	}
}

impl CredentialManager {
	/// Issues a pair for a principal whose credentials the caller already checked.
	///
	/// Roles are read from the Identity Store, never from the caller.
	pub async fn login(&self, principal: &PrincipalId) -> Result<TokenPair> {
		common::observe(FlowKind::Login, "login", async move {
			let principal = self.identity.fetch_principal(principal).await?;

			self.issuer.issue_pair(&principal)
		})
		.await
	}

	/// Checks `password` against the stored credential hash, then issues a pair.
	///
	/// An unknown principal and a wrong password both yield
	/// [`Error::InvalidCredentials`] so callers cannot probe for principals.
	pub async fn login_with_password(
		&self,
		principal: &PrincipalId,
		password: &str,
	) -> Result<TokenPair> {
		common::observe(FlowKind::Login, "login_with_password", async move {
			let stored = match self.identity.credential_hash(principal).await {
				Ok(stored) => stored,
				Err(IdentityError::UnknownPrincipal { .. }) => return Err(Error::InvalidCredentials),
				Err(e) => return Err(e.into()),
			};

			if !self.hasher.verify(password, &stored) {
				return Err(Error::InvalidCredentials);
			}

			let principal = self.identity.fetch_principal(principal).await?;

			self.issuer.issue_pair(&principal)
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		auth::KeyId,
		clock::ManualClock,
		signing::{KeyRing, SigningKey},
	};

	fn issuer() -> TokenIssuer {
		let key = SigningKey::generate(KeyId::new("k1").expect("Valid key id."))
			.expect("Generated keys always meet the minimum length.");
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC)));

		TokenIssuer::new(Arc::new(SigningAuthority::new(KeyRing::new(key))), Default::default(), clock)
	}

	fn principal() -> Principal {
		Principal::new(
			PrincipalId::new("p-1").expect("Principal fixture should be valid."),
			RoleSet::new(["user"]).expect("Role fixture should be valid."),
		)
	}

	#[test]
	fn pair_shares_family_with_independent_ids() {
		let pair = issuer().issue_pair(&principal()).expect("Issuance should succeed.");

		assert_eq!(pair.access_claims.family_id, pair.refresh_claims.family_id);
		assert_ne!(pair.access_claims.token_id, pair.refresh_claims.token_id);
		assert_eq!(pair.access_claims.kind, TokenKind::Access);
		assert_eq!(pair.refresh_claims.kind, TokenKind::Refresh);
		assert_eq!(pair.access_expires_in(), 15 * 60);
		assert_eq!(
			pair.refresh_claims.expires_at,
			macros::datetime!(2025-01-08 00:00 UTC),
		);
	}

	#[test]
	fn each_login_starts_a_new_family() {
		let issuer = issuer();
		let first = issuer.issue_pair(&principal()).expect("Issuance should succeed.");
		let second = issuer.issue_pair(&principal()).expect("Issuance should succeed.");

		assert_ne!(first.family_id(), second.family_id());
	}

	#[test]
	fn continued_family_keeps_identity_and_roles() {
		let issuer = issuer();
		let first = issuer.issue_pair(&principal()).expect("Issuance should succeed.");
		let next = issuer
			.issue_in_family(
				&first.refresh_claims.principal,
				&first.refresh_claims.roles,
				first.family_id().clone(),
			)
			.expect("Issuance should succeed.");

		assert_eq!(next.family_id(), first.family_id());
		assert_eq!(next.access_claims.roles, first.access_claims.roles);
		assert_ne!(next.refresh_claims.token_id, first.refresh_claims.token_id);
	}
}
