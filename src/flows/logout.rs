//! Logout, administrative revocation, and pruning.

// self
use crate::{
	_prelude::*,
	auth::{
		FamilyId, PrincipalId, RevocationEntry, RevocationReason, RevocationTarget, TokenClaims,
		TokenId,
	},
	flows::{CredentialManager, common},
	obs::{self, FlowKind, SecurityEvent},
	store::{ResetSecretStore, RevocationStore, RevokeOutcome},
};

/// Counts of entries removed by [`CredentialManager::prune`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
	/// Revocation entries past their copied expiry.
	pub revocations: usize,
	/// Consumed or expired reset secrets.
	pub reset_secrets: usize,
}

impl CredentialManager {
	/// Ends the session the token belongs to by revoking its whole family.
	///
	/// Only the signature is checked: an expired access token still identifies a
	/// family whose refresh token may be live, and either kind may be presented.
	pub async fn logout(&self, token: &str) -> Result<TokenClaims> {
		common::observe(FlowKind::Logout, "logout", async move {
			let claims = self.signing_authority().open_and_verify_signature(token)?;

			self.revoke_family(&claims.family_id, RevocationReason::Logout).await?;

			Ok(claims)
		})
		.await
	}

	/// Revokes every token of `family`, old and future.
	pub async fn revoke_family(
		&self,
		family: &FamilyId,
		reason: RevocationReason,
	) -> Result<RevokeOutcome> {
		let now = self.now();
		let outcome = self
			.revocations
			.revoke(RevocationEntry::new(
				RevocationTarget::Family(family.clone()),
				reason,
				now,
				self.policy.session_retention(now),
			))
			.await?;

		obs::record_security_event(SecurityEvent::FamilyRevoked, family);

		Ok(outcome)
	}

	/// Revokes a single token whose claims expire at `expires_at`.
	///
	/// The entry is kept through the clock skew window that follows the expiry.
	pub async fn revoke_token(
		&self,
		token: &TokenId,
		reason: RevocationReason,
		expires_at: OffsetDateTime,
	) -> Result<RevokeOutcome> {
		let now = self.now();
		let entry = RevocationEntry::new(
			RevocationTarget::Token(token.clone()),
			reason,
			now,
			self.policy.retention_for(expires_at),
		);

		Ok(self.revocations.revoke(entry).await?)
	}

	/// Revokes every token of `principal` issued before now, across all families.
	pub async fn revoke_principal(
		&self,
		principal: &PrincipalId,
		reason: RevocationReason,
	) -> Result<RevokeOutcome> {
		let now = self.now();

		Ok(self
			.revocations
			.revoke(RevocationEntry::new(
				RevocationTarget::Principal(principal.clone()),
				reason,
				now,
				self.policy.session_retention(now),
			))
			.await?)
	}

	/// Drops expired revocation entries and spent reset secrets.
	pub async fn prune(&self) -> Result<PruneReport> {
		let now = self.now();
		let revocations = RevocationStore::prune(self.revocations.as_ref(), now).await?;
		let reset_secrets = ResetSecretStore::prune(self.reset_secrets.as_ref(), now).await?;

		Ok(PruneReport { revocations, reset_secrets })
	}
}
