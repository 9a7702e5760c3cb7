//! Refresh token rotation with per-family singleflight guards, CAS marking, and reuse detection.
//!
//! [`CredentialManager::refresh`] verifies the presented refresh token, serializes work
//! on its family, and asks the revocation store to mark the token as rotated in one
//! compare-and-set. Only the caller that wins the mark receives a new pair; a token
//! that was already rotated is treated as stolen and its whole family is revoked.

mod metrics;

pub use metrics::{RotationMetrics, RotationSnapshot};

// self
use crate::{
	_prelude::*,
	auth::{RevocationEntry, RevocationReason, RevocationTarget, TokenClaims, TokenKind, TokenPair},
	flows::{CredentialManager, common::{self, FlowGuard}},
	obs::{self, FlowKind, SecurityEvent},
	store::MarkOutcome,
};

impl CredentialManager {
	/// Exchanges a refresh token for a new pair in the same family.
	///
	/// Two concurrent calls with the same token yield exactly one pair and one
	/// [`Error::ReuseDetected`]; after that every token of the family is revoked.
	pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
		common::observe(FlowKind::Refresh, "refresh", async move {
			self.rotation_metrics.record_attempt();

			let result = self.rotate(refresh_token).await;

			self.rotation_metrics.record_result(&result);

			result
		})
		.await
	}

	async fn rotate(&self, refresh_token: &str) -> Result<TokenPair> {
		let claims = self.verifier().verify_unrevoked(refresh_token, TokenKind::Refresh)?;
		let guard = FlowGuard::acquire(&self.flow_guards, &claims.family_id);
		let _singleflight = guard.lock().await;

		self.rotate_locked(&claims).await
	}

	// The mark is the only externally visible step; issuance after it never awaits.
	async fn rotate_locked(&self, claims: &TokenClaims) -> Result<TokenPair> {
		let now = self.now();
		let retain_until = self.policy.retention_for(claims.expires_at);

		match self.revocations.mark_rotated(claims, now, retain_until).await? {
			MarkOutcome::Marked => self.issuer().issue_in_family(
				&claims.principal,
				&claims.roles,
				claims.family_id.clone(),
			),
			MarkOutcome::AlreadyRotated => {
				self.revoke_family_for_reuse(claims, now).await?;

				Err(Error::ReuseDetected)
			},
			MarkOutcome::Revoked { reason } => Err(Error::Revoked { reason }),
		}
	}

	async fn revoke_family_for_reuse(&self, claims: &TokenClaims, now: OffsetDateTime) -> Result<()> {
		// Later members of the family may outlive the replayed token.
		let expires_at =
			self.policy.retention_for(claims.expires_at).max(self.policy.session_retention(now));

		self.revocations
			.revoke(RevocationEntry::new(
				RevocationTarget::Family(claims.family_id.clone()),
				RevocationReason::ReuseDetected,
				now,
				expires_at,
			))
			.await?;
		self.rotation_metrics.record_reuse();
		obs::record_security_event(SecurityEvent::ReuseDetected, &claims.family_id);

		Ok(())
	}
}
