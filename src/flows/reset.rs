//! Password reset and password change flows.
//!
//! A reset secret moves `Issued -> Consumed` or `Issued -> Expired`; issuing a new
//! one replaces the old. Redemption consumes the secret first, then replaces the
//! credential, then cuts off every session the principal held before.

// self
use crate::{
	_prelude::*,
	auth::{
		PrincipalId, ResetSecret, RevocationReason, TokenClaims, TokenPair, TokenSecret,
		digest_secret,
	},
	ext::{ResetDelivery, ResetNotifier},
	flows::{CredentialManager, common},
	obs::{self, FlowKind, SecurityEvent},
};

impl CredentialManager {
	/// Issues a reset secret for a known principal and returns its plaintext exactly once.
	///
	/// Any earlier unconsumed secret for the principal becomes unredeemable.
	pub async fn forgot_password(&self, principal: &PrincipalId) -> Result<TokenSecret> {
		common::observe(FlowKind::ForgotPassword, "forgot_password", async move {
			Ok(self.issue_reset_secret(principal).await?.0)
		})
		.await
	}

	/// Issues a reset secret and hands it to `notifier`.
	///
	/// If delivery fails the stored secret is discarded and [`Error::Delivery`] is returned.
	pub async fn forgot_password_and_notify<N>(
		&self,
		principal: &PrincipalId,
		notifier: &N,
	) -> Result<OffsetDateTime>
	where
		N: ?Sized + ResetNotifier,
	{
		common::observe(FlowKind::ForgotPassword, "forgot_password_and_notify", async move {
			let (secret, record) = self.issue_reset_secret(principal).await?;
			let delivery =
				ResetDelivery { principal: principal.clone(), secret, expires_at: record.expires_at };

			match notifier.deliver(delivery).await {
				Ok(()) => Ok(record.expires_at),
				Err(e) => {
					self.reset_secrets.discard(principal, &record.secret_hash).await?;
					obs::record_security_event(SecurityEvent::ResetSecretDiscarded, principal);

					Err(Error::Delivery(Box::new(e)))
				},
			}
		})
		.await
	}

	/// Redeems `presented` once and replaces the principal's credential.
	///
	/// Unknown, superseded, consumed, and expired secrets all yield
	/// [`Error::InvalidOrExpiredSecret`]. On success every token the principal held is
	/// revoked.
	pub async fn reset_password(
		&self,
		principal: &PrincipalId,
		presented: &str,
		new_credential: &str,
	) -> Result<()> {
		common::observe(FlowKind::ResetPassword, "reset_password", async move {
			let credential_hash = self.hasher.hash(new_credential)?;
			let outcome =
				self.reset_secrets.redeem(principal, &digest_secret(presented), self.now()).await?;

			if !outcome.is_redeemed() {
				return Err(Error::InvalidOrExpiredSecret);
			}

			self.replace_credential(principal, credential_hash).await
		})
		.await
	}

	/// Changes the password of the principal behind verified `claims`.
	///
	/// Prior sessions are cut off and a pair in a fresh family is returned so the
	/// caller stays logged in.
	pub async fn change_password(
		&self,
		claims: &TokenClaims,
		current: &str,
		new_credential: &str,
	) -> Result<TokenPair> {
		common::observe(FlowKind::ChangePassword, "change_password", async move {
			let stored = self.identity.credential_hash(&claims.principal).await?;

			if !self.hasher.verify(current, &stored) {
				return Err(Error::InvalidCredentials);
			}

			let credential_hash = self.hasher.hash(new_credential)?;

			self.replace_credential(&claims.principal, credential_hash).await?;

			let principal = self.identity.fetch_principal(&claims.principal).await?;

			self.issuer().issue_pair(&principal)
		})
		.await
	}

	async fn issue_reset_secret(
		&self,
		principal: &PrincipalId,
	) -> Result<(TokenSecret, ResetSecret)> {
		self.identity.fetch_principal(principal).await?;

		let (secret, record) =
			ResetSecret::issue(principal.clone(), self.now(), self.policy.reset_secret_ttl);

		self.reset_secrets.issue(record.clone()).await?;

		Ok((secret, record))
	}

	async fn replace_credential(
		&self,
		principal: &PrincipalId,
		credential_hash: String,
	) -> Result<()> {
		self.identity.replace_credential(principal, credential_hash).await?;
		self.revoke_principal(principal, RevocationReason::PasswordReset).await?;
		obs::record_security_event(SecurityEvent::CredentialReplaced, principal);

		Ok(())
	}
}
