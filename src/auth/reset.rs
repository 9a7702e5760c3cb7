//! Single-use password reset secrets (only the digest is ever stored).

// self
use crate::{
	_prelude::*,
	auth::{PrincipalId, TokenSecret},
};

const RESET_SECRET_BYTES: usize = 32;

/// Lifecycle of a stored reset secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetStatus {
	/// Redeemable.
	Issued,
	/// Already redeemed once.
	Consumed,
	/// Expiry passed before redemption.
	Expired,
}

/// Stored half of a reset secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSecret {
	/// Principal allowed to redeem the secret.
	pub principal: PrincipalId,
	/// Digest of the plaintext secret.
	pub secret_hash: String,
	/// Issuance instant.
	pub created_at: OffsetDateTime,
	/// Redemption deadline (exclusive).
	pub expires_at: OffsetDateTime,
	/// Set once the secret has been redeemed.
	pub consumed: bool,
}
impl ResetSecret {
	/// Mints a secret for `principal`, returning the plaintext (hand it out once) and the
	/// storable record.
	pub fn issue(principal: PrincipalId, now: OffsetDateTime, ttl: Duration) -> (TokenSecret, Self) {
		let plaintext = TokenSecret::generate(RESET_SECRET_BYTES);
		let record = Self {
			principal,
			secret_hash: plaintext.digest(),
			created_at: now,
			expires_at: now + ttl,
			consumed: false,
		};

		(plaintext, record)
	}

	/// Lifecycle status at `instant`.
	pub fn status_at(&self, instant: OffsetDateTime) -> ResetStatus {
		if self.consumed {
			return ResetStatus::Consumed;
		}
		if instant >= self.expires_at {
			return ResetStatus::Expired;
		}

		ResetStatus::Issued
	}
}
impl Debug for ResetSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResetSecret")
			.field("principal", &self.principal)
			.field("secret_hash", &"<redacted>")
			.field("created_at", &self.created_at)
			.field("expires_at", &self.expires_at)
			.field("consumed", &self.consumed)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn issue_stores_only_the_digest() {
		let now = macros::datetime!(2025-03-01 09:00 UTC);
		let principal = PrincipalId::new("p-1").expect("Principal fixture should be valid.");
		let (plaintext, record) = ResetSecret::issue(principal, now, Duration::minutes(10));

		assert_eq!(record.secret_hash, plaintext.digest());
		assert_ne!(record.secret_hash, plaintext.expose());
		assert_eq!(record.expires_at, macros::datetime!(2025-03-01 09:10 UTC));
		assert!(!format!("{record:?}").contains(&record.secret_hash));
	}

	#[test]
	fn status_transitions() {
		let now = macros::datetime!(2025-03-01 09:00 UTC);
		let principal = PrincipalId::new("p-1").expect("Principal fixture should be valid.");
		let (_, mut record) = ResetSecret::issue(principal, now, Duration::minutes(10));

		assert_eq!(record.status_at(now), ResetStatus::Issued);
		assert_eq!(record.status_at(now + Duration::minutes(10)), ResetStatus::Expired);

		record.consumed = true;

		assert_eq!(record.status_at(now), ResetStatus::Consumed);
	}
}
