//! Storage contracts and built-in store implementations for revocations and reset secrets.

pub mod file;
pub mod memory;

mod state;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{
		FamilyId, PrincipalId, ResetSecret, RevocationEntry, RevocationReason, TokenClaims, TokenId,
	},
};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Revocation list shared by every verifier and rotator.
///
/// Implementations must make a completed write visible to every later read and must
/// never let reads block each other.
pub trait RevocationStore
where
	Self: Send + Sync,
{
	/// Records `entry`, folding it into an existing entry for the same target.
	fn revoke(&self, entry: RevocationEntry) -> StoreFuture<'_, RevokeOutcome>;

	/// Returns the most severe entry covering `claims` (token, family, or principal cut-off).
	fn lookup<'a>(&'a self, claims: &'a TokenClaims) -> StoreFuture<'a, Option<RevocationEntry>>;

	/// Returns `true` if either the token or its family has an entry.
	fn is_revoked<'a>(
		&'a self,
		token_id: &'a TokenId,
		family_id: &'a FamilyId,
	) -> StoreFuture<'a, bool>;

	/// Atomically marks the refresh token behind `claims` as rotated, unless it was
	/// already rotated or something covering it is revoked.
	///
	/// An existing rotation mark wins over any covering revocation. A new mark is kept
	/// until `retain_until`, which must not precede the last instant the token verifies.
	fn mark_rotated<'a>(
		&'a self,
		claims: &'a TokenClaims,
		at: OffsetDateTime,
		retain_until: OffsetDateTime,
	) -> StoreFuture<'a, MarkOutcome>;

	/// Drops entries whose copied expiry has passed; returns how many were removed.
	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Slot holding at most one unconsumed reset secret per principal.
pub trait ResetSecretStore
where
	Self: Send + Sync,
{
	/// Stores `record`, returning the record it replaced.
	fn issue(&self, record: ResetSecret) -> StoreFuture<'_, Option<ResetSecret>>;

	/// Consumes the principal's secret if `secret_hash` matches and it is still redeemable.
	fn redeem<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, RedeemOutcome>;

	/// Removes the principal's secret only if it still carries `secret_hash`.
	fn discard<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
	) -> StoreFuture<'a, bool>;

	/// Drops consumed and expired secrets; returns how many were removed.
	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Result of [`RevocationStore::revoke`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevokeOutcome {
	/// No entry existed for the target.
	Inserted,
	/// The existing entry became more severe or longer lived.
	Upgraded,
	/// Nothing observable changed.
	Unchanged,
}

/// Result of the rotation compare-and-set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
	/// The token was live and is now recorded as rotated.
	Marked,
	/// The token had already been rotated; presenting it again is reuse.
	AlreadyRotated,
	/// The token, its family, or its principal is revoked for another reason.
	Revoked {
		/// Most severe covering reason.
		reason: RevocationReason,
	},
}

/// Result of [`ResetSecretStore::redeem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedeemOutcome {
	/// Secret matched and is now consumed.
	Redeemed,
	/// A secret exists but the presented one does not match (or was superseded).
	Mismatch,
	/// The stored secret expired; it has been destroyed.
	Expired,
	/// The stored secret was already redeemed.
	Consumed,
	/// No secret exists for the principal.
	Missing,
}
impl RedeemOutcome {
	/// Returns `true` only for a successful redemption.
	pub fn is_redeemed(self) -> bool {
		matches!(self, Self::Redeemed)
	}
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_can_be_serialized() {
		let payload = serde_json::to_string(&MarkOutcome::Revoked { reason: RevocationReason::Logout })
			.expect("MarkOutcome should serialize to JSON.");

		assert_eq!(payload, "{\"Revoked\":{\"reason\":\"logout\"}}");

		let round_trip: RevokeOutcome = serde_json::from_str("\"Upgraded\"")
			.expect("Serialized outcome should deserialize from JSON.");

		assert_eq!(round_trip, RevokeOutcome::Upgraded);
	}

	#[test]
	fn only_redeemed_counts_as_success() {
		assert!(RedeemOutcome::Redeemed.is_redeemed());

		for outcome in [
			RedeemOutcome::Mismatch,
			RedeemOutcome::Expired,
			RedeemOutcome::Consumed,
			RedeemOutcome::Missing,
		] {
			assert!(!outcome.is_redeemed());
		}
	}
}
