//! Thread-safe in-memory store for local development, tests, and single-process services.

// self
use crate::{
	_prelude::*,
	auth::{FamilyId, PrincipalId, ResetSecret, RevocationEntry, TokenClaims, TokenId},
	store::{
		MarkOutcome, RedeemOutcome, ResetSecretStore, RevocationStore, RevokeOutcome, StoreFuture,
		state::StoreState,
	},
};

type StoreMap = Arc<RwLock<StoreState>>;

/// Keeps revocations and reset secrets in-process behind a single reader-writer lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn revoke_now(map: StoreMap, entry: RevocationEntry) -> RevokeOutcome {
		map.write().revoke_now(entry)
	}

	fn mark_rotated_now(
		map: StoreMap,
		claims: &TokenClaims,
		at: OffsetDateTime,
		retain_until: OffsetDateTime,
	) -> MarkOutcome {
		map.write().mark_rotated_now(claims, at, retain_until)
	}

	fn redeem_now(
		map: StoreMap,
		principal: &PrincipalId,
		secret_hash: &str,
		now: OffsetDateTime,
	) -> RedeemOutcome {
		map.write().redeem_now(principal, secret_hash, now)
	}
}
impl RevocationStore for MemoryStore {
	fn revoke(&self, entry: RevocationEntry) -> StoreFuture<'_, RevokeOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::revoke_now(map, entry)) })
	}

	fn lookup<'a>(&'a self, claims: &'a TokenClaims) -> StoreFuture<'a, Option<RevocationEntry>> {
		Box::pin(async move { Ok(self.0.read().lookup_now(claims)) })
	}

	fn is_revoked<'a>(
		&'a self,
		token_id: &'a TokenId,
		family_id: &'a FamilyId,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.0.read().is_revoked_now(token_id, family_id)) })
	}

	fn mark_rotated<'a>(
		&'a self,
		claims: &'a TokenClaims,
		at: OffsetDateTime,
		retain_until: OffsetDateTime,
	) -> StoreFuture<'a, MarkOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::mark_rotated_now(map, claims, at, retain_until)) })
	}

	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { Ok(self.0.write().prune_revocations_now(now)) })
	}
}
impl ResetSecretStore for MemoryStore {
	fn issue(&self, record: ResetSecret) -> StoreFuture<'_, Option<ResetSecret>> {
		Box::pin(async move { Ok(self.0.write().issue_now(record)) })
	}

	fn redeem<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, RedeemOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::redeem_now(map, principal, secret_hash, now)) })
	}

	fn discard<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.0.write().discard_now(principal, secret_hash)) })
	}

	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { Ok(self.0.write().prune_reset_secrets_now(now)) })
	}
}
