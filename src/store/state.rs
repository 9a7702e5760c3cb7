//! Unsynchronized state shared by the built-in stores; callers hold the lock.

// self
use crate::{
	_prelude::*,
	auth::{
		FamilyId, PrincipalId, ResetSecret, ResetStatus, RevocationEntry, RevocationReason,
		RevocationTarget, TokenClaims, TokenId,
	},
	store::{MarkOutcome, RedeemOutcome, RevokeOutcome},
};

#[derive(Clone, Debug, Default)]
pub(crate) struct StoreState {
	revocations: HashMap<RevocationTarget, RevocationEntry>,
	reset_secrets: HashMap<PrincipalId, ResetSecret>,
}
impl StoreState {
	pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
		let mut state = Self::default();

		for entry in snapshot.revocations {
			state.revoke_now(entry);
		}
		for record in snapshot.reset_secrets {
			state.reset_secrets.insert(record.principal.clone(), record);
		}

		state
	}

	pub(crate) fn snapshot(&self) -> Snapshot {
		Snapshot {
			revocations: self.revocations.values().cloned().collect(),
			reset_secrets: self.reset_secrets.values().cloned().collect(),
		}
	}

	pub(crate) fn revoke_now(&mut self, entry: RevocationEntry) -> RevokeOutcome {
		match self.revocations.get_mut(&entry.target) {
			Some(existing) =>
				if existing.absorb(&entry) {
					RevokeOutcome::Upgraded
				} else {
					RevokeOutcome::Unchanged
				},
			None => {
				self.revocations.insert(entry.target.clone(), entry);

				RevokeOutcome::Inserted
			},
		}
	}

	pub(crate) fn lookup_now(&self, claims: &TokenClaims) -> Option<RevocationEntry> {
		[
			RevocationTarget::Token(claims.token_id.clone()),
			RevocationTarget::Family(claims.family_id.clone()),
			RevocationTarget::Principal(claims.principal.clone()),
		]
		.iter()
		.filter_map(|target| self.revocations.get(target))
		.filter(|entry| entry.covers(claims))
		.max_by_key(|entry| entry.reason)
		.cloned()
	}

	pub(crate) fn is_revoked_now(&self, token_id: &TokenId, family_id: &FamilyId) -> bool {
		self.revocations.contains_key(&RevocationTarget::Token(token_id.clone()))
			|| self.revocations.contains_key(&RevocationTarget::Family(family_id.clone()))
	}

	pub(crate) fn mark_rotated_now(
		&mut self,
		claims: &TokenClaims,
		at: OffsetDateTime,
		retain_until: OffsetDateTime,
	) -> MarkOutcome {
		let token = RevocationTarget::Token(claims.token_id.clone());

		// A replayed token stays a replay even after its family was revoked for it.
		if self.revocations.get(&token).map(|entry| entry.reason) == Some(RevocationReason::Rotated) {
			return MarkOutcome::AlreadyRotated;
		}

		let covering = [
			token.clone(),
			RevocationTarget::Family(claims.family_id.clone()),
			RevocationTarget::Principal(claims.principal.clone()),
		]
		.iter()
		.filter_map(|target| self.revocations.get(target))
		.filter(|entry| entry.covers(claims))
		.map(|entry| entry.reason)
		.max();

		if let Some(reason) = covering {
			return MarkOutcome::Revoked { reason };
		}

		self.revocations.insert(
			token.clone(),
			RevocationEntry::new(token, RevocationReason::Rotated, at, retain_until),
		);

		MarkOutcome::Marked
	}

	pub(crate) fn prune_revocations_now(&mut self, now: OffsetDateTime) -> usize {
		let before = self.revocations.len();

		self.revocations.retain(|_, entry| !entry.is_prunable_at(now));

		before - self.revocations.len()
	}

	pub(crate) fn issue_now(&mut self, record: ResetSecret) -> Option<ResetSecret> {
		self.reset_secrets.insert(record.principal.clone(), record)
	}

	pub(crate) fn redeem_now(
		&mut self,
		principal: &PrincipalId,
		secret_hash: &str,
		now: OffsetDateTime,
	) -> RedeemOutcome {
		let Some(record) = self.reset_secrets.get_mut(principal) else {
			return RedeemOutcome::Missing;
		};

		match record.status_at(now) {
			ResetStatus::Consumed => RedeemOutcome::Consumed,
			ResetStatus::Expired => {
				self.reset_secrets.remove(principal);

				RedeemOutcome::Expired
			},
			ResetStatus::Issued if record.secret_hash != secret_hash => RedeemOutcome::Mismatch,
			ResetStatus::Issued => {
				record.consumed = true;

				RedeemOutcome::Redeemed
			},
		}
	}

	pub(crate) fn discard_now(&mut self, principal: &PrincipalId, secret_hash: &str) -> bool {
		let matches =
			self.reset_secrets.get(principal).is_some_and(|record| record.secret_hash == secret_hash);

		if matches {
			self.reset_secrets.remove(principal);
		}

		matches
	}

	pub(crate) fn prune_reset_secrets_now(&mut self, now: OffsetDateTime) -> usize {
		let before = self.reset_secrets.len();

		self.reset_secrets.retain(|_, record| matches!(record.status_at(now), ResetStatus::Issued));

		before - self.reset_secrets.len()
	}
}

/// Serialized form persisted by [`crate::store::FileStore`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
	#[serde(default)]
	pub(crate) revocations: Vec<RevocationEntry>,
	#[serde(default)]
	pub(crate) reset_secrets: Vec<ResetSecret>,
}
