//! Revocation entries keyed by token, family, or principal.

// self
use crate::{
	_prelude::*,
	auth::{FamilyId, PrincipalId, TokenClaims, TokenId},
};

/// Why an identifier was revoked, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevocationReason {
	/// Refresh token was exchanged for a newer pair.
	Rotated,
	/// Holder ended the session.
	Logout,
	/// Operator action.
	Administrative,
	/// Principal's credential was reset or changed.
	PasswordReset,
	/// An already-rotated refresh token was replayed.
	ReuseDetected,
}
impl RevocationReason {
	/// Returns a stable label suitable for span fields and messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			RevocationReason::Rotated => "rotated",
			RevocationReason::Logout => "logout",
			RevocationReason::Administrative => "administrative",
			RevocationReason::PasswordReset => "password-reset",
			RevocationReason::ReuseDetected => "reuse-detected",
		}
	}
}
impl Display for RevocationReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Identity a revocation entry applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RevocationTarget {
	/// A single issuance.
	Token(TokenId),
	/// Every token sharing the family.
	Family(FamilyId),
	/// Every token of the principal issued strictly before the entry's `revoked_at`.
	Principal(PrincipalId),
}
impl Display for RevocationTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Token(id) => write!(f, "token:{id}"),
			Self::Family(id) => write!(f, "family:{id}"),
			Self::Principal(id) => write!(f, "principal:{id}"),
		}
	}
}

/// Record stating that a target must no longer be accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
	/// Revoked identity.
	pub target: RevocationTarget,
	/// Most severe reason recorded so far.
	pub reason: RevocationReason,
	/// Instant of the (most severe) revocation.
	pub revoked_at: OffsetDateTime,
	/// Instant after which every covered token has expired and the entry may be pruned.
	pub expires_at: OffsetDateTime,
}
impl RevocationEntry {
	/// Creates an entry.
	pub fn new(
		target: RevocationTarget,
		reason: RevocationReason,
		revoked_at: OffsetDateTime,
		expires_at: OffsetDateTime,
	) -> Self {
		Self { target, reason, revoked_at, expires_at }
	}

	/// Returns `true` once the copied expiry has passed.
	pub fn is_prunable_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the entry applies to the provided claims.
	pub fn covers(&self, claims: &TokenClaims) -> bool {
		match &self.target {
			RevocationTarget::Token(id) => *id == claims.token_id,
			RevocationTarget::Family(id) => *id == claims.family_id,
			RevocationTarget::Principal(id) =>
				*id == claims.principal && claims.issued_at < self.revoked_at,
		}
	}

	/// Folds a repeated revocation into this entry.
	///
	/// Only a strictly more severe reason replaces `reason` (and `revoked_at` for token and
	/// family targets). A principal cut-off only moves forward, and the expiry only ever grows.
	/// Returns `true` if anything changed.
	pub fn absorb(&mut self, other: &RevocationEntry) -> bool {
		let is_cutoff = matches!(self.target, RevocationTarget::Principal(_));
		let mut changed = false;

		if other.reason > self.reason {
			self.reason = other.reason;

			if !is_cutoff {
				self.revoked_at = other.revoked_at;
			}

			changed = true;
		}
		if is_cutoff && other.revoked_at > self.revoked_at {
			self.revoked_at = other.revoked_at;
			changed = true;
		}
		if other.expires_at > self.expires_at {
			self.expires_at = other.expires_at;
			changed = true;
		}

		changed
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::{RoleSet, TokenKind};

	fn claims_issued_at(issued_at: OffsetDateTime) -> TokenClaims {
		TokenClaims {
			principal: PrincipalId::new("p-1").expect("Principal fixture should be valid."),
			roles: RoleSet::default(),
			token_id: TokenId::new("tok-1").expect("Token fixture should be valid."),
			family_id: FamilyId::new("fam-1").expect("Family fixture should be valid."),
			issued_at,
			expires_at: issued_at + Duration::days(7),
			kind: TokenKind::Refresh,
		}
	}

	#[test]
	fn severity_orders_reasons() {
		assert!(RevocationReason::Rotated < RevocationReason::Logout);
		assert!(RevocationReason::Logout < RevocationReason::Administrative);
		assert!(RevocationReason::PasswordReset < RevocationReason::ReuseDetected);
	}

	#[test]
	fn absorb_only_upgrades() {
		let at = macros::datetime!(2025-01-01 00:00 UTC);
		let target = RevocationTarget::Family(FamilyId::new("fam-1").expect("Valid family."));
		let mut entry =
			RevocationEntry::new(target.clone(), RevocationReason::Logout, at, at + Duration::days(1));
		let weaker = RevocationEntry::new(
			target.clone(),
			RevocationReason::Rotated,
			at + Duration::hours(1),
			at + Duration::days(1),
		);

		assert!(!entry.absorb(&weaker));
		assert_eq!(entry.reason, RevocationReason::Logout);
		assert_eq!(entry.revoked_at, at);

		let stronger = RevocationEntry::new(
			target,
			RevocationReason::ReuseDetected,
			at + Duration::hours(2),
			at + Duration::days(1),
		);

		assert!(entry.absorb(&stronger));
		assert_eq!(entry.reason, RevocationReason::ReuseDetected);
		assert_eq!(entry.revoked_at, at + Duration::hours(2));
	}

	#[test]
	fn principal_cutoff_covers_only_older_tokens() {
		let cutoff = macros::datetime!(2025-01-01 12:00 UTC);
		let entry = RevocationEntry::new(
			RevocationTarget::Principal(PrincipalId::new("p-1").expect("Valid principal.")),
			RevocationReason::PasswordReset,
			cutoff,
			cutoff + Duration::days(7),
		);

		assert!(entry.covers(&claims_issued_at(cutoff - Duration::minutes(5))));
		assert!(!entry.covers(&claims_issued_at(cutoff)));
		assert!(!entry.covers(&claims_issued_at(cutoff + Duration::seconds(1))));
	}

	#[test]
	fn repeated_cutoff_moves_forward() {
		let first = macros::datetime!(2025-01-01 12:00 UTC);
		let target = RevocationTarget::Principal(PrincipalId::new("p-1").expect("Valid principal."));
		let mut entry = RevocationEntry::new(
			target.clone(),
			RevocationReason::PasswordReset,
			first,
			first + Duration::days(7),
		);
		let second = first + Duration::hours(3);

		assert!(entry.absorb(&RevocationEntry::new(
			target,
			RevocationReason::PasswordReset,
			second,
			second + Duration::days(7),
		)));
		assert_eq!(entry.revoked_at, second);
		assert_eq!(entry.expires_at, second + Duration::days(7));
		assert!(entry.covers(&claims_issued_at(first + Duration::hours(1))));
	}

	#[test]
	fn targets_serialize_tagged() {
		let target = RevocationTarget::Token(TokenId::new("tok-9").expect("Valid token id."));
		let payload = serde_json::to_string(&target).expect("Target should serialize.");

		assert_eq!(payload, "{\"type\":\"token\",\"id\":\"tok-9\"}");
	}
}
