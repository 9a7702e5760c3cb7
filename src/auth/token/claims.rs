//! Immutable token claims and their time-window lifecycle.

// self
use crate::{
	_prelude::*,
	auth::{FamilyId, PrincipalId, RoleSet, TokenId},
};

/// Purpose a signed token was minted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	/// Short-lived bearer credential presented on protected requests.
	Access,
	/// Long-lived credential exchanged for a new pair during rotation.
	Refresh,
}
impl TokenKind {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::Access => "access",
			TokenKind::Refresh => "refresh",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Time-window status of a set of claims (revocation is tracked separately).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is not yet valid because the issued-at instant is in the future.
	Pending,
	/// Token is inside its validity window.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Claims carried by every signed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Principal the token was issued for.
	#[serde(rename = "sub")]
	pub principal: PrincipalId,
	/// Roles snapshotted from the identity store at issuance.
	pub roles: RoleSet,
	/// Identifier unique to this issuance.
	#[serde(rename = "jti")]
	pub token_id: TokenId,
	/// Identifier shared across a refresh chain.
	#[serde(rename = "fam")]
	pub family_id: FamilyId,
	/// Issued-at instant.
	#[serde(rename = "iat", with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
	/// Expiry instant; the token is invalid from this instant on.
	#[serde(rename = "exp", with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// Access or refresh.
	pub kind: TokenKind,
}
impl TokenClaims {
	/// Computes the time-window status at `instant`, widening both edges by `skew`.
	pub fn status_at(&self, instant: OffsetDateTime, skew: Duration) -> TokenStatus {
		if self.issued_at > instant + skew {
			return TokenStatus::Pending;
		}
		if instant >= self.expires_at + skew {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Returns `true` if the claims expired at the provided instant (no skew).
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant, Duration::ZERO), TokenStatus::Expired)
	}

	/// Remaining lifetime at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn claims() -> TokenClaims {
		TokenClaims {
			principal: PrincipalId::new("p-1").expect("Principal fixture should be valid."),
			roles: RoleSet::new(["user"]).expect("Role fixture should be valid."),
			token_id: TokenId::new("tok-1").expect("Token fixture should be valid."),
			family_id: FamilyId::new("fam-1").expect("Family fixture should be valid."),
			issued_at: macros::datetime!(2025-01-01 00:00 UTC),
			expires_at: macros::datetime!(2025-01-01 00:15 UTC),
			kind: TokenKind::Access,
		}
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let claims = claims();

		assert_eq!(
			claims.status_at(macros::datetime!(2024-12-31 23:59 UTC), Duration::ZERO),
			TokenStatus::Pending
		);
		assert_eq!(
			claims.status_at(macros::datetime!(2025-01-01 00:10 UTC), Duration::ZERO),
			TokenStatus::Active
		);
		assert_eq!(
			claims.status_at(macros::datetime!(2025-01-01 00:15 UTC), Duration::ZERO),
			TokenStatus::Expired
		);
		assert_eq!(
			claims.status_at(claims.expires_at - Duration::milliseconds(1), Duration::ZERO),
			TokenStatus::Active
		);
	}

	#[test]
	fn skew_widens_both_edges() {
		let claims = claims();
		let skew = Duration::seconds(30);

		assert_eq!(
			claims.status_at(claims.issued_at - Duration::seconds(20), skew),
			TokenStatus::Active
		);
		assert_eq!(
			claims.status_at(claims.expires_at + Duration::seconds(20), skew),
			TokenStatus::Active
		);
		assert_eq!(claims.status_at(claims.expires_at + skew, skew), TokenStatus::Expired);
	}

	#[test]
	fn wire_names_are_compact() {
		let payload = serde_json::to_value(claims()).expect("Claims should serialize.");

		assert_eq!(payload["sub"], "p-1");
		assert_eq!(payload["jti"], "tok-1");
		assert_eq!(payload["fam"], "fam-1");
		assert_eq!(payload["kind"], "access");
		assert_eq!(payload["iat"], "2025-01-01T00:00:00Z");
	}

	#[test]
	fn remaining_is_clamped() {
		let claims = claims();

		assert_eq!(claims.remaining_at(claims.issued_at), Duration::minutes(15));
		assert_eq!(claims.remaining_at(claims.expires_at + Duration::hours(1)), Duration::ZERO);
	}
}
