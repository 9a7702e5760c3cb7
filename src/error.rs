//! Crate-level error types shared across flows, signing, and stores.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, PrincipalId, RevocationReason, RoleSet, RoleValidationError, TokenKind},
	identity::IdentityError,
	signing::SignatureError,
	store::StoreError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant except [`Error::BackendUnavailable`], [`Error::Config`],
/// [`Error::Encoding`], and [`Error::Delivery`] is an expected, user-facing outcome.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Revocation/reset storage or the identity store could not be reached. Callers must fail
	/// closed.
	#[error("{0}")]
	BackendUnavailable(
		#[from]
		#[source]
		StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Claims could not be encoded while signing.
	#[error("Token claims could not be encoded.")]
	Encoding(#[source] serde_json::Error),
	/// The reset notifier failed to deliver the secret; the secret was discarded.
	#[error("Reset secret could not be delivered.")]
	Delivery(#[source] BoxError),

	/// Token string is structurally invalid.
	#[error("Token is malformed: {reason}.")]
	MalformedToken {
		/// What failed to parse.
		reason: String,
	},
	/// Token signature does not verify under any accepted key.
	#[error("Token signature is invalid.")]
	BadSignature {
		/// Signature-level failure detail.
		#[source]
		source: SignatureError,
	},
	/// A refresh token was presented where an access token was expected, or vice versa.
	#[error("Expected a {expected} token but received a {actual} token.")]
	WrongTokenKind {
		/// Kind the caller asked for.
		expected: TokenKind,
		/// Kind embedded in the token.
		actual: TokenKind,
	},
	/// Token issued-at lies beyond the tolerated clock skew.
	#[error("Token is not valid yet.")]
	NotYetValid,
	/// Token reached its expiry instant.
	#[error("Token has expired.")]
	Expired,
	/// Token, its family, or its principal has been revoked.
	#[error("Token has been revoked ({reason}).")]
	Revoked {
		/// Most severe recorded reason.
		reason: RevocationReason,
	},
	/// An already-rotated refresh token was replayed; the whole family is now revoked.
	#[error("Refresh token reuse detected; the session family has been revoked.")]
	ReuseDetected,
	/// Reset secret is unknown, already redeemed, superseded, or expired.
	#[error("Reset secret is invalid or has expired.")]
	InvalidOrExpiredSecret,
	/// Presented password does not match the stored credential.
	#[error("Principal or password is incorrect.")]
	InvalidCredentials,
	/// Identity store does not know the principal.
	#[error("Principal {principal} is unknown.")]
	UnknownPrincipal {
		/// Principal that was looked up.
		principal: PrincipalId,
	},
	/// Verified claims carry none of the required roles.
	#[error("Access denied; one of the roles [{required}] is required.")]
	Forbidden {
		/// Roles the caller needed at least one of.
		required: RoleSet,
	},
}
impl Error {
	/// How the client should react to this failure.
	pub fn remedy(&self) -> Remedy {
		match self {
			Self::MalformedToken { .. }
			| Self::BadSignature { .. }
			| Self::NotYetValid
			| Self::Expired
			| Self::Revoked { .. }
			| Self::ReuseDetected => Remedy::Reauthenticate,
			Self::WrongTokenKind { .. } | Self::Forbidden { .. } => Remedy::Deny,
			Self::InvalidOrExpiredSecret
			| Self::InvalidCredentials
			| Self::UnknownPrincipal { .. } => Remedy::Reject,
			Self::BackendUnavailable(_) | Self::Config(_) | Self::Encoding(_) | Self::Delivery(_) =>
				Remedy::RetryLater,
		}
	}

	/// HTTP-style status code hint for the transport layer.
	pub fn status_hint(&self) -> u16 {
		match self {
			Self::WrongTokenKind { .. } | Self::Forbidden { .. } => 403,
			Self::InvalidOrExpiredSecret => 400,
			Self::UnknownPrincipal { .. } => 404,
			Self::BackendUnavailable(_) | Self::Delivery(_) => 503,
			Self::Config(_) | Self::Encoding(_) => 500,
			_ => 401,
		}
	}

	/// Returns `true` if the client's session is over and it should log in again.
	pub fn is_session_expired(&self) -> bool {
		matches!(self.remedy(), Remedy::Reauthenticate)
	}
}
impl From<SignatureError> for Error {
	fn from(e: SignatureError) -> Self {
		match e {
			SignatureError::Malformed { reason } => Self::MalformedToken { reason },
			SignatureError::Encode(source) => Self::Encoding(source),
			source => Self::BadSignature { source },
		}
	}
}
impl From<IdentityError> for Error {
	fn from(e: IdentityError) -> Self {
		match e {
			IdentityError::UnknownPrincipal { principal } => Self::UnknownPrincipal { principal },
			IdentityError::Unavailable { message } =>
				Self::BackendUnavailable(StoreError::Backend { message }),
		}
	}
}

/// Client-facing remediation class for an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remedy {
	/// Session is over; log in again.
	Reauthenticate,
	/// Request is not permitted; retrying will not help.
	Deny,
	/// Submitted form data is wrong (secret, password, principal).
	Reject,
	/// Operational failure; retry later. Access must not be granted meanwhile.
	RetryLater,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A TTL must be strictly positive.
	#[error("The {field} must be positive.")]
	NonPositiveTtl {
		/// Offending field.
		field: &'static str,
	},
	/// A TTL exceeds the supported maximum.
	#[error("The {field} exceeds the maximum of {max}.")]
	TtlTooLong {
		/// Offending field.
		field: &'static str,
		/// Largest accepted value.
		max: Duration,
	},
	/// Refresh tokens must outlive access tokens.
	#[error("The refresh token TTL must exceed the access token TTL.")]
	RefreshNotLongerThanAccess,
	/// Clock skew tolerance cannot be negative.
	#[error("The clock skew tolerance cannot be negative.")]
	NegativeSkew,
	/// Clock skew tolerance exceeds the supported maximum.
	#[error("The clock skew tolerance exceeds the maximum of {max}.")]
	SkewTooLarge {
		/// Largest accepted value.
		max: Duration,
	},
	/// Signing key material is too short.
	#[error("Signing key `{key_id}` has {actual} bytes; at least {min} are required.")]
	WeakKey {
		/// Key identifier.
		key_id: String,
		/// Supplied length.
		actual: usize,
		/// Minimum length.
		min: usize,
	},
	/// Two keys in the ring share an identifier.
	#[error("Signing key id `{key_id}` appears more than once.")]
	DuplicateKeyId {
		/// Repeated identifier.
		key_id: String,
	},
	/// Key material is not valid base64url.
	#[error("Signing key `{key_id}` is not valid base64url.")]
	KeyEncoding {
		/// Key identifier.
		key_id: String,
		/// Decoder failure.
		#[source]
		source: base64::DecodeError,
	},
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Role names failed validation.
	#[error(transparent)]
	InvalidRoles(#[from] RoleValidationError),
	/// Configuration document could not be parsed.
	#[error("Configuration document is invalid.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::BackendUnavailable(_)));
		assert!(error.to_string().contains("database unreachable"));
		assert_eq!(error.remedy(), Remedy::RetryLater);
		assert_eq!(error.status_hint(), 503);

		let source = StdError::source(&error)
			.expect("Error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn session_and_access_failures_stay_distinct() {
		assert!(Error::Expired.is_session_expired());
		assert!(Error::ReuseDetected.is_session_expired());
		assert!(Error::Revoked { reason: RevocationReason::Logout }.is_session_expired());

		let wrong_kind =
			Error::WrongTokenKind { expected: TokenKind::Access, actual: TokenKind::Refresh };

		assert!(!wrong_kind.is_session_expired());
		assert_eq!(wrong_kind.remedy(), Remedy::Deny);
		assert_eq!(wrong_kind.status_hint(), 403);
		assert_eq!(Error::Expired.status_hint(), 401);
	}

	#[test]
	fn signature_errors_split_malformed_from_forged() {
		let malformed: Error = SignatureError::Malformed { reason: "two segments".into() }.into();
		let forged: Error = SignatureError::Mismatch.into();

		assert!(matches!(malformed, Error::MalformedToken { .. }));
		assert!(matches!(forged, Error::BadSignature { source: SignatureError::Mismatch }));
	}

	#[test]
	fn identity_errors_pass_through() {
		let principal = PrincipalId::new("ghost").expect("Principal fixture should be valid.");
		let error: Error = IdentityError::UnknownPrincipal { principal: principal.clone() }.into();

		assert!(matches!(error, Error::UnknownPrincipal { principal: p } if p == principal));

		let down: Error = IdentityError::Unavailable { message: "timeout".into() }.into();

		assert!(matches!(down, Error::BackendUnavailable(StoreError::Backend { .. })));
	}
}
