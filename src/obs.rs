//! Optional observability helpers for lifecycle flows.
//!
//! # Feature Flags
//!
//! - `tracing` wraps every manager operation in a `credential_lifecycle.flow` span carrying
//!   `flow`, `stage`, and `outcome` fields, and logs security events at `warn`/`info`.
//! - `metrics` increments [`FLOW_COUNTER`] per attempt and outcome and
//!   [`SECURITY_EVENT_COUNTER`] per audited event.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Manager operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Pair issuance after an external or password credential check.
	Login,
	/// Access token verification.
	Authenticate,
	/// Refresh token rotation.
	Refresh,
	/// Session or administrative revocation.
	Logout,
	/// Reset secret issuance.
	ForgotPassword,
	/// Reset secret redemption.
	ResetPassword,
	/// Authenticated credential change.
	ChangePassword,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Authenticate => "authenticate",
			FlowKind::Refresh => "refresh",
			FlowKind::Logout => "logout",
			FlowKind::ForgotPassword => "forgot_password",
			FlowKind::ResetPassword => "reset_password",
			FlowKind::ChangePassword => "change_password",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a manager operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Security-relevant state changes worth an audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityEvent {
	/// A rotated refresh token was replayed and its family revoked.
	ReuseDetected,
	/// A family was revoked by logout or an operator.
	FamilyRevoked,
	/// A principal's credential was replaced and prior sessions cut off.
	CredentialReplaced,
	/// An undeliverable reset secret was discarded.
	ResetSecretDiscarded,
}
impl SecurityEvent {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SecurityEvent::ReuseDetected => "reuse_detected",
			SecurityEvent::FamilyRevoked => "family_revoked",
			SecurityEvent::CredentialReplaced => "credential_replaced",
			SecurityEvent::ResetSecretDiscarded => "reset_secret_discarded",
		}
	}
}
impl Display for SecurityEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
