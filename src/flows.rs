//! Lifecycle flows and the [`CredentialManager`] facade the transport layer calls into.

pub mod authorize;
pub mod issue;
pub mod logout;
pub mod refresh;
pub mod reset;
pub mod verify;

mod common;

pub use authorize::*;
pub use issue::*;
pub use logout::*;
pub use refresh::*;
pub use verify::*;

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::LifecyclePolicy,
	error::ConfigError,
	identity::{CredentialHasher, IdentityStore},
	signing::SigningAuthority,
	store::{MemoryStore, ResetSecretStore, RevocationStore},
};

/// Issues, verifies, rotates, and revokes credentials and runs the password reset flow.
///
/// The manager owns the shared stores, the signing authority, and the identity
/// collaborators so each flow can focus on its own state machine. Cloning is cheap;
/// clones share stores, metrics, and rotation guards.
#[derive(Clone)]
pub struct CredentialManager {
	/// Revocation list consulted on every verification.
	pub revocations: Arc<dyn RevocationStore>,
	/// Single-slot store for password reset secrets.
	pub reset_secrets: Arc<dyn ResetSecretStore>,
	/// Identity Store supplying principals, roles, and credential hashes.
	pub identity: Arc<dyn IdentityStore>,
	/// Password hashing capability.
	pub hasher: Arc<dyn CredentialHasher>,
	/// Lifetimes and clock skew shared by every flow.
	pub policy: LifecyclePolicy,
	/// Shared counters for refresh rotations.
	pub rotation_metrics: Arc<RotationMetrics>,
	issuer: TokenIssuer,
	verifier: TokenVerifier,
	clock: Arc<dyn Clock>,
	flow_guards: Arc<common::FlowGuards>,
}
impl CredentialManager {
	/// Starts a builder around the required collaborators.
	pub fn builder(
		authority: Arc<SigningAuthority>,
		identity: Arc<dyn IdentityStore>,
		hasher: Arc<dyn CredentialHasher>,
	) -> CredentialManagerBuilder {
		CredentialManagerBuilder {
			authority,
			identity,
			hasher,
			revocations: None,
			reset_secrets: None,
			policy: LifecyclePolicy::default(),
			clock: Arc::new(SystemClock),
		}
	}

	/// Issuer used for every pair this manager mints.
	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}

	/// Verifier used by [`Self::authenticate`].
	pub fn verifier(&self) -> &TokenVerifier {
		&self.verifier
	}

	/// Signing authority shared by the issuer and verifier.
	pub fn signing_authority(&self) -> &Arc<SigningAuthority> {
		self.issuer.authority()
	}

	/// Clock consulted for every decision.
	pub fn clock(&self) -> &Arc<dyn Clock> {
		&self.clock
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}
}
impl Debug for CredentialManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManager")
			.field("policy", &self.policy)
			.field("rotation_metrics", &self.rotation_metrics)
			.finish_non_exhaustive()
	}
}

/// Builder for [`CredentialManager`] values.
pub struct CredentialManagerBuilder {
	authority: Arc<SigningAuthority>,
	identity: Arc<dyn IdentityStore>,
	hasher: Arc<dyn CredentialHasher>,
	revocations: Option<Arc<dyn RevocationStore>>,
	reset_secrets: Option<Arc<dyn ResetSecretStore>>,
	policy: LifecyclePolicy,
	clock: Arc<dyn Clock>,
}
impl CredentialManagerBuilder {
	/// Overrides the revocation store (defaults to a shared [`MemoryStore`]).
	pub fn revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
		self.revocations = Some(store);

		self
	}

	/// Overrides the reset secret store (defaults to a shared [`MemoryStore`]).
	pub fn reset_secret_store(mut self, store: Arc<dyn ResetSecretStore>) -> Self {
		self.reset_secrets = Some(store);

		self
	}

	/// Overrides the lifecycle policy.
	pub fn policy(mut self, policy: LifecyclePolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Overrides the clock (defaults to [`SystemClock`]).
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Validates the policy and wires the issuer and verifier.
	pub fn build(self) -> Result<CredentialManager, ConfigError> {
		self.policy.validate()?;

		let fallback = Arc::new(MemoryStore::default());
		let revocations: Arc<dyn RevocationStore> = match self.revocations {
			Some(store) => store,
			None => fallback.clone(),
		};
		let reset_secrets: Arc<dyn ResetSecretStore> = match self.reset_secrets {
			Some(store) => store,
			None => fallback,
		};
		let issuer = TokenIssuer::new(self.authority.clone(), self.policy, self.clock.clone());
		let verifier = TokenVerifier::new(
			self.authority,
			revocations.clone(),
			self.clock.clone(),
			self.policy.clock_skew_tolerance,
		);

		Ok(CredentialManager {
			revocations,
			reset_secrets,
			identity: self.identity,
			hasher: self.hasher,
			policy: self.policy,
			rotation_metrics: Default::default(),
			issuer,
			verifier,
			clock: self.clock,
			flow_guards: Default::default(),
		})
	}
}
impl Debug for CredentialManagerBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManagerBuilder").field("policy", &self.policy).finish_non_exhaustive()
	}
}
