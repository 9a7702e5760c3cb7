//! Shared fixtures for integration tests: in-memory identity store, hasher, notifiers.

#![allow(dead_code)]

// std
use std::{collections::HashMap, io, sync::Arc};
// crates.io
use parking_lot::Mutex;
use time::{OffsetDateTime, macros};
// self
use credential_lifecycle::{
	CredentialManager,
	auth::{KeyId, Principal, PrincipalId, RoleSet, TokenSecret, digest_secret},
	clock::ManualClock,
	config::LifecyclePolicy,
	ext::{ResetDelivery, ResetNotifier, ResetNotifyFuture},
	identity::{CredentialHasher, IdentityError, IdentityFuture, IdentityStore},
	signing::{KeyRing, SigningAuthority, SigningKey},
	store::MemoryStore,
};

pub const START: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);
pub const PASSWORD: &str = "correct-horse-battery-staple";

/// Identity store keeping principals and credential hashes in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
	records: Mutex<HashMap<PrincipalId, (RoleSet, String)>>,
}
impl MemoryIdentityStore {
	pub fn insert(&self, principal: Principal, credential_hash: String) {
		self.records.lock().insert(principal.id, (principal.roles, credential_hash));
	}

	pub fn credential_of(&self, id: &PrincipalId) -> Option<String> {
		self.records.lock().get(id).map(|(_, hash)| hash.clone())
	}

	fn unknown(id: &PrincipalId) -> IdentityError {
		IdentityError::UnknownPrincipal { principal: id.clone() }
	}
}
impl IdentityStore for MemoryIdentityStore {
	fn fetch_principal<'a>(&'a self, id: &'a PrincipalId) -> IdentityFuture<'a, Principal> {
		Box::pin(async move {
			let records = self.records.lock();
			let (roles, _) = records.get(id).ok_or_else(|| Self::unknown(id))?;

			Ok(Principal::new(id.clone(), roles.clone()))
		})
	}

	fn credential_hash<'a>(&'a self, id: &'a PrincipalId) -> IdentityFuture<'a, String> {
		Box::pin(async move { self.credential_of(id).ok_or_else(|| Self::unknown(id)) })
	}

	fn replace_credential<'a>(
		&'a self,
		id: &'a PrincipalId,
		credential_hash: String,
	) -> IdentityFuture<'a, ()> {
		Box::pin(async move {
			let mut records = self.records.lock();
			let (_, stored) = records.get_mut(id).ok_or_else(|| Self::unknown(id))?;

			*stored = credential_hash;

			Ok(())
		})
	}
}

/// Deterministic digest "hasher"; stands in for a real password hash in tests only.
#[derive(Debug, Default)]
pub struct DigestHasher;
impl CredentialHasher for DigestHasher {
	fn hash(&self, plaintext: &str) -> Result<String, IdentityError> {
		Ok(format!("digest${}", digest_secret(plaintext)))
	}

	fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
		self.hash(plaintext).is_ok_and(|hash| hash == stored_hash)
	}
}

/// Captures every delivered secret; optionally fails after capturing.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	pub delivered: Mutex<Vec<ResetDelivery>>,
	pub fail: bool,
}
impl RecordingNotifier {
	pub fn failing() -> Self {
		Self { delivered: Mutex::default(), fail: true }
	}

	pub fn last_secret(&self) -> TokenSecret {
		self.delivered.lock().last().map(|d| d.secret.clone()).expect("A secret should be delivered.")
	}
}
impl ResetNotifier for RecordingNotifier {
	type Error = io::Error;

	fn deliver(&self, delivery: ResetDelivery) -> ResetNotifyFuture<'_, Self::Error> {
		Box::pin(async move {
			self.delivered.lock().push(delivery);

			if self.fail { Err(io::Error::other("mail relay refused the message")) } else { Ok(()) }
		})
	}
}

/// Fully wired manager over in-memory collaborators and a manual clock.
pub struct Harness {
	pub manager: CredentialManager,
	pub clock: Arc<ManualClock>,
	pub identity: Arc<MemoryIdentityStore>,
	pub store: Arc<MemoryStore>,
}

pub fn principal_id(value: &str) -> PrincipalId {
	PrincipalId::new(value).expect("Principal fixture should be valid.")
}

pub fn roles(values: &[&str]) -> RoleSet {
	RoleSet::new(values.iter().copied()).expect("Role fixture should be valid.")
}

pub fn signing_key(id: &str) -> SigningKey {
	SigningKey::generate(KeyId::new(id).expect("Key id fixture should be valid."))
		.expect("Generated keys always meet the minimum length.")
}

pub fn password_hash(plaintext: &str) -> String {
	DigestHasher.hash(plaintext).expect("Fixture hash should succeed.")
}

pub fn harness() -> Harness {
	harness_with_policy(LifecyclePolicy::default())
}

pub fn harness_with_policy(policy: LifecyclePolicy) -> Harness {
	let clock = Arc::new(ManualClock::new(START));
	let identity = Arc::new(MemoryIdentityStore::default());
	let store = Arc::new(MemoryStore::default());
	let authority = Arc::new(SigningAuthority::new(KeyRing::new(signing_key("k1"))));
	let password_hash = password_hash(PASSWORD);

	identity.insert(Principal::new(principal_id("p1"), roles(&["user"])), password_hash.clone());
	identity.insert(
		Principal::new(principal_id("guide"), roles(&["user", "lead-guide"])),
		password_hash,
	);

	let manager = CredentialManager::builder(authority, identity.clone(), Arc::new(DigestHasher))
		.revocation_store(store.clone())
		.reset_secret_store(store.clone())
		.policy(policy)
		.clock(clock.clone())
		.build()
		.expect("Harness policy should validate.");

	Harness { manager, clock, identity, store }
}
