//! Identity Store and password hasher contracts consumed by the lifecycle flows.
//!
//! Both are external collaborators: this crate never stores principals or
//! password hashes itself and never picks a hashing algorithm.

// self
use crate::{
	_prelude::*,
	auth::{Principal, PrincipalId},
};

/// Boxed future returned by [`IdentityStore`] operations.
pub type IdentityFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, IdentityError>> + 'a + Send>>;

/// Read access to principals plus the single write this crate performs (credential replacement).
pub trait IdentityStore
where
	Self: Send + Sync,
{
	/// Loads the principal and its current roles.
	fn fetch_principal<'a>(&'a self, id: &'a PrincipalId) -> IdentityFuture<'a, Principal>;

	/// Loads the stored password hash for the principal.
	fn credential_hash<'a>(&'a self, id: &'a PrincipalId) -> IdentityFuture<'a, String>;

	/// Replaces the stored password hash for the principal.
	fn replace_credential<'a>(
		&'a self,
		id: &'a PrincipalId,
		credential_hash: String,
	) -> IdentityFuture<'a, ()>;
}

/// Password hashing capability (argon2, bcrypt, scrypt, ...).
pub trait CredentialHasher
where
	Self: Send + Sync,
{
	/// Hashes new credential material for storage.
	fn hash(&self, plaintext: &str) -> Result<String, IdentityError>;

	/// Returns `true` if `plaintext` matches `stored_hash`.
	fn verify(&self, plaintext: &str, stored_hash: &str) -> bool;
}

/// Failures surfaced by the Identity Store or hasher.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentityError {
	/// The principal does not exist.
	#[error("Principal {principal} is unknown.")]
	UnknownPrincipal {
		/// Principal that was looked up.
		principal: PrincipalId,
	},
	/// The store or hasher could not complete the operation.
	#[error("Identity backend unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
}
