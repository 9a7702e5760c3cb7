//! Principal snapshot handed over by the identity store.

// self
use crate::{
	_prelude::*,
	auth::{PrincipalId, RoleSet},
};

/// Authenticated entity a token pair is issued for.
///
/// The identity store owns principals; this crate only reads the identifier and
/// the role set at issuance time and never mutates either.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	/// Stable principal identifier.
	pub id: PrincipalId,
	/// Roles granted by the identity store.
	pub roles: RoleSet,
}
impl Principal {
	/// Creates a principal snapshot.
	pub fn new(id: PrincipalId, roles: RoleSet) -> Self {
		Self { id, roles }
	}
}
