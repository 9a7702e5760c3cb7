//! Role set modeling used by issuance and authorization.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when validating role names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RoleValidationError {
	/// Empty role names are not allowed.
	#[error("Role names cannot be empty.")]
	Empty,
	/// Role names cannot contain embedded whitespace characters.
	#[error("Role contains whitespace: {role}.")]
	ContainsWhitespace {
		/// The offending role string.
		role: String,
	},
}

/// Sorted, deduplicated set of role names carried in token claims.
///
/// No role implies another: a principal that should act as both `admin` and `user`
/// must carry both names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSet(Arc<[String]>);
impl RoleSet {
	/// Creates a normalized role set from any iterator.
	pub fn new<I, S>(roles: I) -> Result<Self, RoleValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for role in roles {
			let role = role.into();

			if role.is_empty() {
				return Err(RoleValidationError::Empty);
			}
			if role.chars().any(char::is_whitespace) {
				return Err(RoleValidationError::ContainsWhitespace { role });
			}

			set.insert(role);
		}

		Ok(Self(set.into_iter().collect()))
	}

	/// Number of distinct roles.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no roles are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains `role`.
	pub fn contains(&self, role: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(role)).is_ok()
	}

	/// Returns true if at least one role appears in both sets.
	pub fn intersects(&self, other: &RoleSet) -> bool {
		let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };

		small.iter().any(|role| large.contains(role))
	}

	/// Iterator over roles in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}
impl Display for RoleSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(","))
	}
}
impl Serialize for RoleSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_seq(self.iter())
	}
}
impl<'de> Deserialize<'de> for RoleSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		RoleSet::new(values).map_err(DeError::custom)
	}
}
