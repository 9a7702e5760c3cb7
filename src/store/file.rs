//! File-backed store that persists a JSON snapshot after every mutation.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{FamilyId, PrincipalId, ResetSecret, RevocationEntry, TokenClaims, TokenId},
	store::{
		MarkOutcome, RedeemOutcome, ResetSecretStore, RevocationStore, RevokeOutcome, StoreError,
		StoreFuture,
		state::{Snapshot, StoreState},
	},
};

/// Persists revocations and reset secrets to a JSON file, replacing it atomically.
///
/// Reads are served from memory; a mutation holds the write lock until the new
/// snapshot is on disk, so a returned write is both visible and durable.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<StoreState>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(StoreState::from_snapshot(snapshot))) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, state: &StoreState) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(&state.snapshot()).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate<T>(&self, apply: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();
		let value = apply(&mut next);

		self.persist_locked(&next)?;
		*guard = next;

		Ok(value)
	}
}
impl RevocationStore for FileStore {
	fn revoke(&self, entry: RevocationEntry) -> StoreFuture<'_, RevokeOutcome> {
		Box::pin(async move { self.mutate(|state| state.revoke_now(entry)) })
	}

	fn lookup<'a>(&'a self, claims: &'a TokenClaims) -> StoreFuture<'a, Option<RevocationEntry>> {
		Box::pin(async move { Ok(self.inner.read().lookup_now(claims)) })
	}

	fn is_revoked<'a>(
		&'a self,
		token_id: &'a TokenId,
		family_id: &'a FamilyId,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.inner.read().is_revoked_now(token_id, family_id)) })
	}

	fn mark_rotated<'a>(
		&'a self,
		claims: &'a TokenClaims,
		at: OffsetDateTime,
		retain_until: OffsetDateTime,
	) -> StoreFuture<'a, MarkOutcome> {
		Box::pin(
			async move { self.mutate(|state| state.mark_rotated_now(claims, at, retain_until)) },
		)
	}

	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { self.mutate(|state| state.prune_revocations_now(now)) })
	}
}
impl ResetSecretStore for FileStore {
	fn issue(&self, record: ResetSecret) -> StoreFuture<'_, Option<ResetSecret>> {
		Box::pin(async move { self.mutate(|state| state.issue_now(record)) })
	}

	fn redeem<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
		now: OffsetDateTime,
	) -> StoreFuture<'a, RedeemOutcome> {
		Box::pin(async move { self.mutate(|state| state.redeem_now(principal, secret_hash, now)) })
	}

	fn discard<'a>(
		&'a self,
		principal: &'a PrincipalId,
		secret_hash: &'a str,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move { self.mutate(|state| state.discard_now(principal, secret_hash)) })
	}

	fn prune(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { self.mutate(|state| state.prune_reset_secrets_now(now)) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{RevocationReason, RevocationTarget, RoleSet, TokenKind};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"credential_lifecycle_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn refresh_claims() -> TokenClaims {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);

		TokenClaims {
			principal: PrincipalId::new("principal-demo").expect("Failed to build principal."),
			roles: RoleSet::new(["user"]).expect("Failed to build role fixture."),
			token_id: TokenId::new("refresh-demo").expect("Failed to build token id."),
			family_id: FamilyId::new("family-demo").expect("Failed to build family id."),
			issued_at,
			expires_at: issued_at + Duration::days(7),
			kind: TokenKind::Refresh,
		}
	}

	#[test]
	fn revocations_and_secrets_survive_reopen() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let claims = refresh_claims();
		let now = claims.issued_at;
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let (plaintext, record) =
			ResetSecret::issue(claims.principal.clone(), now, Duration::minutes(10));

		assert_eq!(
			rt.block_on(store.mark_rotated(&claims, now, claims.expires_at))
				.expect("Failed to mark rotation."),
			MarkOutcome::Marked
		);
		rt.block_on(store.revoke(RevocationEntry::new(
			RevocationTarget::Family(claims.family_id.clone()),
			RevocationReason::Logout,
			now,
			claims.expires_at,
		)))
		.expect("Failed to revoke family.");
		rt.block_on(ResetSecretStore::issue(&store, record)).expect("Failed to store secret.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let entry = rt
			.block_on(reopened.lookup(&claims))
			.expect("Failed to look up revocation.")
			.expect("File store lost revocation after reopen.");

		assert_eq!(entry.reason, RevocationReason::Logout);
		assert_eq!(
			rt.block_on(reopened.redeem(&claims.principal, &plaintext.digest(), now))
				.expect("Failed to redeem secret."),
			RedeemOutcome::Redeemed
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path();

		fs::write(&path, b"{ not json").expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot must not load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
