//! Lifecycle policy, signing key configuration, and the serde document form.

// self
use crate::{
	_prelude::*,
	auth::KeyId,
	error::ConfigError,
	signing::{KeyRing, SigningKey},
};

/// Token and secret lifetimes plus the tolerated clock skew.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecyclePolicy {
	/// Lifetime of access tokens.
	pub access_token_ttl: Duration,
	/// Lifetime of refresh tokens; must exceed the access token lifetime.
	pub refresh_token_ttl: Duration,
	/// Redemption window for password reset secrets.
	pub reset_secret_ttl: Duration,
	/// Widening applied to both edges of a token's validity window.
	pub clock_skew_tolerance: Duration,
}
impl LifecyclePolicy {
	/// Default access token lifetime.
	pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::minutes(15);
	/// Default refresh token lifetime.
	pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::days(7);
	/// Default reset secret lifetime.
	pub const DEFAULT_RESET_SECRET_TTL: Duration = Duration::minutes(10);
	/// Longest accepted lifetime for any token or secret.
	pub const MAX_TTL: Duration = Duration::days(3650);
	/// Largest accepted clock skew tolerance.
	pub const MAX_CLOCK_SKEW: Duration = Duration::hours(1);

	/// Starts a builder seeded with the defaults.
	pub fn builder() -> LifecyclePolicyBuilder {
		LifecyclePolicyBuilder::default()
	}

	/// Checks the invariants every component relies on.
	///
	/// The upper bounds keep `now + ttl + skew` representable for any realistic clock.
	pub fn validate(&self) -> Result<(), ConfigError> {
		ensure_bounded("access token TTL", self.access_token_ttl)?;
		ensure_bounded("refresh token TTL", self.refresh_token_ttl)?;
		ensure_bounded("reset secret TTL", self.reset_secret_ttl)?;

		if self.refresh_token_ttl <= self.access_token_ttl {
			return Err(ConfigError::RefreshNotLongerThanAccess);
		}
		if self.clock_skew_tolerance.is_negative() {
			return Err(ConfigError::NegativeSkew);
		}
		if self.clock_skew_tolerance > Self::MAX_CLOCK_SKEW {
			return Err(ConfigError::SkewTooLarge { max: Self::MAX_CLOCK_SKEW });
		}

		Ok(())
	}

	/// Instant until which a revocation of a token expiring at `expires_at` must be kept.
	///
	/// Verifiers accept tokens until `expires_at + skew`, so pruning any earlier would
	/// let a revoked token verify again.
	pub fn retention_for(&self, expires_at: OffsetDateTime) -> OffsetDateTime {
		expires_at + self.clock_skew_tolerance
	}

	/// Retention for entries covering every token issued up to `now`.
	pub fn session_retention(&self, now: OffsetDateTime) -> OffsetDateTime {
		self.retention_for(now + self.refresh_token_ttl)
	}
}
impl Default for LifecyclePolicy {
	fn default() -> Self {
		Self {
			access_token_ttl: Self::DEFAULT_ACCESS_TOKEN_TTL,
			refresh_token_ttl: Self::DEFAULT_REFRESH_TOKEN_TTL,
			reset_secret_ttl: Self::DEFAULT_RESET_SECRET_TTL,
			clock_skew_tolerance: Duration::ZERO,
		}
	}
}

/// Builder for [`LifecyclePolicy`] values.
#[derive(Debug, Default)]
pub struct LifecyclePolicyBuilder {
	policy: LifecyclePolicy,
}
impl LifecyclePolicyBuilder {
	/// Overrides the access token lifetime.
	pub fn access_token_ttl(mut self, ttl: Duration) -> Self {
		self.policy.access_token_ttl = ttl;

		self
	}

	/// Overrides the refresh token lifetime.
	pub fn refresh_token_ttl(mut self, ttl: Duration) -> Self {
		self.policy.refresh_token_ttl = ttl;

		self
	}

	/// Overrides the reset secret lifetime.
	pub fn reset_secret_ttl(mut self, ttl: Duration) -> Self {
		self.policy.reset_secret_ttl = ttl;

		self
	}

	/// Overrides the clock skew tolerance.
	pub fn clock_skew_tolerance(mut self, skew: Duration) -> Self {
		self.policy.clock_skew_tolerance = skew;

		self
	}

	/// Consumes the builder and validates the resulting policy.
	pub fn build(self) -> Result<LifecyclePolicy, ConfigError> {
		self.policy.validate()?;

		Ok(self.policy)
	}
}

/// Serialized signing key: identifier plus base64url (no padding) material.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeySpec {
	/// Key identifier embedded in envelopes.
	pub id: String,
	/// Base64url-encoded key material.
	pub material: String,
}
impl KeySpec {
	fn build(&self) -> Result<SigningKey, ConfigError> {
		SigningKey::from_base64(KeyId::new(&self.id)?, &self.material)
	}
}
impl Debug for KeySpec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeySpec").field("id", &self.id).field("material", &"<redacted>").finish()
	}
}

/// Signing keys as configured: one current key and retired keys, newest first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SigningKeysConfig {
	/// Key used for new signatures.
	pub current: KeySpec,
	/// Keys still accepted for verification.
	#[serde(default)]
	pub retired: Vec<KeySpec>,
}

/// Document form of the configuration surface, loaded from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Access token lifetime in seconds.
	#[serde(default = "default_access_secs")]
	pub access_token_ttl_secs: i64,
	/// Refresh token lifetime in seconds.
	#[serde(default = "default_refresh_secs")]
	pub refresh_token_ttl_secs: i64,
	/// Reset secret lifetime in seconds.
	#[serde(default = "default_reset_secs")]
	pub reset_secret_ttl_secs: i64,
	/// Clock skew tolerance in seconds.
	#[serde(default)]
	pub clock_skew_tolerance_secs: i64,
	/// Signing key ring.
	pub signing_keys: SigningKeysConfig,
}
impl Config {
	/// Parses a JSON document; failures name the offending field path.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		Ok(serde_path_to_error::deserialize(&mut deserializer)?)
	}

	/// Validates the document and produces the runtime policy and key ring.
	pub fn build(&self) -> Result<(LifecyclePolicy, KeyRing), ConfigError> {
		let policy = LifecyclePolicy::builder()
			.access_token_ttl(Duration::seconds(self.access_token_ttl_secs))
			.refresh_token_ttl(Duration::seconds(self.refresh_token_ttl_secs))
			.reset_secret_ttl(Duration::seconds(self.reset_secret_ttl_secs))
			.clock_skew_tolerance(Duration::seconds(self.clock_skew_tolerance_secs))
			.build()?;
		let mut ring = KeyRing::new(self.signing_keys.current.build()?);

		for spec in &self.signing_keys.retired {
			ring = ring.with_retired(spec.build()?)?;
		}

		Ok((policy, ring))
	}
}

fn default_access_secs() -> i64 {
	LifecyclePolicy::DEFAULT_ACCESS_TOKEN_TTL.whole_seconds()
}

fn default_refresh_secs() -> i64 {
	LifecyclePolicy::DEFAULT_REFRESH_TOKEN_TTL.whole_seconds()
}

fn default_reset_secs() -> i64 {
	LifecyclePolicy::DEFAULT_RESET_SECRET_TTL.whole_seconds()
}

fn ensure_bounded(field: &'static str, ttl: Duration) -> Result<(), ConfigError> {
	if !ttl.is_positive() {
		return Err(ConfigError::NonPositiveTtl { field });
	}
	if ttl > LifecyclePolicy::MAX_TTL {
		return Err(ConfigError::TtlTooLong { field, max: LifecyclePolicy::MAX_TTL });
	}

	Ok(())
}
