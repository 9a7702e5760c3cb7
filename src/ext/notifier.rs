//! Out-of-band delivery of password reset secrets.

// self
use crate::{
	_prelude::*,
	auth::{PrincipalId, TokenSecret},
};

/// Boxed future returned by [`ResetNotifier::deliver`].
pub type ResetNotifyFuture<'a, Error> = Pin<Box<dyn Future<Output = Result<(), Error>> + 'a + Send>>;

/// Mail/notification sender contract.
///
/// A failed delivery makes the manager discard the stored secret so an
/// undeliverable secret never stays redeemable.
pub trait ResetNotifier: Send + Sync {
	/// Delivery failure type.
	type Error: StdError + Send + Sync + 'static;

	/// Hands the plaintext secret to the delivery channel.
	fn deliver(&self, delivery: ResetDelivery) -> ResetNotifyFuture<'_, Self::Error>;
}

/// Everything a sender needs to build the reset message.
#[derive(Clone, Debug)]
pub struct ResetDelivery {
	/// Principal the secret belongs to.
	pub principal: PrincipalId,
	/// Plaintext secret; redacted in `Debug`.
	pub secret: TokenSecret,
	/// Instant the secret stops being redeemable.
	pub expires_at: OffsetDateTime,
}
