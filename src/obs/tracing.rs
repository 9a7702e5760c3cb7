// self
use crate::{
	_prelude::*,
	obs::{FlowKind, SecurityEvent},
};

/// Future returned by [`FlowSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one manager operation, tagged with its flow and call site.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a `credential_lifecycle.flow` span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"credential_lifecycle.flow",
					flow = kind.as_str(),
					stage,
					outcome = tracing::field::Empty,
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span; no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Stamps the final outcome label onto the span.
	pub fn record_outcome(&self, outcome: &'static str) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome);
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}
}

/// Emits an audit event for `subject` (a family, token, or principal id; never a secret).
///
/// Replays and discarded secrets are warnings; ordinary revocations are informational.
pub fn record_security_event(event: SecurityEvent, subject: &dyn Display) {
	crate::obs::record_security_event_metric(event);

	#[cfg(feature = "tracing")]
	match event {
		SecurityEvent::ReuseDetected =>
			tracing::warn!(event = event.as_str(), %subject, "refresh token reuse detected"),
		SecurityEvent::ResetSecretDiscarded =>
			tracing::warn!(event = event.as_str(), %subject, "undelivered reset secret discarded"),
		SecurityEvent::FamilyRevoked | SecurityEvent::CredentialReplaced =>
			tracing::info!(event = event.as_str(), %subject, "credential state changed"),
	}
	#[cfg(not(feature = "tracing"))]
	let _ = subject;
}
