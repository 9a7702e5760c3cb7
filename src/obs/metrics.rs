// self
use crate::obs::{FlowKind, FlowOutcome, SecurityEvent};

/// Counter incremented once per flow attempt and once per terminal outcome.
pub const FLOW_COUNTER: &str = "credential_lifecycle_flow_total";
/// Counter incremented for every audited security event.
pub const SECURITY_EVENT_COUNTER: &str = "credential_lifecycle_security_event_total";

/// Bumps [`FLOW_COUNTER`] on the global recorder (no-op without `metrics`).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Bumps [`SECURITY_EVENT_COUNTER`] on the global recorder (no-op without `metrics`).
pub fn record_security_event_metric(event: SecurityEvent) {
	#[cfg(feature = "metrics")]
	metrics::counter!(SECURITY_EVENT_COUNTER, "event" => event.as_str()).increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = event;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_a_recorder_is_a_no_op() {
		record_flow_outcome(FlowKind::Refresh, FlowOutcome::Failure);
		record_flow_outcome(FlowKind::ResetPassword, FlowOutcome::Success);
		record_security_event_metric(SecurityEvent::ReuseDetected);
	}
}
