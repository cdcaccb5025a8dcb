// self
use crate::obs::{OperationKind, OperationOutcome};

/// Increments `younium_client_operation_total{operation,outcome}` (when `metrics` is enabled).
pub fn record_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"younium_client_operation_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Adds the pages one collection fetch needed to `younium_client_pages_total{via}`.
///
/// `numbered` counts page 1 plus the fan-out; `cursor` counts pages reached through `nextPage`.
pub fn record_pages_fetched(numbered: u64, cursor: u64) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("younium_client_pages_total", "via" => "numbered").increment(numbered);
		metrics::counter!("younium_client_pages_total", "via" => "cursor").increment(cursor);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = (numbered, cursor);
}
