//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `younium.operation` with the
//!   `operation` and `stage` fields, plus events for cache hits, page fan-out, and failed calls.
//! - Enable `metrics` to increment the `younium_client_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Session token check and refresh.
	EnsureToken,
	/// Call to the `/auth/token` endpoint.
	TokenIssue,
	/// Single API request.
	Send,
	/// Paginated collection fetch.
	FetchPages,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::EnsureToken => "ensure_token",
			OperationKind::TokenIssue => "token_issue",
			OperationKind::Send => "send",
			OperationKind::FetchPages => "fetch_pages",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records success or failure of `result` for `kind`.
pub fn record_result<T>(kind: OperationKind, result: &Result<T>) {
	match result {
		Ok(_) => record_outcome(kind, OperationOutcome::Success),
		Err(_) => record_outcome(kind, OperationOutcome::Failure),
	}
}
