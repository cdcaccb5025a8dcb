// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("younium.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
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
}

/// Logs a non-success response whose body was not an error envelope.
pub fn log_http_failure(status: u16, body: &Value) {
	#[cfg(feature = "tracing")]
	tracing::warn!(status, %body, "API request failed");

	#[cfg(not(feature = "tracing"))]
	let _ = (status, body);
}

/// Logs that a cached token was reused.
pub fn log_token_reused(expires: Option<&str>) {
	#[cfg(feature = "tracing")]
	tracing::debug!(expires, "reusing cached token");

	#[cfg(not(feature = "tracing"))]
	let _ = expires;
}

/// Logs the page fan-out about to be issued.
pub fn log_page_fanout(first: u32, last: u32, concurrency: usize) {
	#[cfg(feature = "tracing")]
	tracing::debug!(first, last, concurrency, "fetching remaining pages");

	#[cfg(not(feature = "tracing"))]
	let _ = (first, last, concurrency);
}

/// Logs a cursor-link page fetch.
pub fn log_cursor_page(url: &Url) {
	#[cfg(feature = "tracing")]
	tracing::debug!(url = url.as_str(), "following next page link");

	#[cfg(not(feature = "tracing"))]
	let _ = url;
}
