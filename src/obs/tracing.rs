// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by token flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_bearer.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
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
}

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

/// Logs an outbound request and its headers at debug level (when enabled).
///
/// Credential-bearing headers are reduced to `<scheme> <excerpt>`; the full
/// bearer or basic value never reaches the log stream.
pub(crate) fn trace_request(method: &str, url: &Url, headers: &BTreeMap<String, String>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(method, url = %url, "request");

		for (name, value) in headers {
			tracing::debug!(header = name.as_str(), value = %redact_header(name, value));
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, url, headers);
	}
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn redact_header(name: &str, value: &str) -> String {
	if !name.eq_ignore_ascii_case("authorization") {
		return value.to_owned();
	}

	match value.split_once(' ') {
		Some((scheme, credential)) =>
			format!("{scheme} {}", crate::auth::token::excerpt(credential)),
		None => crate::auth::token::excerpt(value),
	}
}
