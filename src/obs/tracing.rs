// crates.io
use tracing::{Instrument, instrument::Instrumented};
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, obs::UpstreamCall};

/// Span wrapper used around upstream calls.
#[derive(Clone, Debug)]
pub struct UpstreamSpan {
	span: tracing::Span,
}
impl UpstreamSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(call: UpstreamCall, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("beatdrops.upstream", call = call.as_str(), stage) }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

/// Installs the global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
