use crate::decoder::{ByteDecoder, DecodeLimits};
use crate::registry::{REGISTRY, TestCase};
use crate::target::{MarkdownRenderer, RenderError, Renderer};
use thiserror::Error;
use tracing::trace;

/// Why an iteration ended without calling the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    UnknownSelector(u8),
}

/// How a non-faulting iteration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The renderer was not called.
    Skipped(SkipReason),
    /// The renderer returned output.
    Rendered {
        case: &'static str,
        output_len: usize,
    },
    /// The renderer reported an expected limitation, which was discarded.
    Suppressed {
        case: &'static str,
        reason: String,
    },
}

/// A failure that must surface as a finding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessFault {
    #[error("target fault in case '{case}': {source}")]
    Target {
        case: &'static str,
        #[source]
        source: RenderError,
    },
}

/// Turns one fuzz input into one renderer call.
///
/// The first byte picks a [`TestCase`]; the rest is decoded into that case's
/// payload. Exactly one error category, [`RenderError::Unsupported`], is
/// absorbed. Any other renderer error becomes a [`HarnessFault`], and panics
/// raised by the renderer are never caught here.
#[derive(Debug)]
pub struct Dispatcher<R> {
    renderer: R,
    cases: &'static [TestCase],
    limits: DecodeLimits,
}

impl<R: Renderer> Dispatcher<R> {
    /// A dispatcher over the built-in [`REGISTRY`].
    pub const fn new(renderer: R, limits: DecodeLimits) -> Self {
        Self::with_cases(renderer, &REGISTRY, limits)
    }

    pub const fn with_cases(
        renderer: R,
        cases: &'static [TestCase],
        limits: DecodeLimits,
    ) -> Self {
        Self {
            renderer,
            cases,
            limits,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn cases(&self) -> &'static [TestCase] {
        self.cases
    }

    /// Runs one iteration and classifies the result.
    pub fn dispatch(&self, data: &[u8]) -> Result<Outcome, HarnessFault> {
        let Some((&selector, rest)) = data.split_first() else {
            return Ok(Outcome::Skipped(SkipReason::EmptyInput));
        };
        let Some(case) = self.cases.get(usize::from(selector)) else {
            return Ok(Outcome::Skipped(SkipReason::UnknownSelector(selector)));
        };

        let payload = ByteDecoder::new(rest).consume_payload(case.payload, &self.limits);

        match self.renderer.render(&payload, case.profile) {
            Ok(output) => Ok(Outcome::Rendered {
                case: case.name,
                output_len: output.len(),
            }),
            Err(RenderError::Unsupported { reason }) => {
                trace!(case = case.name, %reason, "suppressed expected limitation");
                Ok(Outcome::Suppressed {
                    case: case.name,
                    reason,
                })
            }
            Err(source) => Err(HarnessFault::Target {
                case: case.name,
                source,
            }),
        }
    }

    /// Engine-facing entry point: returns normally unless the iteration
    /// faulted, in which case it panics so the process dies and the engine
    /// records the input.
    pub fn run_iteration(&self, data: &[u8]) {
        if let Err(fault) = self.dispatch(data) {
            panic!("{fault}");
        }
    }
}

static DEFAULT_DISPATCHER: Dispatcher<MarkdownRenderer> =
    Dispatcher::new(MarkdownRenderer::new(), DecodeLimits::UNBOUNDED);

/// The dispatcher used by the fuzz target: `pulldown-cmark` over the
/// built-in registry with unbounded payloads.
pub fn default_dispatcher() -> &'static Dispatcher<MarkdownRenderer> {
    &DEFAULT_DISPATCHER
}

/// Runs one fuzz iteration against the default dispatcher.
pub fn run_iteration(data: &[u8]) {
    DEFAULT_DISPATCHER.run_iteration(data);
}
