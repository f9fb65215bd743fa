//! Processor chain around handler invocation.
//!
//! A handler is never called directly by the router. It is passed, with its
//! [`Signal`], through two layers:
//!
//! - [`Processor`]: decides how the handler is invoked (wrap the result,
//!   measure it, call it twice, not at all..). Default: [`DirectProcessor`].
//! - [`Preprocessor`]: wraps the processor call itself. It receives the
//!   processor, the handler and the signal and must return the final
//!   result. Default: [`PassThrough`].
//!
//! Both are chosen per request; a router-level preprocessor set with
//! [`Router::set_preprocessor`](crate::Router::set_preprocessor) is used when
//! the request has none.
//!
//! # Creating processors
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | Implement [`Processor`] / [`Preprocessor`] | Named, reusable, stateful |
//! | [`processor_fn`] / [`preprocessor_fn`] | Quick one-off from a closure |
//!
//! # Example
//!
//! ```
//! use neuro_router::{preprocessor_fn, processor_fn, Branch, Endpoint, Request, Router};
//!
//! let router: Router<String> = Router::new();
//! router
//!     .register(Endpoint::routable("app"), vec![Branch::new("/home", |_| "home".to_string())])
//!     .unwrap();
//!
//! let request = Request::new("app://x/home")
//!     .processor(processor_fn(|handler, signal| format!("[{}]", handler(signal))))
//!     .preprocessor(preprocessor_fn(|processor, handler, signal| {
//!         format!("<{}>", processor.process(handler, signal))
//!     }));
//!
//! assert_eq!(router.proceed(request).unwrap(), "<[home]>");
//! ```

use crate::endpoint::Handler;
use crate::signal::Signal;

// ============================================================================
// Processor
// ============================================================================

/// Invokes a handler for a signal.
pub trait Processor<R>: Send + Sync + 'static {
    /// Produce the dispatch result, normally by calling `handler(signal)`.
    fn process(&self, handler: &Handler<R>, signal: &Signal) -> R;

    /// Processor name for debugging.
    fn name(&self) -> &'static str {
        "Processor"
    }
}

/// Processor that calls the handler once and returns its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectProcessor;

impl<R> Processor<R> for DirectProcessor {
    fn process(&self, handler: &Handler<R>, signal: &Signal) -> R {
        handler(signal)
    }

    fn name(&self) -> &'static str {
        "DirectProcessor"
    }
}

/// Create a processor from a closure.
pub fn processor_fn<R, F>(f: F) -> FnProcessor<F>
where
    F: Fn(&Handler<R>, &Signal) -> R + Send + Sync + 'static,
{
    FnProcessor { f }
}

/// Processor created from a closure via [`processor_fn`].
pub struct FnProcessor<F> {
    f: F,
}

impl<R, F> Processor<R> for FnProcessor<F>
where
    F: Fn(&Handler<R>, &Signal) -> R + Send + Sync + 'static,
{
    fn process(&self, handler: &Handler<R>, signal: &Signal) -> R {
        (self.f)(handler, signal)
    }
}

// ============================================================================
// Preprocessor
// ============================================================================

/// Wraps the processor call.
pub trait Preprocessor<R>: Send + Sync + 'static {
    /// Produce the dispatch result, normally via `processor.process(handler, signal)`.
    fn preprocess(&self, processor: &dyn Processor<R>, handler: &Handler<R>, signal: &Signal) -> R;

    /// Preprocessor name for debugging.
    fn name(&self) -> &'static str {
        "Preprocessor"
    }
}

/// Preprocessor that hands straight to the processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<R: 'static> Preprocessor<R> for PassThrough {
    fn preprocess(&self, processor: &dyn Processor<R>, handler: &Handler<R>, signal: &Signal) -> R {
        processor.process(handler, signal)
    }

    fn name(&self) -> &'static str {
        "PassThrough"
    }
}

/// Create a preprocessor from a closure.
pub fn preprocessor_fn<R, F>(f: F) -> FnPreprocessor<F>
where
    F: Fn(&dyn Processor<R>, &Handler<R>, &Signal) -> R + Send + Sync + 'static,
{
    FnPreprocessor { f }
}

/// Preprocessor created from a closure via [`preprocessor_fn`].
pub struct FnPreprocessor<F> {
    f: F,
}

impl<R, F> Preprocessor<R> for FnPreprocessor<F>
where
    F: Fn(&dyn Processor<R>, &Handler<R>, &Signal) -> R + Send + Sync + 'static,
{
    fn preprocess(&self, processor: &dyn Processor<R>, handler: &Handler<R>, signal: &Signal) -> R {
        (self.f)(processor, handler, signal)
    }
}

/// Run `handler` through the chain.
pub(crate) fn run_chain<R: 'static>(
    preprocessor: &dyn Preprocessor<R>,
    processor: &dyn Processor<R>,
    handler: &Handler<R>,
    signal: &Signal,
) -> R {
    crate::trace_log!(
        "Dispatching through {} / {}",
        preprocessor.name(),
        processor.name()
    );
    preprocessor.preprocess(processor, handler, signal)
}

// ============================================================================
// Tests
// ============================================================================
