//! The router façade.
//!
//! [`Router`] owns a [`Registry`] and runs the dispatch pipeline:
//!
//! 1. **Resolve**: [`find_route`](Router::find_route), answered from the
//!    decision cache when the `cache` feature is on
//! 2. **Extract**: build the [`Signal`](crate::Signal)
//! 3. **Hook**: the endpoint's `on_process` hook; [`HookAction::Halt`] ends
//!    dispatch with the hook's result
//! 4. **Handler**: the branch or terminal handler, run through the
//!    preprocessor and processor
//!
//! A router is a plain value: construct one, share it by reference or `Arc`,
//! and call it from any thread.
//!
//! # Example
//!
//! ```
//! use neuro_router::{Branch, Endpoint, Request, Router};
//!
//! #[derive(Debug, PartialEq)]
//! enum Screen {
//!     Home,
//!     Login,
//!     Message(u64),
//! }
//!
//! let router: Router<Screen> = Router::new();
//! router
//!     .register(
//!         Endpoint::routable("web")
//!             .schemes(["http", "https"])
//!             .host("www.mywebsite.com")
//!             .on_no_path(|_| Screen::Home),
//!         vec![
//!             Branch::new("/login", |_| Screen::Login),
//!             Branch::new("/messages/<id>", |s| {
//!                 Screen::Message(s.variables().get_as("id").unwrap_or_default())
//!             }),
//!         ],
//!     )
//!     .unwrap();
//!
//! let proceed = |url: &str| router.proceed(Request::new(url));
//! assert_eq!(proceed("https://www.mywebsite.com").unwrap(), Screen::Home);
//! assert_eq!(proceed("https://www.mywebsite.com/login").unwrap(), Screen::Login);
//! assert_eq!(proceed("http://WWW.MYWEBSITE.COM/messages/7").unwrap(), Screen::Message(7));
//! assert!(proceed("https://other.com/login").unwrap_err().is_not_found());
//! ```

use crate::endpoint::{Branch, Endpoint, EndpointKind};
use crate::error::RouterError;
use crate::lifecycle::HookAction;
use crate::logging::{DefaultLogger, RouteLogger};
use crate::middleware::{run_chain, DirectProcessor, PassThrough, Preprocessor, Processor};
use crate::registry::Registry;
use crate::resolve::{resolve, RouteDecision};
use crate::signal::{extract_signal, Opaque};
use crate::{debug_log, error_log, info_log};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, DecisionCache};
#[cfg(feature = "cache")]
use parking_lot::Mutex;
#[cfg(feature = "cache")]
use std::num::NonZeroUsize;

// ============================================================================
// RouterConfig
// ============================================================================

/// Router construction options.
///
/// ```
/// use neuro_router::RouterConfig;
///
/// let config = RouterConfig::new().cache_capacity(0).log_events(false);
/// assert_eq!(config.cache_capacity, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of cached route decisions; `0` disables the cache.
    /// Ignored without the `cache` feature.
    pub cache_capacity: usize,
    /// Install [`DefaultLogger`] as the router's event logger.
    pub log_events: bool,
}

impl RouterConfig {
    const DEFAULT_CACHE_CAPACITY: usize = 256;

    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decision cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Enable or disable the default event logger.
    pub fn log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            log_events: true,
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// One dispatch: the URL plus everything forwarded to the handler.
///
/// ```
/// use neuro_router::Request;
///
/// let request: Request<()> = Request::new("app://home/login").context("main-activity");
/// assert_eq!(request.url(), "app://home/login");
/// ```
pub struct Request<R> {
    url: String,
    decision: Option<RouteDecision<R>>,
    context: Option<Opaque>,
    args: Option<Opaque>,
    processor: Option<Arc<dyn Processor<R>>>,
    preprocessor: Option<Arc<dyn Preprocessor<R>>>,
}

impl<R> Request<R> {
    /// Dispatch `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            decision: None,
            context: None,
            args: None,
            processor: None,
            preprocessor: None,
        }
    }

    /// Dispatch a decision from [`Router::find_route`] without resolving again.
    pub fn from_decision(decision: RouteDecision<R>) -> Self {
        let mut request = Self::new(decision.url().raw());
        request.decision = Some(decision);
        request
    }

    /// Attach a context value, readable with [`Signal::context`](crate::Signal::context).
    pub fn context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Attach an already shared context.
    pub fn with_context(mut self, context: Option<Opaque>) -> Self {
        self.context = context;
        self
    }

    /// Attach an argument value, readable with [`Signal::args`](crate::Signal::args).
    pub fn args<T: Any + Send + Sync>(mut self, args: T) -> Self {
        self.args = Some(Arc::new(args));
        self
    }

    /// Attach already shared arguments.
    pub fn with_args(mut self, args: Option<Opaque>) -> Self {
        self.args = args;
        self
    }

    /// Use `processor` instead of [`DirectProcessor`].
    pub fn processor(mut self, processor: impl Processor<R>) -> Self {
        self.processor = Some(Arc::new(processor));
        self
    }

    /// Use `preprocessor` instead of the router's default.
    pub fn preprocessor(mut self, preprocessor: impl Preprocessor<R>) -> Self {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    /// The URL to dispatch.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<R> fmt::Debug for Request<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("has_decision", &self.decision.is_some())
            .field("has_context", &self.context.is_some())
            .field("has_args", &self.args.is_some())
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

/// URL dispatcher. See the module docs.
pub struct Router<R> {
    registry: Registry<R>,
    config: RouterConfig,
    logger: RwLock<Option<Arc<dyn RouteLogger>>>,
    preprocessor: RwLock<Option<Arc<dyn Preprocessor<R>>>>,
    #[cfg(feature = "cache")]
    cache: Option<Mutex<DecisionCache<R>>>,
}

impl<R: 'static> Router<R> {
    /// Create a router with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with `config`.
    pub fn with_config(config: RouterConfig) -> Self {
        let logger: Option<Arc<dyn RouteLogger>> = if config.log_events {
            Some(Arc::new(DefaultLogger))
        } else {
            None
        };
        Self {
            registry: Registry::new(),
            #[cfg(feature = "cache")]
            cache: NonZeroUsize::new(config.cache_capacity)
                .map(|capacity| Mutex::new(DecisionCache::new(capacity))),
            config,
            logger: RwLock::new(logger),
            preprocessor: RwLock::new(None),
        }
    }

    /// The configuration this router was built with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Replace the event logger; `None` silences routing events.
    pub fn set_logger(&self, logger: Option<Arc<dyn RouteLogger>>) {
        *self.logger.write() = logger;
    }

    /// Preprocessor used by requests that do not carry their own.
    pub fn set_preprocessor(&self, preprocessor: impl Preprocessor<R>) {
        *self.preprocessor.write() = Some(Arc::new(preprocessor));
    }

    /// Go back to [`PassThrough`] as the default preprocessor.
    pub fn clear_preprocessor(&self) {
        *self.preprocessor.write() = None;
    }

    fn logger(&self) -> Option<Arc<dyn RouteLogger>> {
        self.logger.read().clone()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `endpoint` with `branches`.
    ///
    /// The whole batch is validated first; on error nothing changes. See
    /// [`Registry::register`] for merge rules.
    pub fn register(&self, endpoint: Endpoint<R>, branches: Vec<Branch<R>>) -> Result<(), RouterError> {
        let id = endpoint.id().to_string();
        let count = branches.len();
        self.registry.register(endpoint, branches).map_err(|err| {
            debug_log!("Registration of endpoint '{}' rejected: {}", id, err);
            err
        })?;
        info_log!("Registered endpoint '{}' with {} branch(es)", id, count);
        Ok(())
    }

    /// Register an endpoint without branches, typically a terminal one.
    pub fn register_endpoint(&self, endpoint: Endpoint<R>) -> Result<(), RouterError> {
        self.register(endpoint, Vec::new())
    }

    /// Remove every endpoint and branch.
    pub fn clear(&self) {
        self.registry.clear();
        info_log!("Router cleared");
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve `url` to a [`RouteDecision`].
    pub fn find_route(&self, url: &str) -> Result<RouteDecision<R>, RouterError> {
        let logger = self.logger();
        if let Some(logger) = &logger {
            logger.on_find_route_started(url);
        }
        let result = self.lookup(url);
        if let Some(logger) = &logger {
            logger.on_find_route_finished(url);
        }
        result
    }

    #[cfg(feature = "cache")]
    fn lookup(&self, url: &str) -> Result<RouteDecision<R>, RouterError> {
        let Some(cache) = &self.cache else {
            return resolve(&self.registry, url);
        };
        let generation = self.registry.generation();
        if let Some(decision) = cache.lock().get(url, generation) {
            return Ok(decision);
        }
        let decision = resolve(&self.registry, url)?;
        cache.lock().insert(url.to_string(), decision.clone(), generation);
        Ok(decision)
    }

    #[cfg(not(feature = "cache"))]
    fn lookup(&self, url: &str) -> Result<RouteDecision<R>, RouterError> {
        resolve(&self.registry, url)
    }

    /// Decision cache statistics; `None` when the cache is disabled.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.lock().stats().clone())
    }

    /// Zero the decision cache counters. Cached decisions stay.
    #[cfg(feature = "cache")]
    pub fn reset_cache_stats(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().reset_stats();
        }
    }

    /// Number of decisions currently cached.
    #[cfg(feature = "cache")]
    pub fn cached_decisions(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.lock().len())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Dispatch `request` and return the handler's result.
    ///
    /// Fails with [`RouterError::InvalidUrl`] for malformed URLs and with
    /// [`RouterError::NotFound`] when no handler applies. A halting endpoint
    /// hook returns its own result without running the handler.
    pub fn proceed(&self, request: Request<R>) -> Result<R, RouterError> {
        let Request {
            url,
            decision,
            context,
            args,
            processor,
            preprocessor,
        } = request;

        let logger = self.logger();
        if let Some(logger) = &logger {
            logger.on_routing_url(&url);
        }

        let decision = match decision {
            Some(decision) => decision,
            None => match self.find_route(&url) {
                Ok(decision) => decision,
                Err(err) => {
                    if err.is_not_found() {
                        if let Some(logger) = &logger {
                            logger.on_url_has_no_result(&url);
                        }
                    }
                    return Err(err);
                }
            },
        };

        if let Some(logger) = &logger {
            logger.on_url_has_result(&url, decision.endpoint_id(), decision.branch_expression());
        }

        let signal = extract_signal(&decision, context, args).map_err(|err| {
            error_log!("Signal extraction failed for '{}': {}", url, err);
            err
        })?;

        let endpoint = decision.endpoint().endpoint();
        if let Some(hook) = endpoint.hook() {
            if let HookAction::Halt(result) = hook(&signal) {
                if let Some(logger) = &logger {
                    logger.on_endpoint_halted(&url);
                }
                return Ok(result);
            }
        }

        let handler = match endpoint.kind() {
            EndpointKind::Terminal(handler) => Arc::clone(handler),
            EndpointKind::Routable(_) => match decision.branch() {
                Some(branch) => Arc::clone(branch.handler()),
                None => {
                    if let Some(logger) = &logger {
                        logger.on_url_has_no_result(&url);
                    }
                    return Err(RouterError::not_found(url));
                }
            },
        };

        let processor: Arc<dyn Processor<R>> = match processor {
            Some(processor) => processor,
            None => Arc::new(DirectProcessor),
        };
        let preprocessor: Arc<dyn Preprocessor<R>> =
            match preprocessor.or_else(|| self.preprocessor.read().clone()) {
                Some(preprocessor) => preprocessor,
                None => Arc::new(PassThrough),
            };

        Ok(run_chain(&*preprocessor, &*processor, &handler, &signal))
    }

    /// Dispatch `url` with no context, arguments or custom chain.
    pub fn proceed_url(&self, url: &str) -> Result<R, RouterError> {
        self.proceed(Request::new(url))
    }
}

impl<R: 'static> Default for Router<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("has_logger", &self.logger.read().is_some())
            .field("has_preprocessor", &self.preprocessor.read().is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<String> {
        let router = Router::with_config(RouterConfig::new().log_events(false));
        router
            .register(
                Endpoint::routable("app").scheme("app").host("home"),
                vec![Branch::new("/echo/<word>", |s| {
                    s.variable("word").unwrap_or_default().to_string()
                })],
            )
            .unwrap();
        router
    }

    fn dispatch_any<R: Clone + Send + Sync + 'static>(value: R) -> R {
        let router = Router::with_config(RouterConfig::new().log_events(false));
        router
            .register(Endpoint::routable("any"), vec![Branch::new("/v", move |_| value.clone())])
            .unwrap();
        router
            .proceed(Request::new("x://y/v").preprocessor(PassThrough))
            .unwrap()
    }

    #[test]
    fn test_generic_result_types_dispatch() {
        assert_eq!(dispatch_any(7_u64), 7);
        assert_eq!(dispatch_any(vec!["a", "b"]), ["a", "b"]);
    }

    #[test]
    fn test_proceed_url() {
        assert_eq!(router().proceed_url("app://home/echo/hi").unwrap(), "hi");
    }

    #[test]
    fn test_from_decision_skips_resolution() {
        let router = router();
        let decision = router.find_route("app://home/echo/again").unwrap();
        router.clear();
        let result = router.proceed(Request::from_decision(decision)).unwrap();
        assert_eq!(result, "again");
    }

    #[test]
    fn test_config_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.cache_capacity, 256);
        assert!(config.log_events);
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_cache_hit_and_invalidation() {
        let router = router();
        router.find_route("app://home/echo/a").unwrap();
        router.find_route("app://home/echo/a").unwrap();
        let stats = router.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        // cached as a decision without a branch
        assert!(router.proceed_url("app://home/late").unwrap_err().is_not_found());

        router
            .register(Endpoint::routable("app"), vec![Branch::new("/late", |_| "late".to_string())])
            .unwrap();
        assert_eq!(router.proceed_url("app://home/late").unwrap(), "late");
        assert_eq!(router.cache_stats().unwrap().invalidations, 1);
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_cache_disabled() {
        let router: Router<u8> = Router::with_config(RouterConfig::new().cache_capacity(0));
        assert!(router.cache_stats().is_none());
        router.find_route("app://home").unwrap_err();
        assert_eq!(router.cached_decisions(), 0);
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_reset_cache_stats_keeps_entries() {
        let router = router();
        router.find_route("app://home/echo/a").unwrap();
        router.find_route("app://home/echo/a").unwrap();
        assert_eq!(router.cached_decisions(), 1);

        router.reset_cache_stats();
        assert_eq!(router.cache_stats().unwrap(), CacheStats::default());
        assert_eq!(router.cached_decisions(), 1);

        router.find_route("app://home/echo/a").unwrap();
        assert_eq!(router.cache_stats().unwrap().hits, 1);
    }
}
