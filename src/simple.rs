//! Single-base convenience router.
//!
//! [`SimpleRouter`] wraps a [`Router`] with exactly one routable endpoint
//! built from a base URL. It suits apps that only ever open links under one
//! scheme and host:
//!
//! ```
//! use neuro_router::SimpleRouter;
//!
//! let router: SimpleRouter<String> = SimpleRouter::new();
//! router.set_base("https://www.mywebsite.com").unwrap();
//! router
//!     .add_path("/promo/<code>", |s| s.variable("code").unwrap_or_default().to_string())
//!     .unwrap();
//!
//! assert_eq!(router.proceed("https://www.mywebsite.com/promo/SPRING", None).unwrap(), "SPRING");
//! assert!(router.proceed("https://www.mywebsite.com/other", None).unwrap_err().is_not_found());
//! ```

use crate::endpoint::{Branch, Endpoint};
use crate::error::RouterError;
use crate::router::{Request, Router, RouterConfig};
use crate::signal::{Opaque, Signal};
use crate::uri::ParsedUrl;
use parking_lot::RwLock;
use std::fmt;

/// Id of the endpoint managed by [`SimpleRouter`].
pub const SIMPLE_ENDPOINT_ID: &str = "simple";

/// A [`Router`] restricted to one base URL.
pub struct SimpleRouter<R> {
    router: Router<R>,
    base: RwLock<Option<Endpoint<R>>>,
}

impl<R: 'static> SimpleRouter<R> {
    /// Create a router without a base.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router without a base, using `config`.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            router: Router::with_config(config),
            base: RwLock::new(None),
        }
    }

    /// Set the base URL. Scheme, host and explicit port become the endpoint's
    /// constraints; parts the URL leaves out accept anything.
    ///
    /// Setting a new base drops the paths added under the previous one.
    pub fn set_base(&self, url: &str) -> Result<(), RouterError> {
        let parsed = ParsedUrl::parse(url)?;
        let mut endpoint = Endpoint::routable(SIMPLE_ENDPOINT_ID).scheme(parsed.scheme());
        if let Some(host) = parsed.host() {
            endpoint = endpoint.host(host);
        }
        if let Some(port) = parsed.explicit_port() {
            endpoint = endpoint.port(port);
        }

        let mut base = self.base.write();
        self.router.clear();
        self.router.register_endpoint(endpoint.clone())?;
        *base = Some(endpoint);
        crate::debug_log!("SimpleRouter base set to '{}'", parsed.clean());
        Ok(())
    }

    /// `true` once [`set_base`](Self::set_base) succeeded.
    pub fn has_base(&self) -> bool {
        self.base.read().is_some()
    }

    /// Add a path expression under the base.
    pub fn add_path<F>(&self, expression: impl Into<String>, handler: F) -> Result<(), RouterError>
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        let base = self.base.read();
        let endpoint = base.as_ref().ok_or(RouterError::BaseNotSet)?;
        self.router
            .register(endpoint.clone(), vec![Branch::new(expression, handler)])
    }

    /// Dispatch `url` with an optional context.
    pub fn proceed(&self, url: &str, context: Option<Opaque>) -> Result<R, RouterError> {
        self.router.proceed(Request::new(url).with_context(context))
    }

    /// Remove all paths; the base stays.
    pub fn clear_paths(&self) -> Result<(), RouterError> {
        let base = self.base.read();
        self.router.clear();
        if let Some(endpoint) = base.as_ref() {
            self.router.register_endpoint(endpoint.clone())?;
        }
        Ok(())
    }

    /// The wrapped router.
    pub fn router(&self) -> &Router<R> {
        &self.router
    }
}

impl<R: 'static> Default for SimpleRouter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for SimpleRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRouter")
            .field("base", &*self.base.read())
            .field("router", &self.router)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
