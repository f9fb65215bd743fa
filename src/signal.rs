//! The bundle handed to handlers.
//!
//! A [`Signal`] is built once per dispatch from the [`RouteDecision`]: the
//! path variables come from re-matching the whole URL against a regex built
//! from the chosen endpoint and branch, the queries from the URL's query
//! string.
//!
//! # Example
//!
//! ```
//! use neuro_router::{Branch, Endpoint, Request, Router};
//!
//! let router: Router<String> = Router::new();
//! router
//!     .register(
//!         Endpoint::routable("app").scheme("app").host("home"),
//!         vec![Branch::new("/messages/<message_id>", |signal| {
//!             format!(
//!                 "{} from {}",
//!                 signal.variable("message_id").unwrap_or_default(),
//!                 signal.query("source").unwrap_or_default()
//!             )
//!         })],
//!     )
//!     .unwrap();
//!
//! let result = router.proceed(Request::new("app://home/messages/42?source=push")).unwrap();
//! assert_eq!(result, "42 from push");
//! ```

use crate::endpoint::BranchKind;
use crate::error::RouterError;
use crate::params::{PathVariables, QueryParams};
use crate::pattern::collect_variables;
use crate::resolve::RouteDecision;
use regex::Regex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied value carried through dispatch without interpretation.
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// Wrap `value` as an [`Opaque`].
pub fn opaque<T: Any + Send + Sync>(value: T) -> Opaque {
    Arc::new(value)
}

/// Everything a handler learns about the URL it was called for.
#[derive(Clone, Default)]
pub struct Signal {
    url: String,
    context: Option<Opaque>,
    args: Option<Opaque>,
    variables: PathVariables,
    queries: QueryParams,
    fragment: Option<String>,
}

impl Signal {
    /// Build a signal from parts.
    pub fn new(url: impl Into<String>, variables: PathVariables, queries: QueryParams) -> Self {
        Self {
            url: url.into(),
            variables,
            queries,
            ..Self::default()
        }
    }

    /// Attach a caller context.
    pub fn with_context(mut self, context: Option<Opaque>) -> Self {
        self.context = context;
        self
    }

    /// Attach caller arguments.
    pub fn with_args(mut self, args: Option<Opaque>) -> Self {
        self.args = args;
        self
    }

    /// Attach the URL fragment.
    pub fn with_fragment(mut self, fragment: Option<String>) -> Self {
        self.fragment = fragment;
        self
    }

    /// The normalized URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The caller context, downcast to `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_deref()?.downcast_ref()
    }

    /// The caller context as passed in.
    pub fn raw_context(&self) -> Option<&Opaque> {
        self.context.as_ref()
    }

    /// The caller arguments, downcast to `T`.
    pub fn args<T: Any>(&self) -> Option<&T> {
        self.args.as_deref()?.downcast_ref()
    }

    /// The caller arguments as passed in.
    pub fn raw_args(&self) -> Option<&Opaque> {
        self.args.as_ref()
    }

    /// Path variables of the matched branch.
    pub fn variables(&self) -> &PathVariables {
        &self.variables
    }

    /// A path variable by name.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name)
    }

    /// Query parameters.
    pub fn queries(&self) -> &QueryParams {
        &self.queries
    }

    /// First value of a query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.queries.get(key)
    }

    /// URL fragment without the `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("url", &self.url)
            .field("has_context", &self.context.is_some())
            .field("has_args", &self.args.is_some())
            .field("variables", &self.variables)
            .field("queries", &self.queries)
            .field("fragment", &self.fragment)
            .finish()
    }
}

// ============================================================================
// Extraction
// ============================================================================

const ANY_SCHEME: &str = "(?:[^:]*://)?";
const ANY_HOST: &str = r"(?:\[[^\]]*\]|[^/:]*)";
const ANY_PORT: &str = "(?::[^/]*)?";
const ANY_PATH: &str = "(?:/.*)?";

/// Regex source matching a URL's scheme, host, port and the decision's path.
fn signal_pattern<R>(decision: &RouteDecision<R>) -> String {
    let chosen = decision.endpoint();

    if decision.url().is_opaque() {
        return format!("^{}:.*$", regex::escape(decision.url().scheme()));
    }

    let scheme = chosen
        .scheme()
        .map_or_else(|| ANY_SCHEME.to_string(), |s| format!("{}://", regex::escape(s)));
    let host = chosen
        .host()
        .map_or_else(|| ANY_HOST.to_string(), regex::escape);
    let port = chosen
        .port()
        .map_or_else(|| ANY_PORT.to_string(), |p| format!("(?::{p})?"));
    let path = match decision.branch().map(|b| b.kind()) {
        Some(BranchKind::Pattern(compiled)) => compiled.pattern().source().to_string(),
        Some(BranchKind::NoPath) => "/?".to_string(),
        Some(BranchKind::NoPathWithSlash) => "/".to_string(),
        Some(BranchKind::OtherPath) | None => ANY_PATH.to_string(),
    };

    format!("^{scheme}{host}{port}{path}$")
}

/// Build the [`Signal`] for `decision`.
///
/// Fails with [`RouterError::Match`] when the URL does not re-match the
/// decision, which only happens if the decision was built for another URL.
pub fn extract_signal<R>(
    decision: &RouteDecision<R>,
    context: Option<Opaque>,
    args: Option<Opaque>,
) -> Result<Signal, RouterError> {
    let url = decision.url();
    let mismatch = || RouterError::Match {
        url: url.raw().to_string(),
    };

    let source = signal_pattern(decision);
    let regex = Regex::new(&source).map_err(|_| mismatch())?;
    let clean = url.clean();
    let caps = regex.captures(&clean).ok_or_else(mismatch)?;

    let variables = match decision.branch().map(|b| b.kind()) {
        Some(BranchKind::Pattern(compiled)) => collect_variables(&caps, compiled.variables()),
        _ => PathVariables::new(),
    };
    let queries = url
        .query()
        .map(QueryParams::from_query_string)
        .unwrap_or_default();

    Ok(Signal::new(url.normalized(), variables, queries)
        .with_context(context)
        .with_args(args)
        .with_fragment(url.fragment().map(str::to_string)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Branch, Endpoint};
    use crate::registry::Registry;
    use crate::resolve::resolve;

    #[derive(Debug, PartialEq)]
    struct Activity(&'static str);

    #[test]
    fn test_context_downcast() {
        let signal = Signal::default().with_context(Some(opaque(Activity("main"))));
        assert_eq!(signal.context::<Activity>(), Some(&Activity("main")));
        assert_eq!(signal.context::<String>(), None);
        assert!(signal.args::<Activity>().is_none());
    }

    #[test]
    fn test_accessors() {
        let mut variables = PathVariables::new();
        variables.insert("id".to_string(), "9".to_string());
        let signal = Signal::new(
            "app://home/a/9?x=1",
            variables,
            QueryParams::from_query_string("x=1"),
        );
        assert_eq!(signal.url(), "app://home/a/9?x=1");
        assert_eq!(signal.variable("id"), Some("9"));
        assert_eq!(signal.query("x"), Some("1"));
        assert_eq!(signal.fragment(), None);
    }

    fn decide(endpoint: Endpoint<()>, branches: Vec<Branch<()>>, url: &str) -> RouteDecision<()> {
        let registry = Registry::new();
        registry.register(endpoint, branches).unwrap();
        resolve(&registry, url).unwrap()
    }

    #[test]
    fn test_extract_with_unconstrained_endpoint() {
        let decision = decide(
            Endpoint::routable("any"),
            vec![Branch::new("/users/<id>/<rest:.+>", |_| ())],
            "http://[::1]:8080/users/5/a/b?x=1&x=2#f",
        );
        let signal = extract_signal(&decision, None, None).unwrap();

        let variables: Vec<_> = signal.variables().iter().collect();
        assert_eq!(variables, [("id", "5"), ("rest", "a/b")]);
        assert_eq!(signal.queries().get_all("x").unwrap(), ["1", "2"]);
        assert_eq!(signal.fragment(), Some("f"));
    }

    #[test]
    fn test_extract_opaque_url_queries() {
        let decision = decide(
            Endpoint::terminal("mail", |_| ()).scheme("mailto"),
            Vec::new(),
            "mailto:someone@example.com?subject=Hi%20there&cc=a&cc=b",
        );
        let signal = extract_signal(&decision, None, None).unwrap();

        assert!(signal.variables().is_empty());
        assert_eq!(signal.query("subject"), Some("Hi there"));
        assert_eq!(signal.queries().get_all("cc").unwrap(), ["a", "b"]);
    }
}
