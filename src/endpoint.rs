//! Endpoints and branches.
//!
//! An [`Endpoint`] accepts URLs by scheme, host and port. Each constraint is
//! a set; an empty set accepts any value. Endpoints come in two kinds:
//!
//! - [`EndpointKind::Routable`]: owns path branches plus three endpoint-level
//!   handlers: no path, bare `/`, and "no branch matched".
//! - [`EndpointKind::Terminal`]: no branches; one handler receives every URL
//!   the endpoint accepts.
//!
//! A [`Branch`] is the user-facing definition of a path expression and its
//! handler. Registration compiles it into a [`RegisteredBranch`].
//!
//! # Example
//!
//! ```
//! use neuro_router::{Branch, Endpoint, HookAction};
//!
//! let web: Endpoint<String> = Endpoint::routable("web")
//!     .scheme("https")
//!     .host("www.mywebsite.com")
//!     .on_no_path(|_signal| "home".to_string())
//!     .on_process(|_signal| HookAction::Continue);
//!
//! let login = Branch::new("/login", |_signal| "login".to_string());
//! assert_eq!(login.expression(), "/login");
//! assert_eq!(web.id(), "web");
//! ```

use crate::error::RouterError;
use crate::lifecycle::HookAction;
use crate::pattern::CompiledPattern;
use crate::signal::Signal;
use crate::specificity::BucketKey;
use crate::uri::ParsedUrl;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Function invoked with the extracted [`Signal`] of a matched URL.
pub type Handler<R> = Arc<dyn Fn(&Signal) -> R + Send + Sync>;

/// Endpoint-level hook that runs before the branch handler.
pub type EndpointHook<R> = Arc<dyn Fn(&Signal) -> HookAction<R> + Send + Sync>;

/// Expression reserved for the no-path handler.
pub const EXPRESSION_NO_PATH: &str = "";
/// Expression reserved for the bare `/` handler.
pub const EXPRESSION_NO_PATH_WITH_SLASH: &str = "/";
/// Expression reserved for the fallback handler.
pub const EXPRESSION_OTHER_PATH: &str = "*";

// ============================================================================
// Branch
// ============================================================================

/// A path expression and its handler, before registration.
pub struct Branch<R> {
    expression: String,
    handler: Handler<R>,
}

impl<R> Branch<R> {
    /// Create a branch. The expression is validated when it is registered.
    pub fn new<F>(expression: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        Self {
            expression: expression.into(),
            handler: Arc::new(handler),
        }
    }

    /// Create a branch from an already shared handler.
    pub fn with_handler(expression: impl Into<String>, handler: Handler<R>) -> Self {
        Self {
            expression: expression.into(),
            handler,
        }
    }

    /// The expression as written.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl<R> Clone for Branch<R> {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R> fmt::Debug for Branch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("expression", &self.expression)
            .finish()
    }
}

/// Add a leading slash and drop one trailing slash.
pub(crate) fn normalize_expression(expression: &str) -> String {
    let trimmed = expression.trim();
    let trimmed = if trimmed.len() > 1 {
        trimmed.strip_suffix('/').unwrap_or(trimmed)
    } else {
        trimmed
    };
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// What a registered branch matches.
#[derive(Debug, Clone)]
pub enum BranchKind {
    /// A compiled path expression.
    Pattern(CompiledPattern),
    /// URLs without a path.
    NoPath,
    /// URLs whose path is exactly `/`.
    NoPathWithSlash,
    /// Any path no pattern matched.
    OtherPath,
}

/// A validated branch stored in the registry.
pub struct RegisteredBranch<R> {
    expression: String,
    key: Option<BucketKey>,
    kind: BranchKind,
    handler: Handler<R>,
}

impl<R> RegisteredBranch<R> {
    /// Validate and compile a user branch.
    pub(crate) fn compile(branch: Branch<R>) -> Result<Self, RouterError> {
        let raw = branch.expression.trim();
        if raw.is_empty() {
            return Err(RouterError::BlankExpression);
        }
        let expression = normalize_expression(raw);
        if expression == EXPRESSION_NO_PATH_WITH_SLASH || raw == EXPRESSION_OTHER_PATH {
            return Err(RouterError::ReservedExpression {
                expression: raw.to_string(),
            });
        }

        let compiled = CompiledPattern::compile(&expression)?;
        Ok(Self {
            key: Some(BucketKey::of(&expression)),
            expression,
            kind: BranchKind::Pattern(compiled),
            handler: branch.handler,
        })
    }

    fn special(kind: BranchKind, expression: &str, handler: Handler<R>) -> Self {
        Self {
            expression: expression.to_string(),
            key: None,
            kind,
            handler,
        }
    }

    /// Normalized expression, or the reserved marker of a special branch.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Bucket key; `None` for endpoint-level branches.
    pub fn key(&self) -> Option<BucketKey> {
        self.key
    }

    /// What this branch matches.
    pub fn kind(&self) -> &BranchKind {
        &self.kind
    }

    /// The handler.
    pub fn handler(&self) -> &Handler<R> {
        &self.handler
    }

    /// Anchored match of `path` against a pattern branch.
    pub fn is_match(&self, path: &str) -> bool {
        match &self.kind {
            BranchKind::Pattern(compiled) => compiled.is_match(path),
            _ => false,
        }
    }
}

impl<R> fmt::Debug for RegisteredBranch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredBranch")
            .field("expression", &self.expression)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Endpoint-level handlers of a routable endpoint.
pub struct Routable<R> {
    no_path: Option<Arc<RegisteredBranch<R>>>,
    no_path_with_slash: Option<Arc<RegisteredBranch<R>>>,
    other_path: Option<Arc<RegisteredBranch<R>>>,
}

impl<R> Routable<R> {
    /// Handler for URLs without a path.
    pub fn no_path(&self) -> Option<&Arc<RegisteredBranch<R>>> {
        self.no_path.as_ref()
    }

    /// Handler for a bare `/` path.
    pub fn no_path_with_slash(&self) -> Option<&Arc<RegisteredBranch<R>>> {
        self.no_path_with_slash.as_ref()
    }

    /// Handler used when no branch matched.
    pub fn other_path(&self) -> Option<&Arc<RegisteredBranch<R>>> {
        self.other_path.as_ref()
    }
}

impl<R> Clone for Routable<R> {
    fn clone(&self) -> Self {
        Self {
            no_path: self.no_path.clone(),
            no_path_with_slash: self.no_path_with_slash.clone(),
            other_path: self.other_path.clone(),
        }
    }
}

/// The two endpoint variants.
pub enum EndpointKind<R> {
    /// Owns path branches.
    Routable(Routable<R>),
    /// Dispatches everything to one handler.
    Terminal(Handler<R>),
}

impl<R> EndpointKind<R> {
    /// `true` for [`EndpointKind::Terminal`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

impl<R> Clone for EndpointKind<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Routable(routable) => Self::Routable(routable.clone()),
            Self::Terminal(handler) => Self::Terminal(Arc::clone(handler)),
        }
    }
}

/// A scheme/host/port matcher. See the module docs.
pub struct Endpoint<R> {
    id: String,
    schemes: BTreeSet<String>,
    hosts: BTreeSet<String>,
    ports: BTreeSet<u16>,
    hook: Option<EndpointHook<R>>,
    kind: EndpointKind<R>,
}

impl<R> Endpoint<R> {
    /// Create a routable endpoint identified by `id`.
    pub fn routable(id: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            EndpointKind::Routable(Routable {
                no_path: None,
                no_path_with_slash: None,
                other_path: None,
            }),
        )
    }

    /// Create a terminal endpoint that sends every accepted URL to `handler`.
    pub fn terminal<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        Self::with_kind(id, EndpointKind::Terminal(Arc::new(handler)))
    }

    fn with_kind(id: impl Into<String>, kind: EndpointKind<R>) -> Self {
        Self {
            id: id.into(),
            schemes: BTreeSet::new(),
            hosts: BTreeSet::new(),
            ports: BTreeSet::new(),
            hook: None,
            kind,
        }
    }

    /// Accept `scheme` (case-insensitive).
    pub fn scheme(mut self, scheme: impl AsRef<str>) -> Self {
        self.schemes.insert(scheme.as_ref().to_ascii_lowercase());
        self
    }

    /// Accept every scheme in `schemes`.
    pub fn schemes<I, S>(self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        schemes.into_iter().fold(self, |endpoint, s| endpoint.scheme(s))
    }

    /// Accept `host` (case-insensitive).
    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.hosts.insert(host.as_ref().to_ascii_lowercase());
        self
    }

    /// Accept every host in `hosts`.
    pub fn hosts<I, S>(self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hosts.into_iter().fold(self, |endpoint, h| endpoint.host(h))
    }

    /// Accept `port`.
    pub fn port(mut self, port: u16) -> Self {
        self.ports.insert(port);
        self
    }

    /// Accept every port in `ports`.
    pub fn ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports.extend(ports);
        self
    }

    /// Install the pre-handling hook. Returning [`HookAction::Halt`] stops
    /// dispatch before the branch handler runs.
    pub fn on_process<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Signal) -> HookAction<R> + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Handler for URLs without a path. Ignored on terminal endpoints.
    pub fn on_no_path<F>(self, handler: F) -> Self
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        self.with_special(BranchKind::NoPath, EXPRESSION_NO_PATH, Arc::new(handler))
    }

    /// Handler for a bare `/` path. Ignored on terminal endpoints.
    pub fn on_no_path_with_slash<F>(self, handler: F) -> Self
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        self.with_special(
            BranchKind::NoPathWithSlash,
            EXPRESSION_NO_PATH_WITH_SLASH,
            Arc::new(handler),
        )
    }

    /// Handler for paths no branch matched. Ignored on terminal endpoints.
    pub fn on_other_path<F>(self, handler: F) -> Self
    where
        F: Fn(&Signal) -> R + Send + Sync + 'static,
    {
        self.with_special(
            BranchKind::OtherPath,
            EXPRESSION_OTHER_PATH,
            Arc::new(handler),
        )
    }

    fn with_special(mut self, kind: BranchKind, expression: &str, handler: Handler<R>) -> Self {
        let EndpointKind::Routable(routable) = &mut self.kind else {
            crate::warn_log!(
                "Terminal endpoint '{}' ignores the '{}' handler",
                self.id,
                expression
            );
            return self;
        };
        let slot = match kind {
            BranchKind::NoPath => &mut routable.no_path,
            BranchKind::NoPathWithSlash => &mut routable.no_path_with_slash,
            BranchKind::OtherPath | BranchKind::Pattern(_) => &mut routable.other_path,
        };
        *slot = Some(Arc::new(RegisteredBranch::special(kind, expression, handler)));
        self
    }

    /// Identifier; endpoints with the same id are the same endpoint.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The endpoint variant.
    pub fn kind(&self) -> &EndpointKind<R> {
        &self.kind
    }

    /// The pre-handling hook, if any.
    pub fn hook(&self) -> Option<&EndpointHook<R>> {
        self.hook.as_ref()
    }

    /// Accepted schemes; empty accepts all.
    pub fn accepted_schemes(&self) -> &BTreeSet<String> {
        &self.schemes
    }

    /// Accepted hosts; empty accepts all.
    pub fn accepted_hosts(&self) -> &BTreeSet<String> {
        &self.hosts
    }

    /// Accepted ports; empty accepts all.
    pub fn accepted_ports(&self) -> &BTreeSet<u16> {
        &self.ports
    }

    /// `true` if every constraint accepts the corresponding URL part.
    ///
    /// `scheme` and `host` are compared case-insensitively, `port` exactly.
    pub fn accepts(&self, scheme: &str, host: Option<&str>, port: Option<u16>) -> bool {
        let scheme_ok =
            self.schemes.is_empty() || self.schemes.contains(&scheme.to_ascii_lowercase());
        let host_ok = self.hosts.is_empty()
            || host.is_some_and(|h| self.hosts.contains(&h.to_ascii_lowercase()));
        let port_ok = self.ports.is_empty() || port.is_some_and(|p| self.ports.contains(&p));
        scheme_ok && host_ok && port_ok
    }
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            schemes: self.schemes.clone(),
            hosts: self.hosts.clone(),
            ports: self.ports.clone(),
            hook: self.hook.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<R> fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("schemes", &self.schemes)
            .field("hosts", &self.hosts)
            .field("ports", &self.ports)
            .field("terminal", &self.kind.is_terminal())
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

// ============================================================================
// ChosenEndpoint
// ============================================================================

/// An endpoint together with the URL parts it was selected for.
///
/// Each part is `Some` only when the endpoint constrains that field; an
/// unconstrained field stays `None` and is matched permissively later.
pub struct ChosenEndpoint<R> {
    endpoint: Arc<Endpoint<R>>,
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl<R> ChosenEndpoint<R> {
    /// Pin the constrained fields of `endpoint` to the values in `url`.
    pub(crate) fn nominate(endpoint: Arc<Endpoint<R>>, url: &ParsedUrl) -> Self {
        let scheme = (!endpoint.schemes.is_empty()).then(|| url.scheme().to_string());
        let host = if endpoint.hosts.is_empty() {
            None
        } else {
            url.host().map(str::to_string)
        };
        let port = if endpoint.ports.is_empty() {
            None
        } else {
            url.port()
        };
        Self {
            endpoint,
            scheme,
            host,
            port,
        }
    }

    /// The selected endpoint.
    pub fn endpoint(&self) -> &Arc<Endpoint<R>> {
        &self.endpoint
    }

    /// Resolved scheme, if the endpoint constrains schemes.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Resolved host, if the endpoint constrains hosts.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Resolved port, if the endpoint constrains ports.
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl<R> Clone for ChosenEndpoint<R> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl<R> fmt::Debug for ChosenEndpoint<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChosenEndpoint")
            .field("endpoint", &self.endpoint.id)
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
