//! Route resolution.
//!
//! # Architecture
//!
//! Resolution is a two-level lookup over a registry snapshot:
//!
//! 1. **Endpoint**: the first endpoint, in registration order, whose scheme,
//!    host and port constraints all accept the URL.
//! 2. **Branch**: for routable endpoints, chosen from the path:
//!
//! ```text
//! path        branch
//! ----------  ---------------------------------------------------------
//! (none)      no-path handler
//! "/"         no-path-with-slash handler, else no-path handler
//! "/a/b/.."   first matching pattern in bucket order, else other-path
//! ```
//!
//! Terminal endpoints resolve without a branch.
//!
//! The result is a [`RouteDecision`]. A routable endpoint that yields no
//! branch still produces a decision; dispatch reports it as not found.

use crate::endpoint::{ChosenEndpoint, EndpointKind, RegisteredBranch};
use crate::error::RouterError;
use crate::registry::Registry;
use crate::uri::ParsedUrl;
use std::fmt;
use std::sync::Arc;

/// The endpoint and branch selected for one URL.
pub struct RouteDecision<R> {
    endpoint: ChosenEndpoint<R>,
    branch: Option<Arc<RegisteredBranch<R>>>,
    url: ParsedUrl,
}

impl<R> RouteDecision<R> {
    /// The chosen endpoint and its resolved URL parts.
    pub fn endpoint(&self) -> &ChosenEndpoint<R> {
        &self.endpoint
    }

    /// Id of the chosen endpoint.
    pub fn endpoint_id(&self) -> &str {
        self.endpoint.endpoint().id()
    }

    /// The selected branch, if any.
    pub fn branch(&self) -> Option<&Arc<RegisteredBranch<R>>> {
        self.branch.as_ref()
    }

    /// Expression of the selected branch, if any.
    pub fn branch_expression(&self) -> Option<&str> {
        self.branch.as_deref().map(RegisteredBranch::expression)
    }

    /// The parsed URL.
    pub fn url(&self) -> &ParsedUrl {
        &self.url
    }

    /// `true` when dispatching this decision would reach a handler.
    pub fn is_dispatchable(&self) -> bool {
        self.branch.is_some() || self.endpoint.endpoint().kind().is_terminal()
    }
}

impl<R> Clone for RouteDecision<R> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            branch: self.branch.clone(),
            url: self.url.clone(),
        }
    }
}

impl<R> fmt::Debug for RouteDecision<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDecision")
            .field("endpoint", &self.endpoint)
            .field("branch", &self.branch_expression())
            .field("url", &self.url.raw())
            .finish()
    }
}

/// Resolve `url` against `registry`.
///
/// Fails with [`RouterError::InvalidUrl`] for malformed input and
/// [`RouterError::NotFound`] when no endpoint accepts the URL.
pub fn resolve<R>(registry: &Registry<R>, url: &str) -> Result<RouteDecision<R>, RouterError> {
    let parsed = ParsedUrl::parse(url)?;
    resolve_parsed(registry, parsed)
}

/// Resolve an already parsed URL.
pub fn resolve_parsed<R>(
    registry: &Registry<R>,
    url: ParsedUrl,
) -> Result<RouteDecision<R>, RouterError> {
    let snapshot = registry.snapshot();
    let entry = snapshot
        .iter()
        .find(|entry| entry.endpoint().accepts(url.scheme(), url.host(), url.port()))
        .ok_or_else(|| RouterError::not_found(url.raw()))?;

    let branch = match entry.endpoint().kind() {
        EndpointKind::Terminal(_) => None,
        EndpointKind::Routable(routable) => match url.path() {
            None => routable.no_path().cloned(),
            Some("/") => routable
                .no_path_with_slash()
                .or_else(|| routable.no_path())
                .cloned(),
            Some(path) => entry
                .find_branch(path, url.segment_count())
                .or_else(|| routable.other_path().cloned()),
        },
    };

    Ok(RouteDecision {
        endpoint: ChosenEndpoint::nominate(Arc::clone(entry.endpoint()), &url),
        branch,
        url,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Branch, Endpoint};

    fn registry() -> Registry<&'static str> {
        let registry = Registry::new();
        registry
            .register(
                Endpoint::routable("app")
                    .scheme("app")
                    .host("home")
                    .on_no_path(|_| "no-path")
                    .on_other_path(|_| "other"),
                vec![
                    Branch::new("/login", |_| "login"),
                    Branch::new("/messages/<id>", |_| "message"),
                ],
            )
            .unwrap();
        registry
            .register(Endpoint::terminal("mail", |_| "mail").scheme("mailto"), Vec::new())
            .unwrap();
        registry
    }

    #[test]
    fn test_pattern_branch() {
        let decision = resolve(&registry(), "app://home/messages/5").unwrap();
        assert_eq!(decision.endpoint_id(), "app");
        assert_eq!(decision.branch_expression(), Some("/messages/<id>"));
        assert_eq!(decision.endpoint().scheme(), Some("app"));
        assert_eq!(decision.endpoint().port(), None);
    }

    #[test]
    fn test_no_path_and_root_fallback() {
        let registry = registry();
        let decision = resolve(&registry, "app://home").unwrap();
        assert_eq!(decision.branch_expression(), Some(""));

        let decision = resolve(&registry, "app://home/").unwrap();
        assert_eq!(decision.branch_expression(), Some(""));
    }

    #[test]
    fn test_other_path() {
        let decision = resolve(&registry(), "app://home/unknown/deep").unwrap();
        assert_eq!(decision.branch_expression(), Some("*"));
    }

    #[test]
    fn test_terminal_has_no_branch() {
        let decision = resolve(&registry(), "mailto:someone@example.com").unwrap();
        assert_eq!(decision.endpoint_id(), "mail");
        assert!(decision.branch().is_none());
        assert!(decision.is_dispatchable());
    }

    #[test]
    fn test_no_endpoint() {
        let err = resolve(&registry(), "https://example.com/login").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_url() {
        let err = resolve(&registry(), "not a url").unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_routable_without_branch_is_not_dispatchable() {
        let registry: Registry<u8> = Registry::new();
        registry.register(Endpoint::routable("bare"), Vec::new()).unwrap();
        let decision = resolve(&registry, "app://x/anything").unwrap();
        assert!(decision.branch().is_none());
        assert!(!decision.is_dispatchable());
    }
}
