//! Error handling for the router.
//!
//! [`RouterError`] covers both hard failures (malformed URL, bad path
//! expression at registration) and the ordinary "nothing matched" outcomes
//! of dispatch. Handler results never pass through this type: `proceed`
//! returns `Result<R, RouterError>` where `R` is whatever the handler yields.
//!
//! # Examples
//!
//! ```
//! use neuro_router::RouterError;
//!
//! let err = RouterError::NotFound { url: "app://home/missing".into() };
//! assert!(err.is_not_found());
//! assert_eq!(err.to_string(), "No route found for url: app://home/missing");
//! ```

use thiserror::Error;

/// Errors produced while registering routes or dispatching a URL.
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    /// The URL could not be parsed.
    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A path expression produced a pattern that does not compile.
    #[error("Invalid path expression '{expression}': {source}")]
    PatternCompile {
        expression: String,
        #[source]
        source: regex::Error,
    },

    /// A branch was registered with an empty expression.
    #[error("Path expression must not be blank")]
    BlankExpression,

    /// A branch used an expression reserved for endpoint-level handlers.
    #[error(
        "Path expression '{expression}' is reserved; use the endpoint's no-path or other-path handler instead"
    )]
    ReservedExpression { expression: String },

    /// The endpoint id is already registered with a different kind.
    #[error("Endpoint '{id}' is already registered with a different kind")]
    EndpointConflict { id: String },

    /// `SimpleRouter` was used before a base URL was set.
    #[error("Base url is not set; call SimpleRouter::set_base first")]
    BaseNotSet,

    /// No endpoint or branch matched the URL.
    #[error("No route found for url: {url}")]
    NotFound { url: String },

    /// The resolved route could not be re-matched during signal extraction.
    #[error("Resolved route does not match url: {url}")]
    Match { url: String },
}

impl RouterError {
    /// `true` for outcomes callers should treat as "no route".
    ///
    /// `Match` is included: it only signals an internal inconsistency, which
    /// callers cannot act on differently from a plain miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Match { .. })
    }

    /// `true` if the URL itself was malformed.
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }

    /// `true` for errors raised by a rejected registration.
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Self::PatternCompile { .. }
                | Self::BlankExpression
                | Self::ReservedExpression { .. }
                | Self::EndpointConflict { .. }
        )
    }

    pub(crate) fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }
}

// ============================================================================
// Tests
// ============================================================================
