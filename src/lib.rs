//! # neuro-router
//!
//! URL dispatcher for deep links. Endpoints match a URL by scheme, host and
//! port; path expressions under each endpoint pick the handler.
//!
//! # Features
//!
//! | Feature | What it does | Default |
//! |---------|--------------|---------|
//! | `log` | Route events through the `log` crate | yes |
//! | `tracing` | Route events through `tracing` instead | no |
//! | `cache` | LRU cache of route decisions | yes |
//!
//! # Path expressions
//!
//! | Expression | Matches | Variables |
//! |------------|---------|-----------|
//! | `/login` | `/login` | none |
//! | `/messages/<id>` | `/messages/42` | `id = "42"` |
//! | `/users/<>/posts` | `/users/7/posts` | none |
//! | `/files/<path:.+>` | `/files/a/b.txt` | `path = "a/b.txt"` |
//!
//! When several expressions match, the one with more literal segments wins,
//! and any expression whose placeholder can span `/` loses to every exact one.
//! See [`specificity`].
//!
//! # Quick start
//!
//! ```
//! use neuro_router::{Branch, Endpoint, HookAction, Request, Router};
//!
//! let router: Router<String> = Router::new();
//! router
//!     .register(
//!         Endpoint::routable("app")
//!             .scheme("app")
//!             .host("home")
//!             .on_process(|signal| {
//!                 if signal.query("blocked").is_some() {
//!                     HookAction::halt("blocked".to_string())
//!                 } else {
//!                     HookAction::Continue
//!                 }
//!             }),
//!         vec![Branch::new("/files/<path:.+>", |signal| {
//!             format!("open {}", signal.variable("path").unwrap_or_default())
//!         })],
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     router.proceed(Request::new("app://home/files/docs/a.txt")).unwrap(),
//!     "open docs/a.txt"
//! );
//! assert_eq!(
//!     router.proceed(Request::new("app://home/files/a?blocked")).unwrap(),
//!     "blocked"
//! );
//! ```

pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod middleware;
pub mod params;
pub mod pattern;
pub mod registry;
pub mod resolve;
pub mod router;
pub mod signal;
pub mod simple;
pub mod specificity;
pub mod uri;

#[cfg(feature = "cache")]
pub mod cache;

pub use endpoint::{Branch, BranchKind, ChosenEndpoint, Endpoint, EndpointKind, Handler, RegisteredBranch};
pub use error::RouterError;
pub use lifecycle::HookAction;
pub use logging::{DefaultLogger, RouteLogger};
pub use middleware::{
    preprocessor_fn, processor_fn, DirectProcessor, FnPreprocessor, FnProcessor, PassThrough,
    Preprocessor, Processor,
};
pub use params::{PathVariables, QueryParams};
pub use resolve::RouteDecision;
pub use router::{Request, Router, RouterConfig};
pub use signal::{opaque, Opaque, Signal};
pub use simple::SimpleRouter;
pub use uri::ParsedUrl;

#[cfg(feature = "cache")]
pub use cache::CacheStats;
