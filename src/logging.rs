//! Logging for the dispatcher.
//!
//! Two layers live here:
//!
//! - Macros (`trace_log!` .. `error_log!`) that forward to either the
//!   [`log`](https://docs.rs/log) or [`tracing`](https://docs.rs/tracing)
//!   crate depending on the enabled feature. All records use the
//!   `neuro_router` target so they can be filtered as one unit.
//! - [`RouteLogger`], a set of routing lifecycle callbacks. The router calls
//!   them at fixed points of `find_route` / `proceed`; [`DefaultLogger`]
//!   turns them into macro calls.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |

/// Target used by every record emitted from this crate.
pub const LOG_TARGET: &str = "neuro_router";

/// Emit a **trace**-level record under the crate target.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit a **debug**-level record under the crate target.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit an **info**-level record under the crate target.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::info!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit a **warn**-level record under the crate target.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

/// Emit an **error**-level record under the crate target.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!(target: $crate::logging::LOG_TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::error!(target: $crate::logging::LOG_TARGET, $($arg)*);
    };
}

// ============================================================================
// RouteLogger
// ============================================================================

/// Callbacks fired while a URL travels through the router.
///
/// Every method has an empty default body, so implementors only override
/// the events they care about.
///
/// # Example
///
/// ```
/// use neuro_router::RouteLogger;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct MissCounter(AtomicUsize);
///
/// impl RouteLogger for MissCounter {
///     fn on_url_has_no_result(&self, _url: &str) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait RouteLogger: Send + Sync + 'static {
    /// `proceed` was called for `url`.
    fn on_routing_url(&self, _url: &str) {}

    /// No endpoint (or no branch) could be selected for `url`.
    fn on_url_has_no_result(&self, _url: &str) {}

    /// `url` resolved to `endpoint_id`, and to `branch` when one was selected.
    fn on_url_has_result(&self, _url: &str, _endpoint_id: &str, _branch: Option<&str>) {}

    /// The endpoint hook halted dispatch before the branch handler ran.
    fn on_endpoint_halted(&self, _url: &str) {}

    /// `find_route` started for `url`.
    fn on_find_route_started(&self, _url: &str) {}

    /// `find_route` finished for `url`.
    fn on_find_route_finished(&self, _url: &str) {}
}

/// [`RouteLogger`] that writes every event through the logging macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger;

impl RouteLogger for DefaultLogger {
    fn on_routing_url(&self, url: &str) {
        debug_log!("Routing url '{}'", url);
    }

    fn on_url_has_no_result(&self, url: &str) {
        debug_log!("No route for url '{}'", url);
    }

    fn on_url_has_result(&self, url: &str, endpoint_id: &str, branch: Option<&str>) {
        debug_log!(
            "Url '{}' resolved to endpoint '{}' branch {:?}",
            url,
            endpoint_id,
            branch
        );
    }

    fn on_endpoint_halted(&self, url: &str) {
        debug_log!("Endpoint hook halted dispatch of '{}'", url);
    }

    fn on_find_route_started(&self, url: &str) {
        trace_log!("find_route started for '{}'", url);
    }

    fn on_find_route_finished(&self, url: &str) {
        trace_log!("find_route finished for '{}'", url);
    }
}
