//! Test utilities for routing tests
//!
//! Provides fixtures, recording helpers, and assertion utilities shared by
//! the integration tests.

#![allow(dead_code)]

use neuro_router::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Initialize `env_logger` once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Router returning the matched expression's label, without the event logger.
pub fn quiet_router() -> Router<String> {
    init_logging();
    Router::with_config(RouterConfig::new().log_events(false))
}

/// Branch whose handler returns `label`.
pub fn labeled(expression: &str, label: &str) -> Branch<String> {
    let label = label.to_string();
    Branch::new(expression, move |_| label.clone())
}

/// Branch whose handler returns `label:name=value,...` for its variables.
pub fn echoing(expression: &str, label: &str) -> Branch<String> {
    let label = label.to_string();
    Branch::new(expression, move |signal| {
        let vars: Vec<String> = signal
            .variables()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{label}:{}", vars.join(","))
    })
}

/// The `app://home` endpoint used across tests.
pub fn app_endpoint() -> Endpoint<String> {
    Endpoint::routable("app")
        .scheme("app")
        .host("home")
        .on_no_path(|_| "no-path".to_string())
        .on_other_path(|_| "other".to_string())
}

/// Call counter that can be moved into handlers.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Assert `url` dispatches to `expected`.
pub fn assert_routes_to(router: &Router<String>, url: &str, expected: &str) {
    let result = router.proceed(Request::new(url));
    assert_eq!(
        result.as_deref().ok(),
        Some(expected),
        "url '{}' produced {:?}",
        url,
        result
    );
}

/// Assert `url` yields a not-found error.
pub fn assert_not_found(router: &Router<String>, url: &str) {
    let result = router.proceed(Request::new(url));
    assert!(
        matches!(&result, Err(err) if err.is_not_found()),
        "url '{}' should not be found, got {:?}",
        url,
        result
    );
}
