//! Endpoint selection, bucket priority, and normalization.

mod common;

use common::*;
use neuro_router::pattern::{to_pattern, CompiledPattern};
use neuro_router::specificity::BucketKey;
use neuro_router::*;

#[test]
fn test_literal_length_selects_branch() {
    let router = quiet_router();
    router
        .register(
            app_endpoint(),
            vec![
                labeled("/a", "one"),
                labeled("/a/b", "two"),
                labeled("/a/b/c", "three"),
            ],
        )
        .unwrap();

    assert_routes_to(&router, "app://home/a", "one");
    assert_routes_to(&router, "app://home/a/b", "two");
    assert_routes_to(&router, "app://home/a/b/c", "three");
}

#[test]
fn test_literal_beats_wildcard_regardless_of_order() {
    for wildcard_first in [true, false] {
        let router = quiet_router();
        let literal = labeled("/a/b", "literal");
        let wildcard = labeled("/a/<rest:.+>", "wildcard");
        let branches = if wildcard_first {
            vec![wildcard, literal]
        } else {
            vec![literal, wildcard]
        };
        router.register(app_endpoint(), branches).unwrap();

        assert_routes_to(&router, "app://home/a/b", "literal");
        assert_routes_to(&router, "app://home/a/b/c", "wildcard");
    }
}

#[test]
fn test_longer_wildcard_minimum_tried_first() {
    let router = quiet_router();
    router
        .register(
            app_endpoint(),
            vec![
                labeled("/a/<rest:.+>", "short"),
                labeled("/a/b/<rest:.+>", "long"),
            ],
        )
        .unwrap();

    assert_routes_to(&router, "app://home/a/b/c", "long");
    assert_routes_to(&router, "app://home/a/x/c", "short");
}

#[test]
fn test_wildcard_skipped_when_path_too_short() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![labeled("/a/b/<rest:.*>", "wild")])
        .unwrap();

    // a -3 bucket needs at least three segments
    assert_routes_to(&router, "app://home/a/b", "other");
}

#[test]
fn test_exact_match_has_no_variables() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![echoing("/settings/privacy", "privacy")])
        .unwrap();

    let decision = router.find_route("app://home/settings/privacy").unwrap();
    assert_eq!(decision.branch_expression(), Some("/settings/privacy"));
    assert_routes_to(&router, "app://home/settings/privacy", "privacy:");
}

#[test]
fn test_to_pattern_single_group() {
    let pattern = to_pattern("/messages/<id>");
    assert_eq!(pattern.variables(), ["id"]);

    let compiled = CompiledPattern::compile("/messages/<id>").unwrap();
    let vars = compiled.captures("/messages/42").unwrap();
    assert_eq!(vars.get("id"), Some("42"));
}

#[test]
fn test_non_ascii_and_spaced_literals_match() {
    let router = quiet_router();
    router
        .register(
            app_endpoint(),
            vec![
                labeled("/café", "cafe"),
                labeled("/promo/diskon besar", "promo"),
                labeled("/promo/already%20encoded", "encoded"),
            ],
        )
        .unwrap();

    assert_routes_to(&router, "app://home/café", "cafe");
    assert_routes_to(&router, "app://home/caf%C3%A9", "cafe");
    assert_routes_to(&router, "app://home/promo/diskon besar", "promo");
    assert_routes_to(&router, "app://home/promo/diskon%20besar", "promo");
    assert_routes_to(&router, "app://home/promo/already encoded", "encoded");
}

#[test]
fn test_typed_placeholder_reaching_slash_spans_segments() {
    let router = quiet_router();
    router
        .register(
            app_endpoint(),
            vec![
                echoing(r"/hex/<p:[a-z\x2F]+>", "hex"),
                echoing(r"/any/<p:\p{Any}+>", "any"),
                echoing(r"/num/<n:\d+>", "num"),
            ],
        )
        .unwrap();

    assert_routes_to(&router, "app://home/hex/a/b", "hex:p=a/b");
    assert_routes_to(&router, "app://home/any/a/b/c", "any:p=a/b/c");
    assert_routes_to(&router, "app://home/num/42", "num:n=42");
    assert_routes_to(&router, "app://home/num/4/2", "other");
}

#[test]
fn test_scheme_and_host_case_insensitive_port_exact() {
    let router = quiet_router();
    router
        .register(
            Endpoint::routable("dev").scheme("HTTP").host("LocalHost").port(8080),
            vec![labeled("/ping", "pong")],
        )
        .unwrap();

    assert_routes_to(&router, "http://localhost:8080/ping", "pong");
    assert_routes_to(&router, "HTTP://LOCALHOST:8080/ping", "pong");
    assert_not_found(&router, "http://localhost:8081/ping");
    assert_not_found(&router, "http://localhost/ping");
}

#[test]
fn test_default_port_matches_constraint() {
    let router = quiet_router();
    router
        .register(
            Endpoint::routable("secure").scheme("https").port(443),
            vec![labeled("/a", "a")],
        )
        .unwrap();

    assert_routes_to(&router, "https://example.com/a", "a");
    assert_routes_to(&router, "https://example.com:443/a", "a");
}

#[test]
fn test_first_registered_endpoint_wins() {
    let router = quiet_router();
    router
        .register(Endpoint::routable("specific").host("home"), vec![labeled("/x", "specific")])
        .unwrap();
    router
        .register(Endpoint::routable("any"), vec![labeled("/x", "any")])
        .unwrap();

    assert_routes_to(&router, "app://home/x", "specific");
    assert_routes_to(&router, "app://elsewhere/x", "any");
}

#[test]
fn test_duplicate_expression_not_duplicated() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![labeled("/login", "first")])
        .unwrap();
    let entry = router.registry().get("app").unwrap();
    let before = entry.bucket_len(BucketKey::from(1));

    router
        .register(app_endpoint(), vec![labeled("/login", "second"), labeled("login/", "third")])
        .unwrap();
    assert_eq!(entry.bucket_len(BucketKey::from(1)), before);
    assert_routes_to(&router, "app://home/login", "first");
}

#[test]
fn test_no_path_and_trailing_slash() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![labeled("/promo", "promo")])
        .unwrap();

    assert_routes_to(&router, "app://home", "no-path");
    assert_routes_to(&router, "app://home/", "no-path");
    assert_routes_to(&router, "app://home/promo/", "promo");
}

#[test]
fn test_no_path_with_slash_preferred_for_root() {
    let router = quiet_router();
    router
        .register(
            app_endpoint().on_no_path_with_slash(|_| "slash".to_string()),
            Vec::new(),
        )
        .unwrap();

    assert_routes_to(&router, "app://home/", "slash");
    assert_routes_to(&router, "app://home", "no-path");
}

#[test]
fn test_other_path_fallback_and_missing_fallback() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![labeled("/known", "known")])
        .unwrap();
    router
        .register(
            Endpoint::routable("bare").scheme("bare"),
            vec![labeled("/known", "bare-known")],
        )
        .unwrap();

    assert_routes_to(&router, "app://home/unknown", "other");
    assert_not_found(&router, "bare://x/unknown");
    assert_not_found(&router, "bare://x");
}

#[test]
fn test_invalid_urls() {
    let router = quiet_router();
    router.register(app_endpoint(), Vec::new()).unwrap();

    for url in ["", "   ", "home/login", "://missing-scheme"] {
        let err = router.proceed(Request::new(url)).unwrap_err();
        assert!(err.is_invalid_url(), "'{}' gave {:?}", url, err);
    }
}

#[test]
fn test_registration_rejects_bad_batches_atomically() {
    let router = quiet_router();

    let err = router
        .register(app_endpoint(), vec![labeled("/ok", "ok"), labeled("/bad/<x:(>", "bad")])
        .unwrap_err();
    assert!(matches!(err, RouterError::PatternCompile { .. }));
    assert!(router.registry().is_empty());

    for reserved in ["", "/", "*"] {
        let err = router
            .register(app_endpoint(), vec![labeled(reserved, "r")])
            .unwrap_err();
        assert!(err.is_registration());
    }
}

#[test]
fn test_terminal_endpoint_receives_everything() {
    let router = quiet_router();
    router
        .register_endpoint(Endpoint::terminal("mail", |signal| {
            format!("mail:{}", signal.query("subject").unwrap_or_default())
        })
        .scheme("mailto"))
        .unwrap();

    assert_routes_to(&router, "mailto:someone@example.com?subject=hi", "mail:hi");
    assert_routes_to(&router, "mailto:other@example.com", "mail:");
}

#[test]
fn test_terminal_and_routable_conflict() {
    let router = quiet_router();
    router.register(app_endpoint(), Vec::new()).unwrap();
    let err = router
        .register_endpoint(Endpoint::terminal("app", |_| String::new()))
        .unwrap_err();
    assert!(matches!(err, RouterError::EndpointConflict { id } if id == "app"));
}

#[test]
fn test_clear_removes_everything() {
    let router = quiet_router();
    router
        .register(app_endpoint(), vec![labeled("/a", "a")])
        .unwrap();
    assert_routes_to(&router, "app://home/a", "a");

    router.clear();
    assert_not_found(&router, "app://home/a");
    assert!(router.registry().is_empty());
}
