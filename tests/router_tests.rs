#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the hybrid dispatch
//!
//! # Test Coverage
//!
//! Validates the full match pipeline over realistic route tables:
//! - Static-table fast path vs. trie vs. fallback agreement
//! - Priority and registration-order tie-breaking
//! - Constrained placeholders and sibling ordering
//! - HEAD→GET reduction after explicit HEAD routes
//! - 405 accumulation across static, trie, and fallback structures
//!
//! # Test Strategy
//!
//! Each test builds a small frozen table and asserts the exact winning
//! route and extracted parameters, or the exact 405/404 outcome.

use switchback::route::{HandlerRef, Route};
use switchback::router::{get_param, params_map, MatchResult, Router};

fn route(methods: &[&str], pattern: &str) -> Route {
    Route::builder(pattern, HandlerRef::closure(pattern))
        .methods(methods.iter().copied())
        .build()
        .unwrap()
}

fn hit_pattern<'r>(router: &'r Router, method: &str, path: &str) -> (&'r str, Vec<(String, String)>) {
    match router.match_route(method, path) {
        MatchResult::Hit {
            route_index,
            params,
        } => {
            let mut pairs: Vec<(String, String)> = params_map(&params).into_iter().collect();
            pairs.sort();
            (router.routes()[route_index].pattern(), pairs)
        }
        other => panic!("expected hit for {method} {path}, got {other:?}"),
    }
}

#[test]
fn constrained_route_wins_before_unconstrained_sibling() {
    let router = Router::new(vec![
        Route::get("/users/{id:\\d+}", HandlerRef::closure("show"))
            .name("users.show")
            .build()
            .unwrap(),
        route(&["GET"], "/users/{slug}"),
    ]);

    let (pattern, params) = hit_pattern(&router, "GET", "/users/42");
    assert_eq!(pattern, "/users/{id:\\d+}");
    assert_eq!(params, [("id".to_string(), "42".to_string())]);

    let (pattern, params) = hit_pattern(&router, "GET", "/users/abc");
    assert_eq!(pattern, "/users/{slug}");
    assert_eq!(params, [("slug".to_string(), "abc".to_string())]);

    match router.match_route("POST", "/users/42") {
        MatchResult::MethodNotAllowed { allowed } => assert_eq!(allowed, ["GET"]),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn head_reduction_runs_after_explicit_head_routes() {
    let router = Router::new(vec![
        route(&["GET"], "/posts"),
        route(&["HEAD"], "/posts/special"),
    ]);

    assert_eq!(hit_pattern(&router, "HEAD", "/posts").0, "/posts");
    assert_eq!(
        hit_pattern(&router, "HEAD", "/posts/special").0,
        "/posts/special"
    );
    assert_eq!(
        router.match_route("HEAD", "/missing"),
        MatchResult::NotFound
    );
}

#[test]
fn explicit_head_route_is_never_shadowed_by_reduction() {
    let router = Router::new(vec![
        route(&["GET"], "/stats"),
        route(&["HEAD"], "/stats"),
    ]);
    let (pattern, _) = hit_pattern(&router, "HEAD", "/stats");
    assert_eq!(pattern, "/stats");
    // The HEAD route itself, not the GET one reached via reduction.
    match router.match_route("HEAD", "/stats") {
        MatchResult::Hit { route_index, .. } => {
            assert_eq!(router.routes()[route_index].methods(), ["HEAD"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn slash_matching_constraint_goes_through_fallback() {
    let router = Router::new(vec![route(&["GET"], "/files/{path:[A-Za-z0-9/_.\\-]+}")]);

    assert!(!router.routes()[0].is_trie_compatible());
    let (_, params) = hit_pattern(&router, "GET", "/files/a/b/c.txt");
    assert_eq!(params, [("path".to_string(), "a/b/c.txt".to_string())]);
}

#[test]
fn static_route_beats_higher_priority_dynamic_route() {
    let router = Router::new(vec![
        Route::get("/{a}/{b}", HandlerRef::closure("dynamic"))
            .priority(10)
            .build()
            .unwrap(),
        route(&["GET"], "/x/y"),
    ]);

    assert_eq!(hit_pattern(&router, "GET", "/x/y").0, "/x/y");

    let (pattern, params) = hit_pattern(&router, "GET", "/x/z");
    assert_eq!(pattern, "/{a}/{b}");
    assert_eq!(
        params,
        [
            ("a".to_string(), "x".to_string()),
            ("b".to_string(), "z".to_string())
        ]
    );
}

#[test]
fn priority_breaks_ties_before_registration_order() {
    let router = Router::new(vec![
        route(&["GET"], "/v/{x}"),
        Route::get("/v/{y}", HandlerRef::closure("late-but-high"))
            .priority(1)
            .build()
            .unwrap(),
    ]);
    assert_eq!(hit_pattern(&router, "GET", "/v/q").0, "/v/{y}");
}

#[test]
fn method_not_allowed_collects_across_all_structures() {
    let router = Router::new(vec![
        route(&["GET"], "/resource"),
        route(&["POST"], "/resource"),
        route(&["DELETE"], "/{any:.+}"),
    ]);
    match router.match_route("PATCH", "/resource") {
        MatchResult::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, ["DELETE", "GET", "POST"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn never_not_found_when_uri_is_known() {
    // Invariant: if any route matches the URI under some method, a bad
    // method yields MethodNotAllowed, not NotFound.
    let router = Router::new(vec![
        route(&["PUT"], "/a/{id}"),
        route(&["POST"], "/a/{id:\\d+}"),
    ]);
    for method in ["GET", "HEAD", "OPTIONS", "TRACE"] {
        match router.match_route(method, "/a/7") {
            MatchResult::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, ["POST", "PUT"], "method {method}");
            }
            other => panic!("unexpected for {method}: {other:?}"),
        }
    }
}

#[test]
fn trailing_slash_is_significant() {
    let router = Router::new(vec![route(&["GET"], "/users"), route(&["GET"], "/users/")]);
    assert_eq!(hit_pattern(&router, "GET", "/users").0, "/users");
    assert_eq!(hit_pattern(&router, "GET", "/users/").0, "/users/");
    assert_eq!(
        router.match_route("GET", "/users//"),
        MatchResult::NotFound
    );
}

#[test]
fn root_route_matches_only_root() {
    let router = Router::new(vec![route(&["GET"], "/")]);
    assert_eq!(hit_pattern(&router, "GET", "/").0, "/");
    assert_eq!(router.match_route("GET", "/x"), MatchResult::NotFound);
}

#[test]
fn matching_is_byte_exact_without_decoding() {
    let router = Router::new(vec![route(&["GET"], "/exact path")]);
    assert!(router.match_route("GET", "/exact path").is_hit());
    // The percent-encoded form is a different byte sequence.
    assert_eq!(
        router.match_route("GET", "/exact%20path"),
        MatchResult::NotFound
    );
}

#[test]
fn repeated_matches_are_identical() {
    let router = Router::new(vec![
        route(&["GET"], "/users/{id:\\d+}"),
        route(&["GET"], "/users/{slug}"),
        route(&["GET"], "/files/{path:.+}"),
    ]);
    for (method, path) in [
        ("GET", "/users/42"),
        ("GET", "/users/abc"),
        ("GET", "/files/a/b"),
        ("POST", "/users/42"),
        ("GET", "/nope"),
    ] {
        assert_eq!(
            router.match_route(method, path),
            router.match_route(method, path)
        );
    }
}

#[test]
fn deep_backtracking_keeps_outer_captures() {
    let router = Router::new(vec![
        route(&["GET"], "/api/{version}/users/{id:\\d+}/posts"),
        route(&["GET"], "/api/{version}/users/{slug}/profile"),
    ]);
    let (pattern, params) = hit_pattern(&router, "GET", "/api/v2/users/alice/profile");
    assert_eq!(pattern, "/api/{version}/users/{slug}/profile");
    assert_eq!(
        params,
        [
            ("slug".to_string(), "alice".to_string()),
            ("version".to_string(), "v2".to_string())
        ]
    );
}

#[test]
fn get_param_returns_last_occurrence() {
    let router = Router::new(vec![route(&["GET"], "/org/{org}/users/{user}")]);
    match router.match_route("GET", "/org/acme/users/bob") {
        MatchResult::Hit { params, .. } => {
            assert_eq!(get_param(&params, "org"), Some("acme"));
            assert_eq!(get_param(&params, "user"), Some("bob"));
            assert_eq!(get_param(&params, "missing"), None);
        }
        other => panic!("unexpected: {other:?}"),
    }
}
