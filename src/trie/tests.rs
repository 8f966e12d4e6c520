use super::Trie;
use crate::pattern;
use crate::route::{HandlerRef, Route};
use crate::router::{get_param, ParamVec};
use std::collections::BTreeSet;

fn route(method: &str, pattern: &str) -> Route {
    Route::builder(pattern, HandlerRef::closure(pattern))
        .methods([method])
        .build()
        .unwrap()
}

fn build(routes: &[Route]) -> Trie {
    let mut trie = Trie::new();
    for (i, r) in routes.iter().enumerate() {
        trie.insert(i, r.segments());
    }
    trie
}

fn find(
    trie: &Trie,
    routes: &[Route],
    method: &str,
    path: &str,
) -> (Option<usize>, ParamVec, Vec<String>) {
    let segments = pattern::split_path(path);
    let mut params = ParamVec::new();
    let mut allowed = BTreeSet::new();
    let hit = trie.find(routes, method, &segments, &mut params, &mut allowed);
    (hit, params, allowed.into_iter().collect())
}

#[test]
fn static_child_wins_over_param_sibling() {
    let routes = vec![route("GET", "/{a}/{b}"), route("GET", "/x/y")];
    let trie = build(&routes);

    let (hit, params, _) = find(&trie, &routes, "GET", "/x/y");
    assert_eq!(hit, Some(1));
    assert!(params.is_empty());

    let (hit, params, _) = find(&trie, &routes, "GET", "/x/z");
    assert_eq!(hit, Some(0));
    assert_eq!(get_param(&params, "a"), Some("x"));
    assert_eq!(get_param(&params, "b"), Some("z"));
}

#[test]
fn param_children_are_tried_in_insertion_order() {
    let routes = vec![
        route("GET", "/users/{id:\\d+}"),
        route("GET", "/users/{slug}"),
    ];
    let trie = build(&routes);

    let (hit, params, _) = find(&trie, &routes, "GET", "/users/42");
    assert_eq!(hit, Some(0));
    assert_eq!(get_param(&params, "id"), Some("42"));

    let (hit, params, _) = find(&trie, &routes, "GET", "/users/abc");
    assert_eq!(hit, Some(1));
    assert_eq!(get_param(&params, "slug"), Some("abc"));
}

#[test]
fn identical_constraints_share_a_child() {
    let routes = vec![
        route("GET", "/users/{id}/posts"),
        route("GET", "/users/{id}/comments"),
    ];
    let trie = build(&routes);
    assert_eq!(trie.root().static_children["users"].param_children.len(), 1);

    let (hit, params, _) = find(&trie, &routes, "GET", "/users/7/comments");
    assert_eq!(hit, Some(1));
    assert_eq!(get_param(&params, "id"), Some("7"));
}

#[test]
fn differing_constraints_keep_separate_children() {
    let routes = vec![
        route("GET", "/users/{id:\\d+}/posts"),
        route("GET", "/users/{id}/posts"),
    ];
    let trie = build(&routes);
    assert_eq!(trie.root().static_children["users"].param_children.len(), 2);
}

#[test]
fn backtracking_discards_partial_captures() {
    let routes = vec![
        route("GET", "/org/{org}/team/{team:\\d+}/members"),
        route("GET", "/org/{org}/team/{team_slug}/stats"),
    ];
    let trie = build(&routes);

    let (hit, params, _) = find(&trie, &routes, "GET", "/org/acme/team/core/stats");
    assert_eq!(hit, Some(1));
    assert_eq!(get_param(&params, "org"), Some("acme"));
    assert_eq!(get_param(&params, "team_slug"), Some("core"));
    assert_eq!(params.len(), 2);
}

#[test]
fn method_mismatch_accumulates_allowed() {
    let routes = vec![
        route("GET", "/items/{id}"),
        route("DELETE", "/items/{id:\\d+}"),
    ];
    let trie = build(&routes);

    let (hit, _, allowed) = find(&trie, &routes, "POST", "/items/9");
    assert_eq!(hit, None);
    assert_eq!(allowed, ["DELETE", "GET"]);
}

#[test]
fn trailing_slash_segments_are_distinct() {
    let routes = vec![route("GET", "/users"), route("GET", "/users/")];
    let trie = build(&routes);

    assert_eq!(find(&trie, &routes, "GET", "/users").0, Some(0));
    assert_eq!(find(&trie, &routes, "GET", "/users/").0, Some(1));
}

#[test]
fn root_pattern_matches_only_root() {
    let routes = vec![route("GET", "/")];
    let trie = build(&routes);

    assert_eq!(find(&trie, &routes, "GET", "/").0, Some(0));
    assert_eq!(find(&trie, &routes, "GET", "/x").0, None);
}
