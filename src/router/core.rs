use crate::pattern;
use crate::route::Route;
use crate::trie::Trie;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

/// Maximum number of extracted parameters before heap allocation. Most REST
/// patterns carry well under eight placeholders.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match path. Names are `Arc<str>`
/// because they come from the frozen route table; values are per-request
/// strings taken from the URI.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Look up an extracted parameter by name. Duplicate names keep the last
/// occurrence (last write wins).
#[must_use]
pub fn get_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Copy extracted parameters into an owned map. Allocates; prefer
/// [`get_param`] in hot paths.
#[must_use]
pub fn params_map(params: &ParamVec) -> HashMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Outcome of matching a `(method, path)` pair against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// A route accepted the request. `route_index` points into the
    /// priority-sorted route vector.
    Hit {
        route_index: usize,
        params: ParamVec,
    },
    /// The URI matched at least one route, but none under this method.
    /// `allowed` is sorted and deduplicated.
    MethodNotAllowed { allowed: Vec<String> },
    /// No registered route matched the URI under any method.
    NotFound,
}

impl MatchResult {
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, MatchResult::Hit { .. })
    }
}

/// The frozen route collection.
///
/// Built once from registered routes; afterwards every structure is
/// read-only and safe for unsynchronized concurrent readers. The route
/// vector is sorted by descending priority with registration order breaking
/// ties, and `route_index` values everywhere refer to positions in that
/// sorted order.
pub struct Router {
    routes: Vec<Route>,
    /// method → URI → route index. Parameter-less fast path; probing
    /// allocates nothing.
    static_table: HashMap<String, HashMap<String, usize>>,
    trie: Trie,
    /// Routes whose patterns the trie cannot express, in priority order.
    fallback: Vec<usize>,
    /// First registration wins on name collisions.
    name_index: HashMap<String, usize>,
}

impl Router {
    /// Freeze a set of registered routes into a matcher.
    ///
    /// The input order is the registration order; it breaks priority ties
    /// and decides name-collision winners.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        let mut indexed: Vec<(usize, Route)> = routes.into_iter().enumerate().collect();
        indexed.sort_by_key(|(registered, route)| (Reverse(route.priority()), *registered));

        let registration_order: Vec<usize> = indexed.iter().map(|(r, _)| *r).collect();
        let routes: Vec<Route> = indexed.into_iter().map(|(_, route)| route).collect();

        let mut name_index: HashMap<String, usize> = HashMap::new();
        let mut by_registration: Vec<(usize, usize)> = registration_order
            .iter()
            .copied()
            .enumerate()
            .map(|(sorted, registered)| (registered, sorted))
            .collect();
        by_registration.sort_by_key(|(registered, _)| *registered);
        for (_, sorted) in by_registration {
            let name = routes[sorted].name();
            if !name.is_empty() && !name_index.contains_key(name) {
                name_index.insert(name.to_string(), sorted);
            }
        }

        let mut static_table: HashMap<String, HashMap<String, usize>> = HashMap::new();
        let mut trie = Trie::new();
        let mut fallback = Vec::new();
        for (index, route) in routes.iter().enumerate() {
            if route.parameter_names().is_empty() {
                for method in route.methods() {
                    static_table
                        .entry(method.clone())
                        .or_default()
                        .entry(route.pattern().to_string())
                        .or_insert(index);
                }
            }
            if route.is_trie_compatible() {
                trie.insert(index, route.segments());
            } else {
                fallback.push(index);
            }
        }

        let static_entries: usize = static_table.values().map(HashMap::len).sum();
        info!(
            routes_count = routes.len(),
            static_entries,
            fallback_count = fallback.len(),
            "Routing table frozen"
        );

        Self {
            routes,
            static_table,
            trie,
            fallback,
            name_index,
        }
    }

    /// All routes, sorted by descending priority (stable by registration
    /// order).
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// O(1) lookup of a named route. First registration wins on collisions.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        self.name_index.get(name).map(|&i| &self.routes[i])
    }

    /// Match a request against the table.
    ///
    /// The method is upper-cased, the static table is probed, the trie is
    /// walked, the fallback list is scanned, and a fruitless `HEAD` pass is
    /// repeated as `GET`. The result is a pure function of the inputs;
    /// malformed URIs simply do not match.
    #[must_use]
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult {
        let method = normalize_method(method);
        let mut allowed = BTreeSet::new();

        if let Some((index, params)) = self.match_with(&method, path, &mut allowed) {
            return MatchResult::Hit {
                route_index: index,
                params,
            };
        }
        // HEAD falls back to GET only after every explicit HEAD route has
        // been exhausted.
        if method == "HEAD" {
            if let Some((index, params)) = self.match_with("GET", path, &mut allowed) {
                return MatchResult::Hit {
                    route_index: index,
                    params,
                };
            }
        }
        if allowed.is_empty() {
            MatchResult::NotFound
        } else {
            MatchResult::MethodNotAllowed {
                allowed: allowed.into_iter().collect(),
            }
        }
    }

    /// Sorted union of every method some route would accept for `path`.
    /// Empty when no route matches the URI at all.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut allowed = BTreeSet::new();
        // The empty method is never registered, so every URI match lands in
        // the accumulator.
        let _ = self.match_with("", path, &mut allowed);
        allowed.into_iter().collect()
    }

    /// Print the frozen table to stdout.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} -> {} (name={}, priority={})",
                route.methods().join("|"),
                route.pattern(),
                route.handler(),
                if route.name().is_empty() {
                    "-"
                } else {
                    route.name()
                },
                route.priority()
            );
        }
    }

    fn match_with(
        &self,
        method: &str,
        path: &str,
        allowed: &mut BTreeSet<String>,
    ) -> Option<(usize, ParamVec)> {
        if let Some(&index) = self
            .static_table
            .get(method)
            .and_then(|table| table.get(path))
        {
            return Some((index, ParamVec::new()));
        }

        let segments = pattern::split_path(path);
        let mut params = ParamVec::new();
        if let Some(index) = self
            .trie
            .find(&self.routes, method, &segments, &mut params, allowed)
        {
            return Some((index, params));
        }

        for &index in &self.fallback {
            let route = &self.routes[index];
            if let Some(params) = route.match_path(path) {
                if route.allows_method(method) {
                    return Some((index, params));
                }
                for m in route.methods() {
                    allowed.insert(m.clone());
                }
            }
        }

        None
    }

    pub(crate) fn static_table(&self) -> &HashMap<String, HashMap<String, usize>> {
        &self.static_table
    }

    pub(crate) fn trie(&self) -> &Trie {
        &self.trie
    }

    pub(crate) fn fallback(&self) -> &[usize] {
        &self.fallback
    }

    pub(crate) fn name_index(&self) -> &HashMap<String, usize> {
        &self.name_index
    }
}

/// Upper-case a method without allocating for the already-upper common case.
fn normalize_method(method: &str) -> Cow<'_, str> {
    if method.bytes().any(|b| b.is_ascii_lowercase()) {
        Cow::Owned(method.to_ascii_uppercase())
    } else {
        Cow::Borrowed(method)
    }
}
