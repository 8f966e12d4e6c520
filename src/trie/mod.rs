//! # Trie Module
//!
//! Segment-keyed prefix tree backing the fast dispatch path. Each node keeps
//! static children in a hash map (looked up directly, never scanned) and
//! dynamic children in an ordered list whose order is insertion order -
//! which, because routes are inserted in descending-priority order, makes
//! every linear scan yield the highest-priority candidate first. Static
//! children are preferred over any dynamic sibling regardless of priority;
//! that preference is the trie's one documented exception to priority order.

mod node;
#[cfg(test)]
mod tests;

pub(crate) use node::Node;

use crate::pattern::Segment;
use crate::route::Route;
use crate::router::ParamVec;
use std::collections::BTreeSet;

/// The route trie. Built once during collection freeze, read-only afterwards.
#[derive(Debug, Default)]
pub(crate) struct Trie {
    root: Node,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trie-compatible route under its parsed segments.
    pub fn insert(&mut self, route_index: usize, segments: &[Segment]) {
        self.root.insert(route_index, segments);
    }

    /// Depth-first backtracking match. Returns the first route consistent
    /// with the walk order (static child first, then dynamic children in
    /// priority order) whose method set contains `method`. Methods of
    /// URI-matching terminals that reject the method accumulate in
    /// `allowed`.
    pub fn find(
        &self,
        routes: &[Route],
        method: &str,
        segments: &[&str],
        params: &mut ParamVec,
        allowed: &mut BTreeSet<String>,
    ) -> Option<usize> {
        self.root.find(routes, method, segments, 0, params, allowed)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}
