use crate::pattern::{self, Segment};
use crate::route::Route;
use crate::router::ParamVec;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A dynamic child: one placeholder constraint and its subtree. Two entries
/// with identical `(name, regex)` are merged at insertion; siblings with
/// different constraints are kept and tried in order.
#[derive(Debug)]
pub(crate) struct ParamChild {
    pub name: Arc<str>,
    /// The constraint as written in the pattern.
    pub regex_src: String,
    /// The whole-segment form `^(?:…)$` actually applied.
    pub compiled_src: String,
    pub regex: Regex,
    pub node: Node,
}

/// One trie node. `static_children` are hash-indexed by segment literal;
/// `param_children` keep insertion order; `terminal_routes` lists the routes
/// ending here, highest priority first.
#[derive(Debug, Default)]
pub(crate) struct Node {
    pub static_children: HashMap<String, Node>,
    pub param_children: Vec<ParamChild>,
    pub terminal_routes: Vec<usize>,
}

impl Node {
    pub fn insert(&mut self, route_index: usize, segments: &[Segment]) {
        let Some(segment) = segments.first() else {
            self.terminal_routes.push(route_index);
            return;
        };
        let rest = &segments[1..];
        match segment {
            Segment::Static { literal } => {
                self.static_children
                    .entry(literal.clone())
                    .or_default()
                    .insert(route_index, rest);
            }
            Segment::Param { name, regex } => {
                if let Some(child) = self
                    .param_children
                    .iter_mut()
                    .find(|c| c.name.as_ref() == name && c.regex_src == *regex)
                {
                    child.node.insert(route_index, rest);
                    return;
                }
                let compiled_src = pattern::anchor_segment(regex);
                let compiled = Regex::new(&compiled_src)
                    .expect("constraint verified by the trie-compatibility probe");
                let mut child = ParamChild {
                    name: Arc::from(name.as_str()),
                    regex_src: regex.clone(),
                    compiled_src,
                    regex: compiled,
                    node: Node::default(),
                };
                child.node.insert(route_index, rest);
                self.param_children.push(child);
            }
        }
    }

    pub fn find(
        &self,
        routes: &[Route],
        method: &str,
        segments: &[&str],
        depth: usize,
        params: &mut ParamVec,
        allowed: &mut BTreeSet<String>,
    ) -> Option<usize> {
        if depth == segments.len() {
            for &index in &self.terminal_routes {
                if routes[index].allows_method(method) {
                    return Some(index);
                }
                // URI matched but the method did not: remember for 405.
                for m in routes[index].methods() {
                    allowed.insert(m.clone());
                }
            }
            return None;
        }

        let segment = segments[depth];

        if let Some(child) = self.static_children.get(segment) {
            if let Some(hit) = child.find(routes, method, segments, depth + 1, params, allowed) {
                return Some(hit);
            }
        }

        for child in &self.param_children {
            if child.regex.is_match(segment) {
                params.push((Arc::clone(&child.name), segment.to_string()));
                if let Some(hit) =
                    child
                        .node
                        .find(routes, method, segments, depth + 1, params, allowed)
                {
                    return Some(hit);
                }
                // Backtrack: undo the capture for this branch.
                params.pop();
            }
        }

        None
    }
}
