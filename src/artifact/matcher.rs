use super::format::{Artifact, NodeRecord, RouteRecord, FORMAT_VERSION};
use crate::pattern;
use crate::router::{MatchResult, ParamVec};
use anyhow::Context;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Matcher over a compiled artifact.
///
/// Reproduces the collection's dispatch - static table, trie walk, fallback
/// scan, HEAD→GET reduction, 405 accumulation - directly over the
/// deserialized records; no in-memory trie nodes or route objects are
/// rebuilt. The regex strings stored in the artifact are compiled exactly
/// once at load and shared across identical constraints.
pub struct CompiledMatcher {
    artifact: Artifact,
    /// Whole-segment constraint regexes, keyed by their `^(?:…)$` source.
    segment_regexes: HashMap<String, Regex>,
    /// Full-pattern regexes for the fallback list, keyed by route index.
    route_regexes: HashMap<usize, Regex>,
    /// Parameter names interned for capture output.
    param_names: HashMap<String, Arc<str>>,
}

impl CompiledMatcher {
    /// Prepare a matcher from an in-memory artifact.
    ///
    /// # Errors
    ///
    /// Fails when the artifact version is unsupported, a fallback route is
    /// missing its regex, an index is out of bounds, or a stored regex does
    /// not compile - all symptoms of a corrupt or hand-edited artifact.
    pub fn new(artifact: Artifact) -> anyhow::Result<Self> {
        if artifact.version != FORMAT_VERSION {
            anyhow::bail!(
                "unsupported artifact version {} (supported: {})",
                artifact.version,
                FORMAT_VERSION
            );
        }

        for (key, &index) in artifact.static_table.iter().chain(&artifact.name_index) {
            if index >= artifact.routes.len() {
                anyhow::bail!("table entry '{key}' points at route {index}, out of bounds");
            }
        }

        let mut segment_regexes = HashMap::new();
        let mut param_names = HashMap::new();
        prepare_trie(
            &artifact.trie,
            artifact.routes.len(),
            &mut segment_regexes,
            &mut param_names,
        )?;

        let mut route_regexes = HashMap::new();
        for &index in &artifact.fallback {
            let record = artifact
                .routes
                .get(index)
                .with_context(|| format!("fallback index {index} out of bounds"))?;
            let source = record
                .regex
                .as_deref()
                .with_context(|| format!("fallback route {index} has no compiled regex"))?;
            let regex = Regex::new(source)
                .with_context(|| format!("fallback route {index}: invalid stored regex"))?;
            route_regexes.insert(index, regex);
            for name in &record.parameter_names {
                param_names
                    .entry(name.clone())
                    .or_insert_with(|| Arc::from(name.as_str()));
            }
        }

        info!(
            routes_count = artifact.routes.len(),
            segment_regexes = segment_regexes.len(),
            fallback_count = artifact.fallback.len(),
            "Compiled routing artifact loaded"
        );

        Ok(Self {
            artifact,
            segment_regexes,
            route_regexes,
            param_names,
        })
    }

    /// Read and prepare an artifact from disk.
    ///
    /// # Errors
    ///
    /// Propagates [`Artifact::read`] and [`CompiledMatcher::new`] failures.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Self::new(Artifact::read(path)?)
    }

    #[must_use]
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Route records in the artifact's dense order; `route_index` values in
    /// match results point into this slice.
    #[must_use]
    pub fn records(&self) -> &[RouteRecord] {
        &self.artifact.routes
    }

    /// O(1) lookup of a named route record.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.artifact
            .name_index
            .get(name)
            .and_then(|&i| self.artifact.routes.get(i))
    }

    /// Match a request against the compiled table. Same contract and same
    /// outcomes as `Router::match_route` over the source collection.
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

    fn match_with(
        &self,
        method: &str,
        path: &str,
        allowed: &mut BTreeSet<String>,
    ) -> Option<(usize, ParamVec)> {
        let key = format!("{method}:{path}");
        if let Some(&index) = self.artifact.static_table.get(&key) {
            return Some((index, ParamVec::new()));
        }

        let segments = pattern::split_path(path);
        let mut params = ParamVec::new();
        if let Some(index) =
            self.find_node(&self.artifact.trie, method, &segments, 0, &mut params, allowed)
        {
            return Some((index, params));
        }

        for &index in &self.artifact.fallback {
            let Some(regex) = self.route_regexes.get(&index) else {
                continue;
            };
            let record = &self.artifact.routes[index];
            if let Some(caps) = regex.captures(path) {
                if record.methods.contains_key(method) {
                    let mut params = ParamVec::new();
                    for name in &record.parameter_names {
                        if let (Some(m), Some(interned)) =
                            (caps.name(name), self.param_names.get(name))
                        {
                            params.push((Arc::clone(interned), m.as_str().to_string()));
                        }
                    }
                    return Some((index, params));
                }
                for m in record.methods.keys() {
                    allowed.insert(m.clone());
                }
            }
        }

        None
    }

    fn find_node(
        &self,
        node: &NodeRecord,
        method: &str,
        segments: &[&str],
        depth: usize,
        params: &mut ParamVec,
        allowed: &mut BTreeSet<String>,
    ) -> Option<usize> {
        if depth == segments.len() {
            for &index in &node.terminal_routes {
                let record = &self.artifact.routes[index];
                if record.methods.contains_key(method) {
                    return Some(index);
                }
                for m in record.methods.keys() {
                    allowed.insert(m.clone());
                }
            }
            return None;
        }

        let segment = segments[depth];

        if let Some(child) = node.static_children.get(segment) {
            if let Some(hit) = self.find_node(child, method, segments, depth + 1, params, allowed)
            {
                return Some(hit);
            }
        }

        for child in &node.param_children {
            let Some(regex) = self.segment_regexes.get(&child.compiled_regex) else {
                continue;
            };
            if regex.is_match(segment) {
                let interned = self
                    .param_names
                    .get(&child.name)
                    .cloned()
                    .unwrap_or_else(|| Arc::from(child.name.as_str()));
                params.push((interned, segment.to_string()));
                if let Some(hit) =
                    self.find_node(&child.node, method, segments, depth + 1, params, allowed)
                {
                    return Some(hit);
                }
                params.pop();
            }
        }

        None
    }
}

/// Walk the serialized trie once at load: compile each distinct segment
/// regex, intern parameter names, and bounds-check terminal indices so the
/// match path never has to.
fn prepare_trie(
    node: &NodeRecord,
    routes_len: usize,
    regexes: &mut HashMap<String, Regex>,
    names: &mut HashMap<String, Arc<str>>,
) -> anyhow::Result<()> {
    if let Some(&index) = node.terminal_routes.iter().find(|&&i| i >= routes_len) {
        anyhow::bail!("trie terminal index {index} out of bounds");
    }
    for child in &node.param_children {
        if !regexes.contains_key(&child.compiled_regex) {
            let regex = Regex::new(&child.compiled_regex).with_context(|| {
                format!("invalid stored segment regex '{}'", child.compiled_regex)
            })?;
            regexes.insert(child.compiled_regex.clone(), regex);
        }
        names
            .entry(child.name.clone())
            .or_insert_with(|| Arc::from(child.name.as_str()));
        prepare_trie(&child.node, routes_len, regexes, names)?;
    }
    for child in node.static_children.values() {
        prepare_trie(child, routes_len, regexes, names)?;
    }
    Ok(())
}

fn normalize_method(method: &str) -> Cow<'_, str> {
    if method.bytes().any(|b| b.is_ascii_lowercase()) {
        Cow::Owned(method.to_ascii_uppercase())
    } else {
        Cow::Borrowed(method)
    }
}
