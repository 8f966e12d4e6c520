//! # Artifact Module
//!
//! Ahead-of-time compilation of a frozen [`Router`](crate::router::Router)
//! into a self-contained, immutable blob, and the matcher that answers
//! requests straight from that blob.
//!
//! The artifact is a single self-describing JSON document carrying five
//! tables: the dense route-record vector, the serialized trie, the fallback
//! index list, the static-URI table, and the name index. A `version` field
//! guards the layout; loaders reject foreign versions instead of guessing.
//! Writes go to a temporary sibling file followed by an atomic rename, so a
//! reader never observes a partially written artifact.

mod format;
mod matcher;

pub use format::{Artifact, NodeRecord, ParamRecord, RouteRecord, FORMAT_VERSION};
pub use matcher::CompiledMatcher;

use crate::router::Router;
use crate::trie::Node;
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

impl Artifact {
    /// Compile a frozen router into its serialized form.
    #[must_use]
    pub fn compile(router: &Router) -> Artifact {
        let routes = router
            .routes()
            .iter()
            .map(|route| RouteRecord {
                handler: route.handler().clone(),
                methods: route.methods().iter().map(|m| (m.clone(), true)).collect(),
                pattern: route.pattern().to_string(),
                middleware: route.middleware().to_vec(),
                name: route.name().to_string(),
                priority: route.priority(),
                // Only fallback matching ever consults the full regex.
                regex: (!route.is_trie_compatible()).then(|| route.regex_str().to_string()),
                parameter_names: route.parameter_names().to_vec(),
                arg_plan: route.arg_plan().map(<[_]>::to_vec),
            })
            .collect();

        let mut static_table = HashMap::new();
        for (method, table) in router.static_table() {
            for (uri, &index) in table {
                static_table.insert(format!("{method}:{uri}"), index);
            }
        }

        Artifact {
            version: FORMAT_VERSION,
            routes,
            trie: serialize_node(router.trie().root()),
            fallback: router.fallback().to_vec(),
            static_table,
            name_index: router.name_index().clone(),
        }
    }

    /// Write the artifact to `path` via a temporary sibling and an atomic
    /// rename.
    ///
    /// # Errors
    ///
    /// Fails when serialization or any filesystem step fails; the target is
    /// left untouched in that case.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_vec(self).context("failed to serialize routing artifact")?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let tmp = path.with_file_name(format!("{file_name}.tmp"));
        std::fs::write(&tmp, &json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to rename {} into place", tmp.display()))?;
        info!(
            path = %path.display(),
            routes_count = self.routes.len(),
            bytes = json.len(),
            "Routing artifact written"
        );
        Ok(())
    }

    /// Read an artifact back from disk, rejecting unknown layout versions.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, malformed JSON, or a version other than
    /// [`FORMAT_VERSION`].
    pub fn read(path: &Path) -> anyhow::Result<Artifact> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let artifact: Artifact = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a routing artifact", path.display()))?;
        if artifact.version != FORMAT_VERSION {
            anyhow::bail!(
                "{}: unsupported artifact version {} (supported: {})",
                path.display(),
                artifact.version,
                FORMAT_VERSION
            );
        }
        Ok(artifact)
    }
}

fn serialize_node(node: &Node) -> NodeRecord {
    NodeRecord {
        static_children: node
            .static_children
            .iter()
            .map(|(literal, child)| (literal.clone(), serialize_node(child)))
            .collect(),
        param_children: node
            .param_children
            .iter()
            .map(|child| ParamRecord {
                name: child.name.to_string(),
                regex: child.regex_src.clone(),
                compiled_regex: child.compiled_src.clone(),
                node: serialize_node(&child.node),
            })
            .collect(),
        terminal_routes: node.terminal_routes.clone(),
    }
}
