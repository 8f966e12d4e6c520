use crate::route::{HandlerRef, PlanEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The one supported artifact layout. Loaders reject anything else.
pub const FORMAT_VERSION: u32 = 1;

/// Compact per-route record. Keys are single characters to keep large route
/// tables small on disk; fields that are empty or zero are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    #[serde(rename = "h")]
    pub handler: HandlerRef,
    /// Method membership map (`{"GET": true}`); gives O(1) lookups at load
    /// time without rebuilding sets.
    #[serde(rename = "M")]
    pub methods: HashMap<String, bool>,
    #[serde(rename = "p")]
    pub pattern: String,
    #[serde(rename = "w", default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    #[serde(rename = "n", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "P", default, skip_serializing_if = "is_zero")]
    pub priority: i32,
    /// Anchored route regex; present only for fallback routes, the single
    /// place the compiled matcher needs it.
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(rename = "N", default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_names: Vec<String>,
    #[serde(rename = "a", default, skip_serializing_if = "Option::is_none")]
    pub arg_plan: Option<Vec<PlanEntry>>,
}

fn is_zero(priority: &i32) -> bool {
    *priority == 0
}

/// Serialized trie node: plain nested data the compiled matcher walks
/// without rebuilding in-memory nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "static", default, skip_serializing_if = "HashMap::is_empty")]
    pub static_children: HashMap<String, NodeRecord>,
    #[serde(rename = "param", default, skip_serializing_if = "Vec::is_empty")]
    pub param_children: Vec<ParamRecord>,
    #[serde(rename = "routes", default, skip_serializing_if = "Vec::is_empty")]
    pub terminal_routes: Vec<usize>,
}

/// Serialized dynamic child: the constraint as written plus the anchored
/// whole-segment form applied at match time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    pub name: String,
    pub regex: String,
    pub compiled_regex: String,
    pub node: NodeRecord,
}

/// The complete compiled routing table: everything `match` needs, frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub version: u32,
    /// Dense vector; positions are the route indices used everywhere else.
    pub routes: Vec<RouteRecord>,
    pub trie: NodeRecord,
    /// Indices of routes matched by linear regex scan, in priority order.
    pub fallback: Vec<usize>,
    /// `"METHOD:pattern"` → route index for parameter-less routes.
    pub static_table: HashMap<String, usize>,
    /// Route name → route index; first registration won on collisions.
    pub name_index: HashMap<String, usize>,
}
