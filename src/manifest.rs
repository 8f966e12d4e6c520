//! Route manifest loading.
//!
//! A manifest is a declarative route-table file (YAML or JSON, chosen by
//! extension) from which the table is built and compiled ahead of time. It
//! is the CLI's input format:
//!
//! ```yaml
//! base_url: https://api.example.com
//! routes:
//!   - path: /users/{id:\d+}
//!     methods: [GET]
//!     handler: UserController::show
//!     name: users.show
//!     priority: 10
//!     middleware: [auth]
//!     args:
//!       - source: request
//!       - source: param
//!         name: id
//!         cast: int
//! ```
//!
//! Handler strings of the form `Type::method` become class-method
//! references; anything else is treated as a closure id.

use crate::pattern::PatternError;
use crate::route::{HandlerRef, PlanEntry, Route};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Base URL for absolute reverse routing; optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

/// One route declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDef {
    pub path: String,
    /// Defaults to `GET` when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<PlanEntry>>,
}

fn is_zero(priority: &i32) -> bool {
    *priority == 0
}

/// Load a manifest from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as a
/// manifest.
pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let content = std::fs::read_to_string(path)?;
    let manifest: Manifest = if path
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
    {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(manifest)
}

/// Parse a handler string. `Type::method` becomes a class-method reference;
/// anything else is a closure id.
#[must_use]
pub fn parse_handler(handler: &str) -> HandlerRef {
    match handler.split_once("::") {
        Some((type_name, method_name)) if !type_name.is_empty() && !method_name.is_empty() => {
            HandlerRef::class_method(type_name, method_name)
        }
        _ => HandlerRef::closure(handler),
    }
}

impl Manifest {
    /// Build route records from the declarations, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] encountered; the manifest is
    /// rejected as a whole.
    pub fn build_routes(&self) -> Result<Vec<Route>, PatternError> {
        self.routes
            .iter()
            .map(|def| {
                let mut builder = Route::builder(&def.path, parse_handler(&def.handler))
                    .methods(&def.methods)
                    .priority(def.priority)
                    .middleware(def.middleware.iter().cloned());
                if let Some(name) = &def.name {
                    builder = builder.name(name);
                }
                if let Some(args) = &def.args {
                    builder = builder.arg_plan(args.clone());
                }
                builder.build()
            })
            .collect()
    }
}
