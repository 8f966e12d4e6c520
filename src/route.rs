//! Route records.
//!
//! A [`Route`] is an immutable value tying a pattern to a handler reference,
//! a method set, middleware identifiers, an optional name, a priority, and an
//! optional argument-resolution plan. Construction goes through
//! [`RouteBuilder`], which compiles the pattern once; a built route never
//! changes and is safe to share between unsynchronized readers.

use crate::pattern::{self, PatternError, Segment};
use crate::router::ParamVec;
use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Opaque reference to the code that services a route. The core stores and
/// reports it but never dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerRef {
    /// A `(type name, method name)` pair, e.g. `UserController::show`.
    ClassMethod {
        type_name: String,
        method_name: String,
    },
    /// An anonymous callable known to the host by id.
    Closure { id: String },
}

impl HandlerRef {
    pub fn class_method(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        HandlerRef::ClassMethod {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }

    pub fn closure(id: impl Into<String>) -> Self {
        HandlerRef::Closure { id: id.into() }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::ClassMethod {
                type_name,
                method_name,
            } => write!(f, "{type_name}::{method_name}"),
            HandlerRef::Closure { id } => write!(f, "closure:{id}"),
        }
    }
}

/// Conversion applied to a route parameter by an argument plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cast {
    Int,
    Float,
    Bool,
    String,
}

/// One step of a handler's argument-resolution plan. Plans are compile-time
/// data: the core produces and propagates them, it never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum PlanEntry {
    /// Pass the request object through.
    Request,
    /// Pass a matched route parameter, optionally cast. A missing `cast`
    /// means the string value is passed unconverted.
    Param {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cast: Option<Cast>,
    },
    /// Resolve an instance of `class` from the host's container.
    Container { class: String },
    /// Pass a literal value, including the sentinel null.
    Default { value: Value },
}

/// An immutable, compiled route record.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    methods: Vec<String>,
    method_set: HashSet<String>,
    handler: HandlerRef,
    middleware: Vec<String>,
    name: String,
    priority: i32,
    regex: Regex,
    parameter_names: Vec<String>,
    segments: Vec<Segment>,
    trie_compatible: bool,
    arg_plan: Option<Vec<PlanEntry>>,
}

impl Route {
    /// Start building a route for `pattern` serviced by `handler`.
    pub fn builder(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        RouteBuilder {
            pattern: pattern.into(),
            methods: Vec::new(),
            handler,
            middleware: Vec::new(),
            name: String::new(),
            priority: 0,
            arg_plan: None,
        }
    }

    pub fn get(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        Self::builder(pattern, handler).method(Method::GET)
    }

    pub fn post(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        Self::builder(pattern, handler).method(Method::POST)
    }

    pub fn put(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        Self::builder(pattern, handler).method(Method::PUT)
    }

    pub fn delete(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        Self::builder(pattern, handler).method(Method::DELETE)
    }

    pub fn head(pattern: impl Into<String>, handler: HandlerRef) -> RouteBuilder {
        Self::builder(pattern, handler).method(Method::HEAD)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Methods in registration order, upper-cased and deduplicated.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// O(1) method membership. Case-sensitive; callers normalize to upper
    /// case.
    pub fn allows_method(&self, method: &str) -> bool {
        self.method_set.contains(method)
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// Route name; empty for anonymous routes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The anchored regex compiled from the pattern.
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parameter names in pattern order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the pattern lives in the segment trie; routes that cannot are
    /// matched through the fallback list.
    pub fn is_trie_compatible(&self) -> bool {
        self.trie_compatible
    }

    pub fn arg_plan(&self) -> Option<&[PlanEntry]> {
        self.arg_plan.as_deref()
    }

    /// Apply the compiled regex to a full request path, returning captured
    /// parameters on success. This is the fallback-list matching primitive;
    /// trie-compatible routes are normally matched segment-wise instead.
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for name in &self.parameter_names {
            if let Some(m) = caps.name(name) {
                params.push((Arc::from(name.as_str()), m.as_str().to_string()));
            }
        }
        Some(params)
    }
}

/// Builder for [`Route`]. Compilation happens once in [`RouteBuilder::build`];
/// the emitted route is frozen.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    pattern: String,
    methods: Vec<String>,
    handler: HandlerRef,
    middleware: Vec<String>,
    name: String,
    priority: i32,
    arg_plan: Option<Vec<PlanEntry>>,
}

impl RouteBuilder {
    /// Add an HTTP method. Duplicates are ignored; the first occurrence fixes
    /// the iteration position.
    pub fn method(mut self, method: Method) -> Self {
        self.push_method(method.as_str());
        self
    }

    /// Add methods given as strings; they are upper-cased.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for m in methods {
            self.push_method(m.as_ref());
        }
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(middleware.into_iter().map(Into::into));
        self
    }

    pub fn arg_plan(mut self, plan: Vec<PlanEntry>) -> Self {
        self.arg_plan = Some(plan);
        self
    }

    /// Compile the pattern and freeze the route. Routes with no explicit
    /// method default to `GET`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the pattern is malformed; this is the
    /// only point at which pattern problems surface - matching never fails.
    pub fn build(mut self) -> Result<Route, PatternError> {
        if self.methods.is_empty() {
            self.methods.push(Method::GET.as_str().to_string());
        }
        let (regex_str, parameter_names) = pattern::compile(&self.pattern)?;
        let regex = Regex::new(&regex_str).map_err(|e| PatternError::InvalidRegex {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })?;
        let segments = pattern::parse(&self.pattern);
        let trie_compatible = pattern::is_trie_compatible(&self.pattern);
        let method_set = self.methods.iter().cloned().collect();
        Ok(Route {
            pattern: self.pattern,
            methods: self.methods,
            method_set,
            handler: self.handler,
            middleware: self.middleware,
            name: self.name,
            priority: self.priority,
            regex,
            parameter_names,
            segments,
            trie_compatible,
            arg_plan: self.arg_plan,
        })
    }

    fn push_method(&mut self, method: &str) {
        let upper = method.to_ascii_uppercase();
        if !self.methods.contains(&upper) {
            self.methods.push(upper);
        }
    }
}
