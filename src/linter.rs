//! # Route Table Linter
//!
//! Diagnostics over a frozen route collection. The linter reports
//! registration mistakes a matcher cannot: routes that can never win.
//!
//! ## Checks Performed
//!
//! 1. **Duplicate patterns** - two routes compile to the same regex and
//!    share at least one method; the later one is unreachable
//! 2. **Duplicate names** - two or more routes share a non-empty name; only
//!    the first registration is reachable through the name index
//! 3. **Shadowed routes** - a higher-priority route matches a strict
//!    superset of a later route's URIs, segment for segment
//!
//! The shadowing check is a conservative heuristic: it only compares
//! patterns with identical segment structure, so it can miss shadows that
//! cross segment boundaries, but it does not report false positives.
//!
//! ## Usage
//!
//! ```rust
//! use switchback::linter::lint_routes;
//! # use switchback::route::{HandlerRef, Route};
//! # use switchback::router::Router;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let router = Router::new(vec![
//! #     Route::get("/a/{x}", HandlerRef::closure("a")).build()?,
//! # ]);
//! for issue in lint_routes(&router) {
//!     eprintln!("[{}] {}: {}", issue.severity, issue.location, issue.message);
//! }
//! # Ok(())
//! # }
//! ```

use crate::pattern::{Segment, DEFAULT_PARAM_REGEX};
use crate::route::Route;
use crate::router::Router;
use std::collections::HashMap;
use std::fmt;


/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// The route table is contradictory; one of the routes can never match
    Error,
    /// Suspicious but functional registration
    Warning,
    /// Best practice suggestion
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "error"),
            LintSeverity::Warning => write!(f, "warning"),
            LintSeverity::Info => write!(f, "info"),
        }
    }
}

/// A lint issue found in a route table
#[derive(Debug, Clone)]
pub struct LintIssue {
    /// Where the issue occurred (e.g., `route:GET /users/{id}`)
    pub location: String,
    /// Severity of the issue
    pub severity: LintSeverity,
    /// Type of lint issue (e.g., `duplicate_pattern`, `shadowed_route`)
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    /// Create a new lint issue
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Lint a frozen route table
///
/// # Arguments
///
/// * `router` - The frozen collection; routes are inspected in
///   descending-priority order
///
/// # Returns
///
/// A vector of lint issues found in the table
pub fn lint_routes(router: &Router) -> Vec<LintIssue> {
    let routes = router.routes();
    let mut issues = Vec::new();

    check_duplicate_patterns(routes, &mut issues);
    check_duplicate_names(routes, &mut issues);
    check_shadowed_routes(routes, &mut issues);

    issues
}

fn check_duplicate_patterns(routes: &[Route], issues: &mut Vec<LintIssue>) {
    for (i, a) in routes.iter().enumerate() {
        for b in routes.iter().skip(i + 1) {
            if a.regex_str() == b.regex_str() && methods_intersect(a, b) {
                issues.push(
                    LintIssue::new(
                        location(b),
                        LintSeverity::Error,
                        "duplicate_pattern",
                        format!(
                            "pattern '{}' is registered twice with overlapping methods; \
                             this registration can never match",
                            b.pattern()
                        ),
                    )
                    .with_suggestion("remove one registration or disjoin the method sets"),
                );
            }
        }
    }
}

fn check_duplicate_names(routes: &[Route], issues: &mut Vec<LintIssue>) {
    let mut by_name: HashMap<&str, Vec<&Route>> = HashMap::new();
    for route in routes {
        if !route.name().is_empty() {
            by_name.entry(route.name()).or_default().push(route);
        }
    }
    let mut names: Vec<_> = by_name.into_iter().filter(|(_, v)| v.len() > 1).collect();
    names.sort_by_key(|(name, _)| *name);
    for (name, group) in names {
        let patterns: Vec<&str> = group.iter().map(|r| r.pattern()).collect();
        issues.push(
            LintIssue::new(
                format!("name:{name}"),
                LintSeverity::Warning,
                "duplicate_name",
                format!(
                    "{} routes share the name '{name}': {}",
                    group.len(),
                    patterns.join(", ")
                ),
            )
            .with_suggestion("URL generation resolves the first registration only"),
        );
    }
}

fn check_shadowed_routes(routes: &[Route], issues: &mut Vec<LintIssue>) {
    // The slice is in descending-priority order, so `earlier` always has
    // equal-or-higher priority than `later`.
    for (i, earlier) in routes.iter().enumerate() {
        for later in routes.iter().skip(i + 1) {
            if methods_intersect(earlier, later) && shadows(earlier, later) {
                issues.push(
                    LintIssue::new(
                        location(later),
                        LintSeverity::Warning,
                        "shadowed_route",
                        format!(
                            "every URI matching '{}' is claimed first by '{}'",
                            later.pattern(),
                            earlier.pattern()
                        ),
                    )
                    .with_suggestion(format!(
                        "raise the priority of '{}' above {}",
                        later.pattern(),
                        earlier.priority()
                    )),
                );
            }
        }
    }
}

/// Segment-aligned shadow test. Requires identical segment counts; each
/// aligned pair must be an identical static, an unconstrained parameter over
/// a constrained one, or an unconstrained parameter over a static - with at
/// least one of the latter two present.
fn shadows(earlier: &Route, later: &Route) -> bool {
    let a = earlier.segments();
    let b = later.segments();
    if a.len() != b.len() {
        return false;
    }
    let mut narrower = 0usize;
    for (sa, sb) in a.iter().zip(b.iter()) {
        match (sa, sb) {
            (Segment::Static { literal: la }, Segment::Static { literal: lb }) if la == lb => {}
            (Segment::Param { regex: ra, .. }, Segment::Param { regex: rb, .. })
                if ra == DEFAULT_PARAM_REGEX && rb != DEFAULT_PARAM_REGEX =>
            {
                narrower += 1;
            }
            (Segment::Param { regex: ra, .. }, Segment::Static { .. })
                if ra == DEFAULT_PARAM_REGEX =>
            {
                narrower += 1;
            }
            _ => return false,
        }
    }
    narrower > 0
}

fn methods_intersect(a: &Route, b: &Route) -> bool {
    a.methods().iter().any(|m| b.allows_method(m))
}

fn location(route: &Route) -> String {
    format!("route:{} {}", route.methods().join("|"), route.pattern())
}
