//! # Switchback
//!
//! **Switchback** is a hybrid HTTP request router: a segment trie for the
//! common case, a static-URI table for the parameter-less fast path, and a
//! linear regex fallback for patterns the trie cannot express - with
//! ahead-of-time compilation of the whole table into a self-contained,
//! load-once artifact.
//!
//! ## Overview
//!
//! Routes are registered as immutable records (pattern, method set, handler
//! reference, middleware, name, priority, optional argument plan) and frozen
//! into a [`router::Router`]. Matching a `(method, path)` pair yields either
//! the winning route with its extracted parameters, the sorted set of
//! methods the URI would accept (a 405-equivalent), or a not-found signal.
//! The table reverses too: [`urlgen::UrlGenerator`] builds URLs from route
//! names.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - pattern parsing, regex compilation, trie-compatibility
//! - **[`route`]** - immutable route records and their builder
//! - **[`router`]** - the frozen collection and hybrid dispatch
//! - **[`artifact`]** - ahead-of-time compiler, on-disk format, and the
//!   matcher that answers requests straight from the compiled form
//! - **[`urlgen`]** - reverse routing (name → URL)
//! - **[`linter`]** - duplicate and shadowed-route diagnostics
//! - **[`manifest`]** - declarative route-table files for the CLI
//! - **[`cli`]** - the `switchback` compile/check/resolve binary
//!
//! ## Matching semantics
//!
//! Routes sort by descending priority, ties broken by registration order,
//! and every derived structure preserves that order - so the first match in
//! walk order is the highest-priority match. The one exception: a static
//! trie child is preferred over any dynamic sibling regardless of priority.
//! `HEAD` requests fall back to `GET` matching only after every explicit
//! `HEAD` route has been tried.
//!
//! ## Quick Start
//!
//! ```rust
//! use switchback::route::{HandlerRef, Route};
//! use switchback::router::{MatchResult, Router};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::new(vec![
//!     Route::get("/pets", HandlerRef::closure("list_pets")).build()?,
//!     Route::get("/pets/{id:\\d+}", HandlerRef::closure("get_pet"))
//!         .name("pets.show")
//!         .build()?,
//! ]);
//!
//! assert!(router.match_route("GET", "/pets/42").is_hit());
//! assert!(matches!(
//!     router.match_route("PUT", "/pets"),
//!     MatchResult::MethodNotAllowed { .. }
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Construction is single-threaded; a frozen `Router` (and a loaded
//! [`artifact::CompiledMatcher`]) is read-only and safe for unsynchronized
//! concurrent readers. Matching allocates nothing on the static-table fast
//! path and only per-call parameter storage on the trie path.

pub mod artifact;
pub mod cli;
pub mod linter;
pub mod manifest;
pub mod pattern;
pub mod route;
pub mod router;
pub(crate) mod trie;
pub mod urlgen;

pub use artifact::{Artifact, CompiledMatcher};
pub use pattern::{PatternError, Segment};
pub use route::{Cast, HandlerRef, PlanEntry, Route, RouteBuilder};
pub use router::{MatchResult, Router};
pub use urlgen::{UrlError, UrlGenerator};
