//! # Router Module
//!
//! The route collection and its hybrid dispatch. A [`Router`] owns the
//! priority-sorted route records and the structures derived from them: a
//! static-URI table for the parameter-less fast path, the segment trie, the
//! fallback list for patterns the trie cannot express, and the name index
//! for reverse routing.
//!
//! ## Dispatch order
//!
//! `match_route(method, path)` consults the static table first, then walks
//! the trie, then scans the fallback list; a `HEAD` request that exhausts
//! all three repeats them as `GET`. Method mismatches along the way
//! accumulate into the allowed set reported by a `MethodNotAllowed`
//! outcome.
//!
//! ## Example
//!
//! ```rust
//! use switchback::route::{HandlerRef, Route};
//! use switchback::router::{get_param, MatchResult, Router};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::new(vec![
//!     Route::get("/users/{id:\\d+}", HandlerRef::closure("users_show"))
//!         .name("users.show")
//!         .build()?,
//! ]);
//!
//! match router.match_route("GET", "/users/42") {
//!     MatchResult::Hit { route_index, params } => {
//!         assert_eq!(router.routes()[route_index].name(), "users.show");
//!         assert_eq!(get_param(&params, "id"), Some("42"));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

mod core;

pub use core::{get_param, params_map, MatchResult, ParamVec, Router, MAX_INLINE_PARAMS};
