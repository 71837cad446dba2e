//! Per-project-scope AST index.
//!
//! Consumes the modules a [`langsrv_frontend::CompilerFrontend`] produces
//! for a compilation unit and builds a flat, queryable snapshot: every
//! node reachable per URI, an identity-keyed parent map, class lookup by
//! URI and by qualified name, and a filtered, star-import-expanded
//! dependency list per URI.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod index;
mod query;
mod visit;

pub use index::AstIndex;
pub use visit::{visit_full, visit_incremental};
