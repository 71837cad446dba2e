//! Compilation-unit factory and the compile/visit/placeholder
//! orchestrator for a single project scope.
//!
//! Neither piece here owns a scope's lock or lifetime — that's
//! `langsrv-scope`'s job. This crate is the mechanical middle of the
//! pipeline: build a [`langsrv_frontend::CompilationUnit`] from disk and
//! open buffers, drive it through a [`langsrv_frontend::CompilerFrontend`],
//! and turn the result into an [`langsrv_ast_index::AstIndex`].

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod orchestrator;
mod unit_factory;

pub use orchestrator::{compile, visit_ast_full, visit_ast_incremental, PlaceholderGuard};
pub use unit_factory::CompilationUnitFactory;
