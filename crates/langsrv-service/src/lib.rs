//! The top-level compilation service: turns a [`langsrv_scope::ProjectScope`]
//! plus a [`langsrv_documents::DocumentTracker`] into published diagnostics,
//! and answers workspace-wide symbol queries across every scope with an
//! open document.
//!
//! Nothing here owns state of its own — every function takes the scope
//! (or manager) and tracker it operates on and returns what changed. The
//! caller (the language-server glue this crate doesn't include) is
//! responsible for actually sending the result to the editor.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod compile;
mod workspace;

pub use compile::{compile_and_visit, compile_for_completion, compile_for_signature_help, ensure_compiled};
pub use workspace::{workspace_symbols, SymbolMatch};
