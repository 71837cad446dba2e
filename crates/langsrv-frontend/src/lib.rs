//! Trait boundary for the external compiler front-end.
//!
//! Implementing a parser is explicitly out of scope for this engine; this
//! crate only defines the shape the engine reads ([`Node`]) and the trait
//! an external front-end implements to drive a [`CompilationUnit`] to a
//! resolved-AST phase ([`CompilerFrontend`]).

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod node;
mod unit;

#[cfg(any(test, feature = "test-support"))]
mod test_double;

pub use node::{ImportKind, Node, NodeBuilder, NodeId, NodeKind};
pub use unit::{CompilationUnit, CompileOutcome, CompilerFrontend, CompilerMessage, Severity, SourceInput};

#[cfg(any(test, feature = "test-support"))]
pub use test_double::TestFrontend;
