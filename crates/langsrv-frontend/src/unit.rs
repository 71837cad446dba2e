//! The compiler-driving boundary: a compilation unit, its error output,
//! and the trait the engine uses to drive an external front-end to a
//! resolved-AST phase.

use crate::node::Node;
use std::path::PathBuf;

/// One named source handed to the compiler: its URI, and the text to
/// compile (either the tracker's open buffer, disk contents, or a
/// synthetic Java-source stub).
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub uri: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self { uri: uri.into(), text: text.into() }
    }
}

/// A set of sources to compile together against a shared classpath. Built
/// by the compilation-unit factory (outside this crate) and handed to a
/// [`CompilerFrontend`] to drive.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub project_root: PathBuf,
    pub sources: Vec<SourceInput>,
    pub classpath: Vec<PathBuf>,
}

impl CompilationUnit {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self { project_root: project_root.into(), sources: Vec::new(), classpath: Vec::new() }
    }

    pub fn with_sources(mut self, sources: Vec<SourceInput>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }
}

/// Severity of a [`CompilerMessage`], mirroring LSP diagnostic severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A single message produced by the compiler while driving a unit to a
/// resolved-AST phase. `-1` line/column coordinates (the front-end's way
/// of saying "no precise location") are preserved as-is; the diagnostic
/// handler is responsible for falling back to `(0, 0)`.
#[derive(Debug, Clone)]
pub struct CompilerMessage {
    /// Source locator as reported by the compiler — may be empty or
    /// unparseable; the diagnostic handler is responsible for validating it.
    pub uri: Option<String>,
    pub line: i64,
    pub column: i64,
    pub end_line: i64,
    pub end_column: i64,
    pub severity: Severity,
    pub message: String,
}

/// The result of driving a [`CompilationUnit`] to a resolved-AST phase.
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    /// One module root per source that was successfully compiled.
    pub modules: Vec<(String, Node)>,
    /// Compiler-reported errors and warnings across the whole unit.
    pub messages: Vec<CompilerMessage>,
    /// URIs for which the compiler could not produce a module at all
    /// (parser crash, resource exhaustion) — a catastrophic per-file
    /// failure distinct from an ordinary syntax error.
    pub catastrophic_failures: Vec<String>,
}

/// The trait boundary for an external parser/compiler front-end.
///
/// The engine never implements this itself (implementing a parser is an
/// explicit Non-goal); it only drives an implementation through this
/// trait, and only ever reads the [`Node`] handles the implementation
/// hands back.
pub trait CompilerFrontend: Send + Sync {
    /// Drives `unit` to a resolved-AST phase, returning one module per
    /// source plus any diagnostics. Never panics: a front-end crash for an
    /// individual source is reported via `catastrophic_failures`, not by
    /// unwinding.
    fn compile(&self, unit: &CompilationUnit) -> CompileOutcome;
}
