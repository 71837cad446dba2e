//! Drives a [`CompilerFrontend`] to a resolved-AST phase, visits the
//! result into an [`AstIndex`], and manages the placeholder-injection
//! protocol completion/signature-help compiles rely on.

use langsrv_ast_index::{AstIndex, visit_full, visit_incremental};
use langsrv_config::Config;
use langsrv_documents::DocumentTracker;
use langsrv_frontend::{CompilationUnit, CompileOutcome, CompilerFrontend};
use langsrv_position::{LineIndex, Position};
use std::collections::HashSet;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static CONSTRUCTOR_TAIL: LazyLock<regex::Regex> = LazyLock::new(|| match regex::Regex::new(r"new\s+\w*$") {
    Ok(re) => re,
    Err(_) => unreachable!("CONSTRUCTOR_TAIL regex failed to compile"),
});

/// Drives `unit` to a resolved-AST phase. Catches a panicking front-end
/// implementation (a contract violation — [`CompilerFrontend::compile`]
/// documents that it must never panic) and treats it as the "catastrophic
/// failure" path, returning `None` rather than unwinding into the scope.
pub fn compile(frontend: &dyn CompilerFrontend, unit: &CompilationUnit) -> Option<CompileOutcome> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| frontend.compile(unit))).ok()
}

/// Builds a fresh [`AstIndex`] from every module in `outcome`.
pub fn visit_ast_full(outcome: &CompileOutcome, config: &Config) -> AstIndex {
    visit_full(&outcome.modules, config)
}

/// Builds an [`AstIndex`] that carries forward every URI outside
/// `changed` from `previous`, re-visiting only `outcome`'s modules.
pub fn visit_ast_incremental(outcome: &CompileOutcome, previous: &AstIndex, changed: &HashSet<String>, config: &Config) -> AstIndex {
    visit_incremental(previous, changed, &outcome.modules, config)
}

/// A placeholder splice into an open document's in-memory buffer, undone
/// when the guard drops — on the success path or any early return,
/// including an unwind.
pub struct PlaceholderGuard<'a> {
    tracker: &'a DocumentTracker,
    uri: String,
    version: i32,
    original: Option<String>,
}

impl<'a> PlaceholderGuard<'a> {
    /// Splices a fresh identifier (`a`) at `position`, or `a()` when the
    /// text immediately before the cursor looks like an unfinished
    /// constructor call (`new \w*$`), so the compiler can parse an
    /// otherwise-incomplete expression for completion purposes.
    ///
    /// Returns `None` (injecting nothing) if `uri` isn't open or
    /// `position` doesn't resolve to a valid offset.
    pub fn inject_completion(tracker: &'a DocumentTracker, uri: &str, position: Position) -> Option<Self> {
        Self::inject(tracker, uri, position, |prefix_line| if CONSTRUCTOR_TAIL.is_match(prefix_line) { "a()" } else { "a" })
    }

    /// Splices a closing `)` at `position` to close an unbalanced
    /// argument list, so the compiler can resolve which overload a
    /// signature-help request's cursor sits inside.
    pub fn inject_signature_help(tracker: &'a DocumentTracker, uri: &str, position: Position) -> Option<Self> {
        Self::inject(tracker, uri, position, |_| ")")
    }

    fn inject(tracker: &'a DocumentTracker, uri: &str, position: Position, placeholder_for: impl Fn(&str) -> &'static str) -> Option<Self> {
        let original = tracker.get(uri)?;
        let line_index = LineIndex::new(&original);
        let offset = line_index.position_to_offset(&original, position)?;
        if offset > original.len() {
            return None;
        }
        let line_start = original[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prefix_line = &original[line_start..offset];
        let placeholder = placeholder_for(prefix_line);

        let mut mutated = String::with_capacity(original.len() + placeholder.len());
        mutated.push_str(&original[..offset]);
        mutated.push_str(placeholder);
        mutated.push_str(&original[offset..]);

        let version = tracker.version(uri).unwrap_or(0);
        tracker.change(uri, mutated, version);
        Some(Self { tracker, uri: uri.to_string(), version, original: Some(original) })
    }

    /// The document's text before this placeholder was spliced in.
    pub fn original_text(&self) -> &str {
        self.original.as_deref().unwrap_or_default()
    }
}

impl Drop for PlaceholderGuard<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.tracker.change(&self.uri, original, self.version);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsrv_frontend::{CompilationUnit, SourceInput, TestFrontend};

    #[test]
    fn compile_returns_outcome_for_a_well_behaved_frontend() {
        let unit = CompilationUnit::new("/p").with_sources(vec![SourceInput::new("file:///p/Foo.groovy", "class Foo {}\n")]);
        let outcome = compile(&TestFrontend::new(), &unit).expect("well-behaved frontend never panics");
        assert_eq!(outcome.modules.len(), 1);
    }

    #[test]
    fn completion_placeholder_uses_bare_identifier_by_default() {
        let tracker = DocumentTracker::new();
        tracker.open("file:///p/Foo.groovy", "class Foo {\n    void m() { x.\n    }\n}\n".to_string(), 1).unwrap();
        let guard = PlaceholderGuard::inject_completion(&tracker, "file:///p/Foo.groovy", Position::new(1, 18)).unwrap();
        let mutated = tracker.get("file:///p/Foo.groovy").unwrap();
        assert!(mutated.contains("x.a"));
        drop(guard);
        assert_eq!(tracker.get("file:///p/Foo.groovy").unwrap(), "class Foo {\n    void m() { x.\n    }\n}\n");
    }

    #[test]
    fn completion_placeholder_uses_constructor_call_after_new() {
        let tracker = DocumentTracker::new();
        let text = "class Foo {\n    void m() { def x = new \n    }\n}\n";
        tracker.open("file:///p/Foo.groovy", text.to_string(), 1).unwrap();
        let pos = Position::new(1, text.lines().nth(1).unwrap().len() as u32);
        let guard = PlaceholderGuard::inject_completion(&tracker, "file:///p/Foo.groovy", pos).unwrap();
        assert!(tracker.get("file:///p/Foo.groovy").unwrap().contains("new a()"));
        drop(guard);
        assert_eq!(tracker.get("file:///p/Foo.groovy").unwrap(), text);
    }

    #[test]
    fn signature_help_placeholder_closes_the_argument_list() {
        let tracker = DocumentTracker::new();
        let text = "class Foo {\n    void m() { bar(1, \n    }\n}\n";
        tracker.open("file:///p/Foo.groovy", text.to_string(), 1).unwrap();
        let pos = Position::new(1, text.lines().nth(1).unwrap().len() as u32);
        let guard = PlaceholderGuard::inject_signature_help(&tracker, "file:///p/Foo.groovy", pos).unwrap();
        assert!(tracker.get("file:///p/Foo.groovy").unwrap().contains("bar(1, )"));
        drop(guard);
        assert_eq!(tracker.get("file:///p/Foo.groovy").unwrap(), text);
    }

    #[test]
    fn injection_on_an_unopened_document_is_none() {
        let tracker = DocumentTracker::new();
        assert!(PlaceholderGuard::inject_completion(&tracker, "file:///missing.groovy", Position::new(0, 0)).is_none());
    }

    #[test]
    fn restore_happens_even_if_the_guard_is_dropped_by_panic_unwind() {
        let tracker = DocumentTracker::new();
        tracker.open("file:///p/Foo.groovy", "class Foo {}\n".to_string(), 1).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = PlaceholderGuard::inject_completion(&tracker, "file:///p/Foo.groovy", Position::new(0, 11)).unwrap();
            panic!("simulated failure mid-compile");
        }));
        assert!(result.is_err());
        assert_eq!(tracker.get("file:///p/Foo.groovy").unwrap(), "class Foo {}\n");
    }
}
