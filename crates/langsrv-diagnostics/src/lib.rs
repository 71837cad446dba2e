//! Converts a compilation's raw messages into published diagnostics.
//!
//! Takes the compiler's flat message list plus a record of what was
//! published last round, resolves each message's source locator against
//! the project root, collapses duplicates, appends unused-import
//! warnings, and clears diagnostics for any file that no longer has any.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod unused_imports;

use langsrv_frontend::{CompilationUnit, CompileOutcome, CompilerMessage, Severity};
use langsrv_position::{Position, Range};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub use unused_imports::unused_import_diagnostics;

/// One diagnostic ready to publish to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
}

/// The outcome of [`compute`]: what to actually send to the editor this
/// round, and the full by-file map to hand back as `previous` next round.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    pub to_publish: Vec<(String, Vec<Diagnostic>)>,
    pub diagnostics_by_file: HashMap<String, Vec<Diagnostic>>,
}

/// Builds a [`DiagnosticResult`] from a compile outcome.
///
/// `project_root_uri` bounds which message locators are trusted (a
/// message pointing outside the project, e.g. at a JDK stub, is
/// dropped); `previous` is the `diagnostics_by_file` map this function
/// returned last round, used to clear files that no longer have
/// anything to report.
pub fn compute(unit: &CompilationUnit, outcome: &CompileOutcome, project_root_uri: &str, previous: &HashMap<String, Vec<Diagnostic>>) -> DiagnosticResult {
    let root_key = langsrv_uri::uri_key(project_root_uri);
    let mut by_file: HashMap<String, Vec<Diagnostic>> = HashMap::new();

    for message in &outcome.messages {
        let Some(uri) = resolve_locator(message, &root_key) else { continue };
        let diagnostic = Diagnostic { range: message_range(message), severity: message.severity, message: message.message.clone() };
        by_file.entry(uri).or_default().push(diagnostic);
    }

    for (uri, module) in &outcome.modules {
        let Some(source) = unit.sources.iter().find(|s| &s.uri == uri) else { continue };
        let diagnostics = unused_import_diagnostics(&source.text, module);
        if diagnostics.is_empty() {
            continue;
        }
        by_file.entry(uri.clone()).or_default().extend(diagnostics);
    }

    for diagnostics in by_file.values_mut() {
        dedup_diagnostics(diagnostics);
    }

    let mut to_publish: Vec<(String, Vec<Diagnostic>)> = by_file.iter().map(|(uri, diags)| (uri.clone(), diags.clone())).collect();
    for stale_uri in previous.keys() {
        if !by_file.contains_key(stale_uri) {
            to_publish.push((stale_uri.clone(), Vec::new()));
        }
    }

    DiagnosticResult { to_publish, diagnostics_by_file: by_file }
}

/// Resolves a message's source locator to a URI, provided it names a
/// location inside the project root. `None` for an empty/unparseable
/// locator or one that resolves outside the root.
fn resolve_locator(message: &CompilerMessage, root_key: &str) -> Option<String> {
    let uri = message.uri.as_ref()?;
    if uri.is_empty() {
        return None;
    }
    let key = langsrv_uri::uri_key(uri);
    if !is_under(&key, root_key) {
        return None;
    }
    Some(uri.clone())
}

/// True if `uri_key` names a path under `root_key`, comparing normalized
/// URI strings rather than filesystem paths so a Windows-style URI's
/// drive-letter containment is judged correctly regardless of the host
/// platform `uri_to_fs_path` would resolve it against.
fn is_under(uri_key: &str, root_key: &str) -> bool {
    let root_with_slash = if root_key.ends_with('/') { root_key.to_string() } else { format!("{root_key}/") };
    uri_key == root_key || uri_key.starts_with(&root_with_slash)
}

/// Converts a message's raw coordinates to a [`Range`], falling back to
/// `(0,0)-(0,0)` for the compiler's "no location" sentinel (`-1`).
fn message_range(message: &CompilerMessage) -> Range {
    if message.line < 0 || message.column < 0 {
        return Range::empty(Position::new(0, 0));
    }
    let end_line = if message.end_line < 0 { message.line } else { message.end_line };
    let end_column = if message.end_column < 0 { message.column } else { message.end_column };
    Range::new(Position::new(message.line as u32, message.column as u32), Position::new(end_line as u32, end_column as u32))
}

/// Removes diagnostics identical in range, severity, and message,
/// preserving first-seen order.
fn dedup_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<(Range, Severity, String)> = HashSet::new();
    diagnostics.retain(|d| seen.insert((d.range, d.severity, d.message.clone())));
}

/// True if `uri` names a path under `project_root` (a filesystem path,
/// not a URI) — a convenience for callers that have a `Path` in hand
/// rather than a second URI.
pub fn uri_is_under_root(uri: &str, project_root: &Path) -> bool {
    let Ok(root_uri) = langsrv_uri::fs_path_to_uri(project_root) else { return false };
    is_under(&langsrv_uri::uri_key(uri), &langsrv_uri::uri_key(&root_uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(uri: Option<&str>, line: i64, column: i64, severity: Severity, text: &str) -> CompilerMessage {
        CompilerMessage { uri: uri.map(str::to_string), line, column, end_line: line, end_column: column + 1, severity, message: text.to_string() }
    }

    fn empty_unit() -> CompilationUnit {
        CompilationUnit::new("/proj")
    }

    #[test]
    fn messages_outside_the_project_root_are_dropped() {
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![message(Some("file:///elsewhere/Foo.groovy"), 0, 0, Severity::Error, "boom")],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &HashMap::new());
        assert!(result.diagnostics_by_file.is_empty());
    }

    #[test]
    fn messages_without_a_locator_are_dropped() {
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![message(None, 0, 0, Severity::Error, "boom")],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &HashMap::new());
        assert!(result.diagnostics_by_file.is_empty());
    }

    #[test]
    fn negative_coordinates_fall_back_to_origin() {
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![message(Some("file:///proj/Foo.groovy"), -1, -1, Severity::Error, "fatal")],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &HashMap::new());
        let diags = &result.diagnostics_by_file["file:///proj/Foo.groovy"];
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].range, Range::empty(Position::new(0, 0)));
    }

    #[test]
    fn duplicate_messages_collapse_to_one() {
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![
                message(Some("file:///proj/Foo.groovy"), 2, 3, Severity::Error, "bad token"),
                message(Some("file:///proj/Foo.groovy"), 2, 3, Severity::Error, "bad token"),
            ],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &HashMap::new());
        assert_eq!(result.diagnostics_by_file["file:///proj/Foo.groovy"].len(), 1);
    }

    #[test]
    fn a_file_missing_from_the_new_round_is_cleared() {
        let mut previous = HashMap::new();
        previous.insert(
            "file:///proj/Fixed.groovy".to_string(),
            vec![Diagnostic { range: Range::empty(Position::new(0, 0)), severity: Severity::Error, message: "old".into() }],
        );
        let outcome = CompileOutcome { modules: Vec::new(), messages: Vec::new(), catastrophic_failures: Vec::new() };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &previous);
        let cleared = result.to_publish.iter().find(|(uri, _)| uri == "file:///proj/Fixed.groovy");
        assert_eq!(cleared.map(|(_, d)| d.len()), Some(0));
    }

    #[test]
    fn a_still_broken_file_is_not_cleared_and_keeps_its_diagnostic() {
        let mut previous = HashMap::new();
        previous.insert(
            "file:///proj/Other.groovy".to_string(),
            vec![Diagnostic { range: Range::empty(Position::new(0, 0)), severity: Severity::Error, message: "unrelated".into() }],
        );
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![message(Some("file:///proj/Other.groovy"), 1, 1, Severity::Error, "still broken")],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///proj", &previous);
        let entry = result.to_publish.iter().find(|(uri, _)| uri == "file:///proj/Other.groovy").unwrap();
        assert_eq!(entry.1.len(), 1);
    }

    #[test]
    fn drive_letter_case_does_not_affect_containment() {
        let outcome = CompileOutcome {
            modules: Vec::new(),
            messages: vec![message(Some("file:///C:/proj/Foo.groovy"), 0, 0, Severity::Error, "boom")],
            catastrophic_failures: Vec::new(),
        };
        let result = compute(&empty_unit(), &outcome, "file:///c:/proj", &HashMap::new());
        assert!(result.diagnostics_by_file.contains_key("file:///C:/proj/Foo.groovy"));
    }

    #[test]
    fn unused_import_is_reported_when_the_module_and_source_are_present() {
        use langsrv_frontend::{NodeBuilder, NodeKind, SourceInput};

        let import = NodeBuilder::new(NodeKind::Import, Range::new(Position::new(0, 0), Position::new(0, 17)))
            .imported_name("x.y.List")
            .import_kind(langsrv_frontend::ImportKind::Regular)
            .build();
        let module = NodeBuilder::new(NodeKind::Module, Range::new(Position::new(0, 0), Position::new(1, 0))).children(vec![import]).build();

        let text = "import x.y.List\nclass Foo { String name }\n";
        let unit = CompilationUnit::new("/proj").with_sources(vec![SourceInput::new("file:///proj/Foo.groovy", text)]);
        let outcome = CompileOutcome { modules: vec![("file:///proj/Foo.groovy".to_string(), module)], messages: Vec::new(), catastrophic_failures: Vec::new() };

        let result = compute(&unit, &outcome, "file:///proj", &HashMap::new());
        let diags = &result.diagnostics_by_file["file:///proj/Foo.groovy"];
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("Unused import"));
    }
}
