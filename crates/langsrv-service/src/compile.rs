//! Drives a scope from "nothing compiled yet" through incremental
//! recompiles, including the placeholder-assisted compiles completion
//! and signature-help need.

use langsrv_ast_index::AstIndex;
use langsrv_classpath_cache::SymbolKind;
use langsrv_classpath_index::ClasspathSymbolIndex;
use langsrv_compilation::{compile as drive_frontend, visit_ast_full, visit_ast_incremental, PlaceholderGuard};
use langsrv_config::Config;
use langsrv_diagnostics::{compute as compute_diagnostics, Diagnostic, DiagnosticResult};
use langsrv_documents::DocumentTracker;
use langsrv_frontend::{CompilationUnit, CompilerFrontend, Severity};
use langsrv_position::{Position, Range};
use langsrv_scope::{ProjectScope, ScopeState};
use std::collections::HashSet;

/// Compiles `scope` from scratch if it has never been compiled, otherwise
/// a no-op. Returns `None` when nothing happened.
pub fn ensure_compiled(scope: &ProjectScope, tracker: &DocumentTracker, frontend: &dyn CompilerFrontend, config: &Config) -> Option<DiagnosticResult> {
    scope.touch();
    let mut state = scope.write();
    if state.compiled {
        return None;
    }
    Some(full_compile_locked(&mut state, scope, tracker, frontend, config))
}

/// Recompiles `scope` incrementally around `triggering_uri`, expanding
/// through the dependency graph and promoting to a full rebuild if the
/// expanded set grows past the configured fallback fraction.
pub fn compile_and_visit(scope: &ProjectScope, tracker: &DocumentTracker, frontend: &dyn CompilerFrontend, triggering_uri: &str, config: &Config) -> DiagnosticResult {
    scope.touch();
    let mut state = scope.write();
    compile_and_visit_locked(&mut state, scope, tracker, frontend, config, triggering_uri)
}

/// Splices a completion placeholder into `uri` at `position`, compiles
/// with it in place, then restores the original text — the placeholder
/// never outlives this call, but the AST compiled against it does.
/// `None` if `uri` isn't open or `position` doesn't resolve.
pub fn compile_for_completion(
    scope: &ProjectScope,
    tracker: &DocumentTracker,
    frontend: &dyn CompilerFrontend,
    uri: &str,
    position: Position,
    config: &Config,
) -> Option<DiagnosticResult> {
    scope.touch();
    let mut state = scope.write();
    let guard = PlaceholderGuard::inject_completion(tracker, uri, position)?;
    let result = compile_and_visit_locked(&mut state, scope, tracker, frontend, config, uri);
    drop(guard);
    Some(result)
}

/// As [`compile_for_completion`], but closes an unbalanced argument list
/// instead of splicing an identifier.
pub fn compile_for_signature_help(
    scope: &ProjectScope,
    tracker: &DocumentTracker,
    frontend: &dyn CompilerFrontend,
    uri: &str,
    position: Position,
    config: &Config,
) -> Option<DiagnosticResult> {
    scope.touch();
    let mut state = scope.write();
    let guard = PlaceholderGuard::inject_signature_help(tracker, uri, position)?;
    let result = compile_and_visit_locked(&mut state, scope, tracker, frontend, config, uri);
    drop(guard);
    Some(result)
}

fn compile_and_visit_locked(
    state: &mut ScopeState,
    scope: &ProjectScope,
    tracker: &DocumentTracker,
    frontend: &dyn CompilerFrontend,
    config: &Config,
    triggering_uri: &str,
) -> DiagnosticResult {
    if !state.compiled {
        return full_compile_locked(state, scope, tracker, frontend, config);
    }

    let root_uri = project_root_uri(scope);
    let mut changed: HashSet<String> = tracker.changed_under(&root_uri).into_iter().collect();
    changed.insert(triggering_uri.to_string());

    let mut expanded = changed.clone();
    expanded.extend(scope.dep_graph().transitive_dependents(&changed, config.dep_graph_max_transitive_depth));

    let total_sources = state.ast.uris().count().max(1);
    let fraction = expanded.len() as f64 / total_sources as f64;
    if fraction > config.incremental_fallback_fraction {
        tracing::debug!(root = %scope.root().display(), fraction, "incremental set exceeds fallback fraction, promoting to full recompile");
        return full_compile_locked(state, scope, tracker, frontend, config);
    }

    let unit = scope.unit_factory().create_incremental(tracker, &expanded);
    match drive_frontend(frontend, &unit) {
        Some(outcome) => {
            let catastrophic: HashSet<String> = outcome.catastrophic_failures.iter().cloned().collect();
            let index = visit_ast_incremental(&outcome, &state.ast, &expanded, config);
            update_dep_graph(scope, &index, expanded.iter().filter(|u| !catastrophic.contains(*u)).cloned());
            let index = index.recover_uris(&state.ast, &catastrophic);
            let mut result = compute_diagnostics(&unit, &outcome, &root_uri, &state.diagnostics_by_file);
            append_catastrophic_diagnostics(&mut result, &catastrophic);
            state.ast = index;
            state.compiled = true;
            state.diagnostics_by_file = result.diagnostics_by_file.clone();
            tracker.clear_changed_under(&root_uri);
            result
        }
        None => catastrophic_result(state, &unit),
    }
}

fn full_compile_locked(state: &mut ScopeState, scope: &ProjectScope, tracker: &DocumentTracker, frontend: &dyn CompilerFrontend, config: &Config) -> DiagnosticResult {
    let known = known_classpath_names(scope);
    let unit = scope.unit_factory().create(tracker, &known);
    let root_uri = project_root_uri(scope);
    match drive_frontend(frontend, &unit) {
        Some(outcome) => {
            let catastrophic: HashSet<String> = outcome.catastrophic_failures.iter().cloned().collect();
            let index = visit_ast_full(&outcome, config);
            update_dep_graph(scope, &index, index.uris().map(str::to_string).collect::<Vec<_>>());
            let index = index.recover_uris(&state.ast, &catastrophic);
            let mut result = compute_diagnostics(&unit, &outcome, &root_uri, &state.diagnostics_by_file);
            append_catastrophic_diagnostics(&mut result, &catastrophic);
            state.ast = index;
            state.compiled = true;
            state.diagnostics_by_file = result.diagnostics_by_file.clone();
            tracker.clear_changed_under(&root_uri);
            result
        }
        None => catastrophic_result(state, &unit),
    }
}

/// A front-end that couldn't produce any module at all (parser crash,
/// resource exhaustion) leaves the previous AST in place and publishes a
/// synthetic diagnostic on every source in the attempted unit, since
/// there is no per-file locator to pin the failure to.
fn catastrophic_result(state: &mut ScopeState, unit: &CompilationUnit) -> DiagnosticResult {
    tracing::warn!(sources = unit.sources.len(), "compiler produced no modules, retaining previous AST");
    let notice = Diagnostic {
        range: Range::empty(Position::new(0, 0)),
        severity: Severity::Error,
        message: "the compiler failed to produce an abstract syntax tree for this project; results shown are from the last successful compile".to_string(),
    };

    let mut by_file = state.diagnostics_by_file.clone();
    for source in &unit.sources {
        by_file.entry(source.uri.clone()).or_default().push(notice.clone());
    }
    let to_publish = by_file.iter().map(|(uri, diags)| (uri.clone(), diags.clone())).collect();
    state.diagnostics_by_file = by_file.clone();
    DiagnosticResult { to_publish, diagnostics_by_file: by_file }
}

/// Appends a per-file synthetic diagnostic for every URI the front-end
/// reported as a catastrophic per-file failure (present in neither the
/// fresh modules nor, now, dropped from the index) — the counterpart to
/// [`catastrophic_result`]'s whole-unit version, pinned to just the
/// offending files rather than every source in the unit.
fn append_catastrophic_diagnostics(result: &mut DiagnosticResult, uris: &HashSet<String>) {
    if uris.is_empty() {
        return;
    }
    let notice = Diagnostic {
        range: Range::empty(Position::new(0, 0)),
        severity: Severity::Error,
        message: "the compiler failed to produce an abstract syntax tree for this file; results shown are from the last successful compile".to_string(),
    };
    for uri in uris {
        tracing::warn!(uri, "compiler reported a per-file catastrophic failure, retaining previous AST for this file");
        let diags = result.diagnostics_by_file.entry(uri.clone()).or_default();
        diags.push(notice.clone());
        let diags = diags.clone();
        match result.to_publish.iter_mut().find(|(published_uri, _)| published_uri == uri) {
            Some(entry) => entry.1 = diags,
            None => result.to_publish.push((uri.clone(), diags)),
        }
    }
}

/// Resolves each visited URI's dependency FQNs to file URIs via the fresh
/// index's class table, dropping any name that doesn't resolve (a
/// platform class or a name the compiler couldn't bind) and dropping the
/// file's own URI (a class and its superclass/interface declared in the
/// same file must not produce a self-edge).
fn update_dep_graph(scope: &ProjectScope, index: &AstIndex, uris: impl IntoIterator<Item = String>) {
    for uri in uris {
        let resolved: HashSet<String> =
            index.deps_by_uri(&uri).iter().filter_map(|fqn| index.class_by_name(fqn).map(|(u, _)| u.to_string())).filter(|u| u != &uri).collect();
        scope.dep_graph().update(&uri, resolved);
    }
}

/// Fully-qualified names of classes already visible on `scope`'s
/// classpath, so the unit factory can skip generating a synthetic stub
/// for them. Uses every symbol in the underlying scan rather than
/// filtering to this scope's own share of it — a stub skipped in error
/// is harmless, a stub generated in error just duplicates a class the
/// compiler already knows about.
fn known_classpath_names(scope: &ProjectScope) -> HashSet<String> {
    let Some(handle) = scope.classpath_handle() else { return HashSet::new() };
    ClasspathSymbolIndex::new(&handle).all_symbols().iter().filter(|s| s.kind == SymbolKind::Class).map(|s| s.qualified_name.clone()).collect()
}

fn project_root_uri(scope: &ProjectScope) -> String {
    langsrv_uri::fs_path_to_uri(scope.root()).unwrap_or_default()
}
