//! A single project-rooted compilation scope.

use langsrv_ast_index::AstIndex;
use langsrv_classpath_cache::ScanHandle;
use langsrv_compilation::CompilationUnitFactory;
use langsrv_depgraph::DepGraph;
use langsrv_diagnostics::Diagnostic;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The mutable part of a scope's analysis state, swapped wholesale on
/// every (re)compile — never edited field-by-field by a reader.
pub struct ScopeState {
    pub ast: AstIndex,
    pub compiled: bool,
    pub diagnostics_by_file: HashMap<String, Vec<Diagnostic>>,
}

impl Default for ScopeState {
    fn default() -> Self {
        Self { ast: AstIndex::empty(), compiled: false, diagnostics_by_file: HashMap::new() }
    }
}

/// A single project's compilation + AST + classpath context.
///
/// The read-write lock around [`ScopeState`] is the single-writer/
/// multiple-readers boundary: a query holds the read lock for its whole
/// lifetime, a compile holds the write lock across placeholder-inject →
/// compile → visit → restore so a scope never compiles concurrently with
/// itself.
pub struct ProjectScope {
    root: PathBuf,
    build_tool_tag: String,
    state: RwLock<ScopeState>,
    classpath_handle: Mutex<Option<ScanHandle>>,
    unit_factory: CompilationUnitFactory,
    dep_graph: DepGraph,
    last_access: Mutex<Instant>,
}

impl ProjectScope {
    /// `classpath` is handed to the unit factory as its *additional*
    /// classpath (the factory's base classpath is always empty for a
    /// managed scope) so [`crate::ProjectScopeManager::invalidate_classpath`]
    /// can replace it wholesale later.
    pub fn new(root: PathBuf, build_tool_tag: String, source_extension: &str, classpath: Vec<PathBuf>) -> Self {
        let unit_factory = CompilationUnitFactory::new(root.clone(), source_extension, Vec::new());
        unit_factory.set_additional_classpath(classpath);
        Self {
            unit_factory,
            root,
            build_tool_tag,
            state: RwLock::new(ScopeState::default()),
            classpath_handle: Mutex::new(None),
            dep_graph: DepGraph::new(),
            last_access: Mutex::new(Instant::now()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_tool_tag(&self) -> &str {
        &self.build_tool_tag
    }

    pub fn unit_factory(&self) -> &CompilationUnitFactory {
        &self.unit_factory
    }

    pub fn dep_graph(&self) -> &DepGraph {
        &self.dep_graph
    }

    /// Acquires the scope's read lock. Held across any AST query.
    pub fn read(&self) -> RwLockReadGuard<'_, ScopeState> {
        self.state.read()
    }

    /// Acquires the scope's write lock. Held across
    /// placeholder-inject → compile → visit → restore.
    pub fn write(&self) -> RwLockWriteGuard<'_, ScopeState> {
        self.state.write()
    }

    pub fn classpath_handle(&self) -> Option<ScanHandle> {
        self.classpath_handle.lock().clone()
    }

    pub fn set_classpath_handle(&self, handle: Option<ScanHandle>) {
        *self.classpath_handle.lock() = handle;
    }

    /// Records this scope as just-accessed, for LRU eviction ordering.
    pub fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    pub fn last_access(&self) -> Instant {
        *self.last_access.lock()
    }

    /// Releases this scope's heavy resident state (AST snapshot, marking
    /// it uncompiled) without removing the scope itself — the next
    /// operation against this root simply recompiles from scratch. Used
    /// by [`crate::ProjectScopeManager::evict_idle`].
    pub fn release_resident_state(&self) {
        let mut state = self.state.write();
        state.ast = AstIndex::empty();
        state.compiled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_scope_is_uncompiled_with_an_empty_ast() {
        let scope = ProjectScope::new(PathBuf::from("/proj"), "gradle".to_string(), "groovy", Vec::new());
        let state = scope.read();
        assert!(!state.compiled);
        assert!(state.ast.uris().next().is_none());
    }

    #[test]
    fn touch_advances_last_access() {
        let scope = ProjectScope::new(PathBuf::from("/proj"), "gradle".to_string(), "groovy", Vec::new());
        let first = scope.last_access();
        std::thread::sleep(std::time::Duration::from_millis(5));
        scope.touch();
        assert!(scope.last_access() > first);
    }
}
