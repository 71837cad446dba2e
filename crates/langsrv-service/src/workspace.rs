//! Cross-scope workspace-symbol search.

use langsrv_documents::DocumentTracker;
use langsrv_position::Range;
use langsrv_scope::ProjectScopeManager;
use std::collections::HashSet;
use std::path::PathBuf;

/// One class found while searching across every scope with an open
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatch {
    pub qualified_name: String,
    pub uri: String,
    pub range: Range,
}

/// Searches for `query` as a substring of a class's qualified name,
/// across every scope that currently owns at least one open document.
/// No cross-scope deduplication: a class visible from two scopes (e.g.
/// a shared library module) is reported once per scope.
pub fn workspace_symbols(manager: &ProjectScopeManager, tracker: &DocumentTracker, query: &str) -> Vec<SymbolMatch> {
    let mut seen_roots: HashSet<PathBuf> = HashSet::new();
    let scopes: Vec<_> = tracker
        .open_uris()
        .into_iter()
        .map(|uri| manager.find_scope(&uri))
        .filter(|scope| seen_roots.insert(scope.root().to_path_buf()))
        .collect();

    let mut matches = Vec::new();
    for scope in scopes {
        let state = scope.read();
        for (name, uri, node) in state.ast.classes_by_name_iter() {
            if name.contains(query) {
                matches.push(SymbolMatch { qualified_name: name.to_string(), uri: uri.to_string(), range: node.range() });
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::ensure_compiled;
    use langsrv_classpath_cache::ClasspathScanCache;
    use langsrv_config::Config;
    use langsrv_frontend::TestFrontend;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn only_scopes_with_an_open_document_are_searched() {
        let config = Config::default();
        let manager = ProjectScopeManager::new(config.clone(), Arc::new(ClasspathScanCache::new(None, false, 0.9)), "groovy");

        let dir_a = tempfile::tempdir().unwrap();
        fs::write(dir_a.path().join("Alpha.groovy"), "class Alpha {}\n").unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        fs::write(dir_b.path().join("Beta.groovy"), "class Beta {}\n").unwrap();

        let scope_a = manager.register_scope(dir_a.path().to_path_buf(), "gradle", Vec::new());
        let scope_b = manager.register_scope(dir_b.path().to_path_buf(), "gradle", Vec::new());

        let tracker = DocumentTracker::new();
        ensure_compiled(&scope_a, &tracker, &TestFrontend::new(), &config);
        ensure_compiled(&scope_b, &tracker, &TestFrontend::new(), &config);

        let uri_a = langsrv_uri::fs_path_to_uri(dir_a.path().join("Alpha.groovy")).unwrap();
        tracker.open(&uri_a, "class Alpha {}\n".to_string(), 1).unwrap();

        let matches = workspace_symbols(&manager, &tracker, "");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].qualified_name, "Alpha");
    }

    #[test]
    fn matches_by_substring_of_the_qualified_name() {
        let config = Config::default();
        let manager = ProjectScopeManager::new(config.clone(), Arc::new(ClasspathScanCache::new(None, false, 0.9)), "groovy");
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Widget.groovy"), "package com.example\nclass Widget {}\n").unwrap();
        let scope = manager.register_scope(dir.path().to_path_buf(), "gradle", Vec::new());

        let tracker = DocumentTracker::new();
        ensure_compiled(&scope, &tracker, &TestFrontend::new(), &config);
        let uri = langsrv_uri::fs_path_to_uri(dir.path().join("Widget.groovy")).unwrap();
        tracker.open(&uri, "package com.example\nclass Widget {}\n".to_string(), 1).unwrap();

        assert_eq!(workspace_symbols(&manager, &tracker, "Widg").len(), 1);
        assert!(workspace_symbols(&manager, &tracker, "Nope").is_empty());
    }
}
