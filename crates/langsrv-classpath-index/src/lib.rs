//! Scope-local view over a shared classpath scan.
//!
//! A [`langsrv_classpath_cache::ScanHandle`] may be shared by several
//! scopes (it was reused via the superset or overlap path); this crate is
//! what turns that shared, possibly-too-broad scan into the symbol set one
//! particular scope is actually entitled to see.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use langsrv_classpath_cache::{ClasspathSymbol, ScanHandle, SymbolKind};
use std::collections::HashSet;
use std::path::PathBuf;

/// Scope-local symbol lookup over a (possibly shared) classpath scan.
///
/// Built lazily once per [`ScanHandle`]; cheap to construct repeatedly
/// since it only borrows the handle's `Arc<ScanResult>`.
pub struct ClasspathSymbolIndex<'a> {
    handle: &'a ScanHandle,
}

impl<'a> ClasspathSymbolIndex<'a> {
    pub fn new(handle: &'a ScanHandle) -> Self {
        Self { handle }
    }

    /// Every symbol in the underlying scan, without filtering to this
    /// scope's own classpath. Used when the scan was an exact hit (the
    /// scan *is* this scope's classpath).
    pub fn all_symbols(&self) -> &[ClasspathSymbol] {
        &self.handle.scan.symbols
    }

    /// Distinct packages declared anywhere in the underlying scan.
    pub fn packages(&self) -> HashSet<&str> {
        self.handle.scan.symbols.iter().map(|s| s.package.as_str()).collect()
    }

    /// Symbols belonging to this scope: every symbol with no owning path
    /// (a runtime/module symbol, always in scope), plus, when the scan
    /// was reused from a broader classpath (`own_files` is set), only
    /// those whose owning path is in `own_paths`.
    ///
    /// When `own_files` is `None` (an exact hit), every symbol in the
    /// scan already belongs to this scope and is returned unfiltered.
    pub fn symbols_for(&self, own_paths: &HashSet<PathBuf>) -> Vec<&ClasspathSymbol> {
        match &self.handle.own_files {
            None => self.handle.scan.symbols.iter().collect(),
            Some(_) => self
                .handle
                .scan
                .symbols
                .iter()
                .filter(|s| match &s.owning_path {
                    None => true,
                    Some(path) => own_paths.contains(path),
                })
                .collect(),
        }
    }

    pub fn symbols_of_kind(&self, own_paths: &HashSet<PathBuf>, kind: SymbolKind) -> Vec<&ClasspathSymbol> {
        self.symbols_for(own_paths).into_iter().filter(|s| s.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsrv_classpath_cache::ScanResult;
    use std::sync::Arc;

    fn symbol(name: &str, owning: Option<&str>, kind: SymbolKind) -> ClasspathSymbol {
        ClasspathSymbol {
            simple_name: name.to_string(),
            qualified_name: format!("com.example.{name}"),
            package: "com.example".to_string(),
            kind,
            owning_path: owning.map(PathBuf::from),
        }
    }

    fn handle(symbols: Vec<ClasspathSymbol>, own_files: Option<HashSet<PathBuf>>) -> ScanHandle {
        ScanHandle { key: "k".to_string(), scan: Arc::new(ScanResult { symbols }), own_files }
    }

    #[test]
    fn exact_hit_returns_every_symbol_unfiltered() {
        let h = handle(vec![symbol("A", Some("/a.jar"), SymbolKind::Class)], None);
        let index = ClasspathSymbolIndex::new(&h);
        assert_eq!(index.symbols_for(&HashSet::new()).len(), 1);
    }

    #[test]
    fn superset_hit_filters_to_own_paths_plus_runtime_symbols() {
        let symbols = vec![
            symbol("Mine", Some("/a.jar"), SymbolKind::Class),
            symbol("Theirs", Some("/b.jar"), SymbolKind::Class),
            symbol("Runtime", None, SymbolKind::Class),
        ];
        let mut own = HashSet::new();
        own.insert(PathBuf::from("/a.jar"));
        let h = handle(symbols, Some(own.clone()));
        let index = ClasspathSymbolIndex::new(&h);
        let visible: HashSet<&str> = index.symbols_for(&own).into_iter().map(|s| s.simple_name.as_str()).collect();
        assert_eq!(visible, ["Mine", "Runtime"].into_iter().collect());
    }

    #[test]
    fn symbols_of_kind_filters_by_kind() {
        let symbols = vec![symbol("A", None, SymbolKind::Class), symbol("b", None, SymbolKind::Method)];
        let h = handle(symbols, None);
        let index = ClasspathSymbolIndex::new(&h);
        let methods = index.symbols_of_kind(&HashSet::new(), SymbolKind::Method);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].simple_name, "b");
    }
}
