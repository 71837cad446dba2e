//! The external-classpath-scanner boundary.
//!
//! Scanning jars and `.class` files for declared symbols is, like parsing
//! source text, explicitly out of scope for this engine — it only defines
//! the shape a scan result takes and the trait an external scanner
//! implements.

use langsrv_error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a [`ClasspathSymbol`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Class,
    Field,
    Method,
}

/// One symbol declared somewhere on a scanned classpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathSymbol {
    pub simple_name: String,
    pub qualified_name: String,
    pub package: String,
    pub kind: SymbolKind,
    /// The classpath element (jar file or directory) that contributed
    /// this symbol. `None` marks a runtime/module symbol with no single
    /// owning file — always considered in scope regardless of which
    /// `own_paths` filter a consumer applies.
    pub owning_path: Option<PathBuf>,
}

/// The result of scanning a classpath: every symbol declared by any
/// element on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbols: Vec<ClasspathSymbol>,
}

/// The trait boundary for an external classpath scanner (jar/classfile
/// introspection). The engine only drives an implementation through this
/// trait and reads the [`ScanResult`] it produces.
pub trait ClasspathScanner: Send + Sync {
    fn scan(&self, urls: &[PathBuf]) -> CoreResult<ScanResult>;
}
