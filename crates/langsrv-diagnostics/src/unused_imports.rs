//! Unused-import detection.
//!
//! The AST handed back by a front-end only exposes shape for declarations
//! the engine indexes (imports, classes, methods); statement and
//! expression bodies are opaque [`NodeKind::Other`] nodes. So rather than
//! walk referenced-type nodes that don't exist, this scans the module's
//! own source text for a whole-word occurrence of each import's simple
//! name outside the import statement itself — the same signal a
//! "references anywhere in the body" check would produce, without
//! needing expression-level AST fidelity.

use langsrv_frontend::{ImportKind, Node, NodeKind};
use langsrv_position::Range;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::Diagnostic;

/// Names always considered "used" regardless of textual occurrence —
/// primitives and a handful of types so ubiquitous that flagging their
/// import would be noise no reviewer wants.
const ALWAYS_USED: &[&str] = &["int", "long", "short", "byte", "char", "boolean", "float", "double", "void", "Object", "String"];

#[allow(clippy::unwrap_used)]
static WORD: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[A-Za-z_][A-Za-z0-9_]*") {
    Ok(re) => re,
    Err(_) => unreachable!("WORD regex failed to compile"),
});

/// Computes unused-import diagnostics for one compiled module.
///
/// `source` is the exact text the module was compiled from (so import
/// line numbers line up with the AST's ranges).
pub fn unused_import_diagnostics(source: &str, module: &Node) -> Vec<Diagnostic> {
    if module.kind() != NodeKind::Module {
        return Vec::new();
    }
    let lines: Vec<&str> = source.lines().collect();

    module
        .children()
        .iter()
        .filter(|child| child.kind() == NodeKind::Import)
        .filter_map(|import| unused_diagnostic_for(import, &lines))
        .collect()
}

fn unused_diagnostic_for(import: &Node, lines: &[&str]) -> Option<Diagnostic> {
    if import.is_synthetic() {
        return None;
    }
    match import.import_kind() {
        Some(ImportKind::Regular) | Some(ImportKind::Static) => {}
        _ => return None,
    }
    let imported_name = import.imported_name()?;
    let simple_name = import.imported_alias().unwrap_or_else(|| simple_name_of(imported_name));
    if ALWAYS_USED.contains(&simple_name) {
        return None;
    }

    let import_line = import.range().start.line as usize;
    let referenced = lines.iter().enumerate().any(|(i, line)| {
        if i == import_line {
            return false;
        }
        WORD.find_iter(line).any(|m| m.as_str() == simple_name)
    });
    if referenced {
        return None;
    }

    Some(Diagnostic {
        range: import.range(),
        severity: langsrv_frontend::Severity::Warning,
        message: format!("Unused import: '{imported_name}'"),
    })
}

fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
