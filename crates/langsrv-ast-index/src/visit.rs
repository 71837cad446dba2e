//! Builds an [`AstIndex`] from compiled modules.
//!
//! A full visit (re)builds the whole index from scratch; an incremental
//! visit carries forward entries for every URI outside the changed set and
//! only re-visits the changed ones. Both end in the same two-phase shape:
//! phase one walks each module's node tree (parent map, class table, raw
//! dependency references); phase two resolves those raw references — star
//! imports expand against the now-complete `classes_by_name` table — into
//! the final, filtered `deps_by_uri`.

use crate::index::AstIndex;
use langsrv_config::Config;
use langsrv_frontend::{ImportKind, Node, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};

struct RawDep {
    name: String,
    is_star: bool,
}

#[derive(Default)]
struct Phase1 {
    nodes_by_uri: HashMap<String, Vec<Node>>,
    parents: HashMap<NodeId, Node>,
    classes_by_uri: HashMap<String, Vec<Node>>,
    classes_by_name: HashMap<String, (String, Node)>,
    raw_deps_by_uri: HashMap<String, Vec<RawDep>>,
}

/// Rebuilds the whole index from every module in `modules`.
pub fn visit_full(modules: &[(String, Node)], config: &Config) -> AstIndex {
    let mut phase1 = Phase1::default();
    for (uri, module) in modules {
        visit_module(uri, module, &mut phase1);
    }
    resolve(phase1, config)
}

/// Rebuilds the index for `changed` URIs only, carrying forward every
/// other entry from `previous` unchanged. `modules` must contain exactly
/// the modules for `changed`.
pub fn visit_incremental(previous: &AstIndex, changed: &HashSet<String>, modules: &[(String, Node)], config: &Config) -> AstIndex {
    let mut phase1 = Phase1::default();

    for (uri, nodes) in &previous.nodes_by_uri {
        if !changed.contains(uri) {
            phase1.nodes_by_uri.insert(uri.clone(), nodes.clone());
        }
    }
    // Carried wholesale: entries for re-visited URIs key off their old
    // (now-unreferenced) node identities and are simply never looked up
    // again once `walk` below inserts fresh entries for those URIs.
    phase1.parents = previous.parents.clone();
    for (uri, classes) in &previous.classes_by_uri {
        if !changed.contains(uri) {
            phase1.classes_by_uri.insert(uri.clone(), classes.clone());
        }
    }
    for (name, (uri, node)) in &previous.classes_by_name {
        if !changed.contains(uri) {
            phase1.classes_by_name.insert(name.clone(), (uri.clone(), node.clone()));
        }
    }

    for (uri, module) in modules {
        phase1.nodes_by_uri.remove(uri);
        phase1.classes_by_uri.remove(uri);
        phase1.classes_by_name.retain(|_, (owner, _)| owner != uri);
        visit_module(uri, module, &mut phase1);
    }

    resolve(phase1, config)
}

fn visit_module(uri: &str, module: &Node, phase1: &mut Phase1) {
    let out_nodes = phase1.nodes_by_uri.entry(uri.to_string()).or_default();
    let out_classes = phase1.classes_by_uri.entry(uri.to_string()).or_default();
    let out_deps = phase1.raw_deps_by_uri.entry(uri.to_string()).or_default();
    walk(module, uri, None, out_nodes, &mut phase1.parents, out_classes, &mut phase1.classes_by_name, out_deps);
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: &Node,
    uri: &str,
    parent: Option<&Node>,
    out_nodes: &mut Vec<Node>,
    parents: &mut HashMap<NodeId, Node>,
    out_classes: &mut Vec<Node>,
    classes_by_name: &mut HashMap<String, (String, Node)>,
    out_deps: &mut Vec<RawDep>,
) {
    if node.is_synthetic() {
        for child in node.children() {
            walk(child, uri, parent, out_nodes, parents, out_classes, classes_by_name, out_deps);
        }
        return;
    }

    out_nodes.push(node.clone());
    if let Some(p) = parent {
        parents.insert(node.id(), p.clone());
    }

    match node.kind() {
        NodeKind::ClassDecl => {
            out_classes.push(node.clone());
            if let Some(qn) = node.qualified_name() {
                classes_by_name.insert(qn.to_string(), (uri.to_string(), node.clone()));
            }
            if let Some(sup) = node.superclass() {
                out_deps.push(RawDep { name: sup.to_string(), is_star: false });
            }
            for iface in node.interfaces() {
                out_deps.push(RawDep { name: iface.clone(), is_star: false });
            }
        }
        NodeKind::Import => {
            if let Some(name) = node.imported_name() {
                let is_star = matches!(node.import_kind(), Some(ImportKind::Star) | Some(ImportKind::StaticStar));
                out_deps.push(RawDep { name: name.to_string(), is_star });
            }
        }
        _ => {}
    }

    for child in node.children() {
        walk(child, uri, Some(node), out_nodes, parents, out_classes, classes_by_name, out_deps);
    }
}

fn resolve(phase1: Phase1, config: &Config) -> AstIndex {
    let mut deps_by_uri = HashMap::new();
    for (uri, raw_deps) in &phase1.raw_deps_by_uri {
        let mut resolved: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for dep in raw_deps {
            if dep.is_star {
                let prefix = dep.name.trim_end_matches('*').trim_end_matches('.');
                for name in phase1.classes_by_name.keys() {
                    if let Some(rest) = name.strip_prefix(prefix) {
                        if rest.starts_with('.') && !config.is_filtered_namespace(name) && seen.insert(name.clone()) {
                            resolved.push(name.clone());
                        }
                    }
                }
            } else if !config.is_filtered_namespace(&dep.name) && seen.insert(dep.name.clone()) {
                resolved.push(dep.name.clone());
            }
        }
        resolved.sort();
        deps_by_uri.insert(uri.clone(), resolved);
    }

    AstIndex {
        nodes_by_uri: phase1.nodes_by_uri,
        parents: phase1.parents,
        classes_by_uri: phase1.classes_by_uri,
        classes_by_name: phase1.classes_by_name,
        deps_by_uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsrv_frontend::{CompilationUnit, CompilerFrontend, SourceInput, TestFrontend};
    use std::collections::HashSet;

    fn compile(sources: &[(&str, &str)]) -> Vec<(String, Node)> {
        let inputs: Vec<SourceInput> = sources.iter().map(|(uri, text)| SourceInput::new(*uri, *text)).collect();
        let unit = CompilationUnit::new("/p").with_sources(inputs);
        TestFrontend::new().compile(&unit).modules
    }

    #[test]
    fn class_and_import_deps_populate_deps_by_uri() {
        let modules = compile(&[(
            "file:///p/Widget.groovy",
            "import java.util.List\nimport com.example.Helper\nclass Widget extends com.example.Base implements com.example.Drawable {\n}\n",
        )]);
        let index = visit_full(&modules, &Config::default());
        let deps = index.deps_by_uri("file:///p/Widget.groovy");
        assert!(!deps.contains(&"java.util.List".to_string()), "runtime namespace should be filtered");
        assert!(deps.contains(&"com.example.Helper".to_string()));
        assert!(deps.contains(&"com.example.Base".to_string()));
        assert!(deps.contains(&"com.example.Drawable".to_string()));
    }

    #[test]
    fn star_import_expands_against_known_classes() {
        let modules = compile(&[
            ("file:///p/Other.groovy", "package com.example.other\nclass Helper {\n}\n"),
            ("file:///p/Widget.groovy", "import com.example.other.*\nclass Widget {\n}\n"),
        ]);
        let index = visit_full(&modules, &Config::default());
        let deps = index.deps_by_uri("file:///p/Widget.groovy");
        assert!(deps.contains(&"com.example.other.Helper".to_string()));
    }

    #[test]
    fn incremental_visit_carries_forward_unchanged_uris() {
        let modules = compile(&[
            ("file:///p/A.groovy", "class A {\n}\n"),
            ("file:///p/B.groovy", "class B extends A {\n}\n"),
        ]);
        let full = visit_full(&modules, &Config::default());
        assert!(full.class_by_name("A").is_some());

        let changed_modules = compile(&[("file:///p/B.groovy", "class B extends A {\n    void x() {\n    }\n}\n")]);
        let mut changed = HashSet::new();
        changed.insert("file:///p/B.groovy".to_string());
        let incremental = visit_incremental(&full, &changed, &changed_modules, &Config::default());

        assert!(incremental.class_by_name("A").is_some(), "unchanged class carried forward");
        let b = incremental.class_by_name("B").unwrap().1;
        assert_eq!(b.children().len(), 1, "re-visited class reflects the new method");
    }
}
