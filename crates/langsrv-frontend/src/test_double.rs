//! A tiny, deterministic in-memory stand-in for the real compiler
//! front-end, used only by this workspace's own test suite.
//!
//! `TestFrontend` understands a minimal line-oriented notation — enough
//! to build a module tree with imports, classes (with a superclass and
//! interfaces), and constructor/method declarations — without pulling in
//! a real parser. It recognizes a few comment-shaped directives so tests
//! can script compiler diagnostics and catastrophic failures:
//!
//! - `// SYNTHETIC` — the next declaration is marked synthetic.
//! - `// ERROR: <message>` — emits a compiler error at that line.
//! - `// FATAL: <message>` — the whole source fails to produce a module.
//!
//! ```text
//! package com.example
//! import java.util.List
//! import com.example.other.*
//!
//! class Widget extends Base implements Drawable {
//!     Widget() {
//!     }
//!     void draw() {
//!     }
//! }
//! ```

use crate::node::{ImportKind, Node, NodeBuilder, NodeKind};
use crate::unit::{CompilationUnit, CompileOutcome, CompilerFrontend, CompilerMessage, Severity};
use langsrv_position::{Position, Range};

/// See the module docs for the notation this front-end understands.
#[derive(Debug, Default)]
pub struct TestFrontend;

impl TestFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl CompilerFrontend for TestFrontend {
    fn compile(&self, unit: &CompilationUnit) -> CompileOutcome {
        let mut outcome = CompileOutcome::default();
        for source in &unit.sources {
            match parse_module(&source.text) {
                Ok(parsed) => {
                    outcome.modules.push((source.uri.clone(), parsed.module));
                    for msg in parsed.messages {
                        outcome.messages.push(CompilerMessage {
                            uri: Some(source.uri.clone()),
                            line: msg.line,
                            column: 0,
                            end_line: msg.line,
                            end_column: msg.line_len,
                            severity: Severity::Error,
                            message: msg.message,
                        });
                    }
                }
                Err(fatal) => {
                    outcome.catastrophic_failures.push(source.uri.clone());
                    outcome.messages.push(CompilerMessage {
                        uri: Some(source.uri.clone()),
                        line: 0,
                        column: 0,
                        end_line: 0,
                        end_column: 0,
                        severity: Severity::Error,
                        message: fatal,
                    });
                }
            }
        }
        outcome
    }
}

struct ParsedMessage {
    line: i64,
    line_len: i64,
    message: String,
}

struct ParsedModule {
    module: Node,
    messages: Vec<ParsedMessage>,
}

fn parse_module(text: &str) -> Result<ParsedModule, String> {
    let lines: Vec<&str> = text.lines().collect();
    let pos_at = |line: usize, col: usize| -> Position { Position::new(line as u32, col as u32) };

    let mut package: Option<String> = None;
    let mut pending_synthetic = false;
    let mut messages = Vec::new();
    let mut top_level = Vec::new();

    let mut i = 0usize;
    while i < lines.len() {
        let raw = lines[i];
        let trimmed = raw.trim();

        if let Some(rest) = trimmed.strip_prefix("package ") {
            package = Some(rest.trim_end_matches(';').trim().to_string());
            i += 1;
            continue;
        }
        if trimmed == "// SYNTHETIC" {
            pending_synthetic = true;
            i += 1;
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("// ERROR:") {
            messages.push(ParsedMessage {
                line: i as i64,
                line_len: raw.len() as i64,
                message: rest.trim().to_string(),
            });
            i += 1;
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("// FATAL:") {
            return Err(rest.trim().to_string());
        }
        if let Some(rest) = trimmed.strip_prefix("import ") {
            let (import_kind, name, alias) = parse_import(rest);
            let node = NodeBuilder::new(NodeKind::Import, Range::new(pos_at(i, 0), pos_at(i, raw.len())))
                .synthetic(std::mem::take(&mut pending_synthetic))
                .imported_name(name)
                .import_kind(import_kind);
            let node = if let Some(alias) = alias { node.imported_alias(alias) } else { node };
            top_level.push(node.build());
            i += 1;
            continue;
        }
        if trimmed.starts_with("class ") || trimmed.contains(" class ") {
            let synthetic = std::mem::take(&mut pending_synthetic);
            let (class_node, next_i) = parse_class(&lines, i, package.as_deref(), synthetic, &pos_at);
            top_level.push(class_node);
            i = next_i;
            continue;
        }
        i += 1;
    }

    let module_range = Range::new(
        Position::new(0, 0),
        pos_at(lines.len().saturating_sub(1), lines.last().map(|l| l.len()).unwrap_or(0)),
    );
    let module = NodeBuilder::new(NodeKind::Module, module_range).children(top_level).build();
    Ok(ParsedModule { module, messages })
}

fn parse_import(rest: &str) -> (ImportKind, String, Option<String>) {
    let rest = rest.trim_end_matches(';').trim();
    let (is_static, rest) = match rest.strip_prefix("static ") {
        Some(r) => (true, r.trim()),
        None => (false, rest),
    };
    let (body, alias) = match rest.split_once(" as ") {
        Some((b, a)) => (b.trim(), Some(a.trim().to_string())),
        None => (rest, None),
    };
    let is_star = body.ends_with(".*");
    let kind = match (is_static, is_star) {
        (true, true) => ImportKind::StaticStar,
        (true, false) => ImportKind::Static,
        (false, true) => ImportKind::Star,
        (false, false) => ImportKind::Regular,
    };
    (kind, body.to_string(), alias)
}

fn parse_class(
    lines: &[&str],
    start: usize,
    package: Option<&str>,
    synthetic: bool,
    pos_at: &dyn Fn(usize, usize) -> Position,
) -> (Node, usize) {
    let header = lines[start].trim();
    let (name, superclass, interfaces) = parse_class_header(header);
    let qualified_name = match package {
        Some(pkg) if !pkg.is_empty() => format!("{pkg}.{name}"),
        _ => name.clone(),
    };

    let end = find_matching_close(lines, start);
    let mut members = Vec::new();
    let mut j = start + 1;
    let mut pending_member_synthetic = false;
    while j < end {
        let raw = lines[j];
        let trimmed = raw.trim();
        if trimmed == "// SYNTHETIC" {
            pending_member_synthetic = true;
            j += 1;
            continue;
        }
        if trimmed.ends_with('{') && trimmed.contains('(') {
            let member_end = find_matching_close(lines, j);
            if let Some(member_name) = extract_member_name(trimmed) {
                let kind = if member_name == name { NodeKind::ConstructorDecl } else { NodeKind::MethodDecl };
                let range = Range::new(pos_at(j, 0), pos_at(member_end, lines[member_end].len()));
                members.push(
                    NodeBuilder::new(kind, range)
                        .synthetic(std::mem::take(&mut pending_member_synthetic))
                        .qualified_name(format!("{qualified_name}.{member_name}"))
                        .build(),
                );
            }
            j = member_end + 1;
            continue;
        }
        j += 1;
    }

    let range = Range::new(pos_at(start, 0), pos_at(end, lines[end].len()));
    let mut builder = NodeBuilder::new(NodeKind::ClassDecl, range)
        .synthetic(synthetic)
        .qualified_name(qualified_name)
        .interfaces(interfaces)
        .children(members);
    if let Some(sup) = superclass {
        builder = builder.superclass(sup);
    }
    (builder.build(), end + 1)
}

fn parse_class_header(header: &str) -> (String, Option<String>, Vec<String>) {
    let header = header.trim_end_matches('{').trim();
    let after_class = header.split_once("class ").map(|(_, r)| r).unwrap_or(header).trim();

    let (name_part, rest) = match after_class.split_once("extends") {
        Some((n, r)) => (n.trim(), Some(r.trim())),
        None => match after_class.split_once("implements") {
            Some((n, r)) => (n.trim(), Some(r.trim())),
            None => (after_class.trim(), None),
        },
    };
    let name = name_part.split_whitespace().next().unwrap_or(name_part).to_string();

    let mut superclass = None;
    let mut interfaces = Vec::new();
    if let Some(rest) = rest {
        if let Some((sup, impls)) = rest.split_once("implements") {
            let sup = sup.trim();
            if !sup.is_empty() {
                superclass = Some(sup.to_string());
            }
            interfaces = impls.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        } else if header.contains("extends") {
            let sup = rest.trim();
            if !sup.is_empty() {
                superclass = Some(sup.to_string());
            }
        } else {
            interfaces = rest.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
    }

    (name, superclass, interfaces)
}

fn extract_member_name(header: &str) -> Option<String> {
    let before_paren = header.split('(').next()?.trim();
    before_paren.split_whitespace().last().map(str::to_string)
}

/// Finds the line index at which the brace opened on `lines[start]`
/// closes, by counting `{`/`}` across lines starting at `start`.
fn find_matching_close(lines: &[&str], start: usize) -> usize {
    let mut depth = 0i32;
    for (offset, line) in lines.iter().enumerate().skip(start) {
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return offset;
                    }
                }
                _ => {}
            }
        }
    }
    lines.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::SourceInput;

    fn compile_one(text: &str) -> CompileOutcome {
        let unit = CompilationUnit::new("/proj").with_sources(vec![SourceInput::new("file:///proj/Widget.groovy", text)]);
        TestFrontend::new().compile(&unit)
    }

    #[test]
    fn parses_imports_and_class_shape() {
        let text = "package com.example\nimport java.util.List\nimport com.example.other.*\n\nclass Widget extends Base implements Drawable, Sized {\n    Widget() {\n    }\n    void draw() {\n    }\n}\n";
        let outcome = compile_one(text);
        assert!(outcome.catastrophic_failures.is_empty());
        assert_eq!(outcome.modules.len(), 1);
        let (_, module) = &outcome.modules[0];
        assert_eq!(module.kind(), NodeKind::Module);

        let imports: Vec<_> = module.children().iter().filter(|n| n.kind() == NodeKind::Import).collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].imported_name(), Some("java.util.List"));
        assert_eq!(imports[0].import_kind(), Some(ImportKind::Regular));
        assert_eq!(imports[1].import_kind(), Some(ImportKind::Star));

        let class = module.children().iter().find(|n| n.kind() == NodeKind::ClassDecl).unwrap();
        assert_eq!(class.qualified_name(), Some("com.example.Widget"));
        assert_eq!(class.superclass(), Some("Base"));
        assert_eq!(class.interfaces(), &["Drawable".to_string(), "Sized".to_string()]);

        let ctor = class.children().iter().find(|n| n.kind() == NodeKind::ConstructorDecl);
        assert!(ctor.is_some());
        let method = class.children().iter().find(|n| n.kind() == NodeKind::MethodDecl);
        assert!(method.is_some());
    }

    #[test]
    fn synthetic_directive_marks_next_node() {
        let text = "// SYNTHETIC\nimport java.util.List\nclass Foo {\n}\n";
        let outcome = compile_one(text);
        let (_, module) = &outcome.modules[0];
        let import = module.children().iter().find(|n| n.kind() == NodeKind::Import).unwrap();
        assert!(import.is_synthetic());
    }

    #[test]
    fn error_directive_emits_a_message() {
        let text = "class Foo {\n    // ERROR: unexpected token\n}\n";
        let outcome = compile_one(text);
        assert_eq!(outcome.messages.len(), 1);
        assert!(outcome.messages[0].message.contains("unexpected token"));
    }

    #[test]
    fn fatal_directive_yields_no_module() {
        let text = "// FATAL: parser crashed\nclass Foo {}\n";
        let outcome = compile_one(text);
        assert!(outcome.modules.is_empty());
        assert_eq!(outcome.catastrophic_failures, vec!["file:///proj/Widget.groovy".to_string()]);
    }

    #[test]
    fn node_identities_are_stable_across_repeated_children_calls() {
        let text = "class Foo {\n    void bar() {\n    }\n}\n";
        let outcome = compile_one(text);
        let (_, module) = &outcome.modules[0];
        let a: Vec<_> = module.children().iter().map(Node::id).collect();
        let b: Vec<_> = module.children().iter().map(Node::id).collect();
        assert_eq!(a, b);
    }
}
