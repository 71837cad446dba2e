//! Position → node lookup.

use crate::index::AstIndex;
use langsrv_frontend::{Node, NodeKind};
use langsrv_position::Position;
use std::cmp::Ordering;

/// Finds the node at `uri`/`pos` with the tightest, most specific match.
///
/// Among the nodes whose range contains `pos`:
/// 1. the one with the latest start wins (innermost);
/// 2. among equal starts, the one with the earliest end wins (tightest);
/// 3. among identical ranges, the descendant wins over its ancestor,
///    except a class declaration wins over a constructor declaration that
///    shares its range (the constructor's range always coincides with an
///    empty-parameter-list header collapsing onto the class body).
pub(crate) fn node_at<'a>(index: &'a AstIndex, uri: &str, pos: Position) -> Option<&'a Node> {
    let candidates = index.candidates_containing(uri, pos);
    candidates.into_iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            if more_specific(index, candidate, current) {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

fn more_specific(index: &AstIndex, a: &Node, b: &Node) -> bool {
    match a.range().cmp_by_specificity(&b.range()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => tie_break(index, a, b),
    }
}

/// `a` and `b` share an identical range; decide whether `a` should win.
fn tie_break(index: &AstIndex, a: &Node, b: &Node) -> bool {
    if a.kind() == NodeKind::ClassDecl && b.kind() == NodeKind::ConstructorDecl {
        return true;
    }
    if a.kind() == NodeKind::ConstructorDecl && b.kind() == NodeKind::ClassDecl {
        return false;
    }
    depth(index, a) > depth(index, b)
}

fn depth(index: &AstIndex, node: &Node) -> usize {
    let mut d = 0;
    let mut current = node.clone();
    while let Some(parent) = index.parent_of(&current) {
        d += 1;
        current = parent.clone();
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::visit_full;
    use langsrv_frontend::{NodeBuilder, TestFrontend};
    use langsrv_frontend::{CompilationUnit, CompilerFrontend, SourceInput};
    use langsrv_config::Config;

    fn index_of(text: &str) -> (AstIndex, String) {
        let uri = "file:///p/Foo.groovy".to_string();
        let unit = CompilationUnit::new("/p").with_sources(vec![SourceInput::new(uri.clone(), text)]);
        let outcome = TestFrontend::new().compile(&unit);
        let index = visit_full(&outcome.modules, &Config::default());
        (index, uri)
    }

    #[test]
    fn picks_innermost_node() {
        let text = "class Foo {\n    void bar() {\n    }\n}\n";
        let (index, uri) = index_of(text);
        let hit = index.node_at(&uri, 1, 10).expect("a node at that position");
        assert_eq!(hit.kind(), NodeKind::MethodDecl);
    }

    #[test]
    fn class_wins_over_constructor_on_identical_range() {
        let range = langsrv_position::Range::new(Position::new(0, 0), Position::new(2, 1));
        let ctor = NodeBuilder::new(NodeKind::ConstructorDecl, range).build();
        let class = NodeBuilder::new(NodeKind::ClassDecl, range).children(vec![ctor.clone()]).build();
        let module = NodeBuilder::new(NodeKind::Module, range).children(vec![class.clone()]).build();

        let index = visit_full(&[("file:///p/Foo.groovy".to_string(), module)], &Config::default());
        let hit = index.node_at("file:///p/Foo.groovy", 1, 0).unwrap();
        assert_eq!(hit.kind(), NodeKind::ClassDecl);
        assert_eq!(hit.id(), class.id());
    }
}
