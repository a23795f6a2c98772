use tree_sitter::{Node, Parser};

use super::{Callable, CallableKind, NodeKind, ParseError, StructuralNode, ValueShape};

/// What the nearest recognised ancestor of a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Enclosing {
    Module,
    /// if / for / while
    Control,
    Class(String),
    Other,
}

pub fn parse_tree(source: &str, grammar: &tree_sitter::Language) -> Result<StructuralNode, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| ParseError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Grammar("parser produced no tree".to_string()))?;
    let root = tree.root_node();

    if root.has_error() {
        if let Some(problem) = first_problem(root) {
            let message = if problem.is_missing() {
                format!("expected {}", problem.kind())
            } else {
                "invalid syntax".to_string()
            };
            return Err(ParseError::Syntax {
                line: problem.start_position().row + 1,
                message,
            });
        }
    }

    let mut children = Vec::new();
    collect(root, source, &Enclosing::Module, &mut children);
    Ok(StructuralNode {
        kind: NodeKind::Module,
        line: 1,
        children,
    })
}

/// First ERROR or MISSING node in document order.
fn first_problem(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_problem(child) {
                return Some(found);
            }
        }
    }
    None
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token)
}

/// Walk the named children of `node`. Recognised ones become structural
/// nodes; everything else is looked through.
fn collect(node: Node, source: &str, enclosing: &Enclosing, out: &mut Vec<StructuralNode>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match recognise(child, source, enclosing) {
            Some((kind, line, body_encl)) => {
                let mut children = Vec::new();
                if has_body(&kind) {
                    collect(definition_of(child), source, &body_encl, &mut children);
                }
                out.push(StructuralNode {
                    kind,
                    line,
                    children,
                });
            }
            None => collect(child, source, enclosing, out),
        }
    }
}

/// Statements that can hold further statements.
fn has_body(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Function(_)
            | NodeKind::Class { .. }
            | NodeKind::ForLoop { .. }
            | NodeKind::WhileLoop { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::With { .. }
            | NodeKind::Try { .. }
    )
}

/// The node whose body holds the children of `node`.
fn definition_of(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn recognise(node: Node, source: &str, enclosing: &Enclosing) -> Option<(NodeKind, usize, Enclosing)> {
    let line = node.start_position().row + 1;
    match node.kind() {
        "decorated_definition" => {
            let definition = node.child_by_field_name("definition")?;
            let mut cursor = node.walk();
            let decorators: Vec<String> = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "decorator")
                .map(|c| text(c, source).trim_start_matches('@').trim().to_string())
                .collect();
            let (mut kind, _, body) = recognise(definition, source, enclosing)?;
            match &mut kind {
                NodeKind::Function(callable) => callable.decorators = decorators,
                NodeKind::Class { decorators: d, .. } => *d = decorators,
                _ => {}
            }
            Some((kind, definition.start_position().row + 1, body))
        }
        "function_definition" => {
            let name = text(node.child_by_field_name("name")?, source).to_string();
            let params = node
                .child_by_field_name("parameters")
                .map(|p| parameter_names(p, source))
                .unwrap_or_default();
            let (flavor, owner) = match enclosing {
                Enclosing::Class(class) => (CallableKind::Method, Some(class.clone())),
                _ => (CallableKind::Function, None),
            };
            let callable = Callable {
                name,
                params,
                decorators: Vec::new(),
                is_async: has_token(node, "async"),
                flavor,
                owner,
            };
            Some((NodeKind::Function(callable), line, Enclosing::Other))
        }
        "class_definition" => {
            let name = text(node.child_by_field_name("name")?, source).to_string();
            let bases = node
                .child_by_field_name("superclasses")
                .map(|args| {
                    let mut cursor = args.walk();
                    args.named_children(&mut cursor)
                        .filter(|a| a.kind() != "keyword_argument" && a.kind() != "comment")
                        .map(|a| text(a, source).to_string())
                        .collect()
                })
                .unwrap_or_default();
            let kind = NodeKind::Class {
                name: name.clone(),
                bases,
                decorators: Vec::new(),
            };
            Some((kind, line, Enclosing::Class(name)))
        }
        "for_statement" => {
            let target = text(node.child_by_field_name("left")?, source).to_string();
            let iterable = text(node.child_by_field_name("right")?, source).to_string();
            let kind = NodeKind::ForLoop {
                target,
                iterable,
                is_async: has_token(node, "async"),
            };
            Some((kind, line, Enclosing::Control))
        }
        "while_statement" => {
            let condition = text(node.child_by_field_name("condition")?, source).to_string();
            Some((NodeKind::WhileLoop { condition }, line, Enclosing::Control))
        }
        "if_statement" => {
            let condition = text(node.child_by_field_name("condition")?, source).to_string();
            let kind = NodeKind::Conditional {
                condition,
                nested: *enclosing == Enclosing::Control,
            };
            Some((kind, line, Enclosing::Control))
        }
        "with_statement" => {
            let mut items = Vec::new();
            let mut cursor = node.walk();
            for clause in node.named_children(&mut cursor).filter(|c| c.kind() == "with_clause") {
                let mut inner = clause.walk();
                items.extend(
                    clause
                        .named_children(&mut inner)
                        .filter(|i| i.kind() == "with_item")
                        .map(|i| text(i, source).to_string()),
                );
            }
            let kind = NodeKind::With {
                items,
                is_async: has_token(node, "async"),
            };
            Some((kind, line, Enclosing::Other))
        }
        "try_statement" => {
            let mut handlers = Vec::new();
            let mut catches_all = false;
            let mut has_else = false;
            let mut has_finally = false;
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "except_clause" | "except_group_clause" => match caught_type(child, source) {
                        Some(caught) => handlers.push(caught),
                        None => catches_all = true,
                    },
                    "else_clause" => has_else = true,
                    "finally_clause" => has_finally = true,
                    _ => {}
                }
            }
            let kind = NodeKind::Try {
                handlers,
                catches_all,
                has_else,
                has_finally,
            };
            Some((kind, line, Enclosing::Other))
        }
        "import_statement" => {
            let mut cursor = node.walk();
            let names: Vec<String> = node
                .children_by_field_name("name", &mut cursor)
                .map(|n| imported_name(n, source))
                .collect();
            let kind = NodeKind::Import {
                module: names.first().cloned().unwrap_or_default(),
                names: Vec::new(),
                from: false,
                top_level: *enclosing == Enclosing::Module,
            };
            Some((kind, line, Enclosing::Other))
        }
        "import_from_statement" | "future_import_statement" => {
            let module = match node.child_by_field_name("module_name") {
                Some(m) => text(m, source).to_string(),
                None => "__future__".to_string(),
            };
            let mut cursor = node.walk();
            let mut names: Vec<String> = node
                .children_by_field_name("name", &mut cursor)
                .map(|n| imported_name(n, source))
                .collect();
            let mut cursor = node.walk();
            if node.named_children(&mut cursor).any(|c| c.kind() == "wildcard_import") {
                names.push("*".to_string());
            }
            let kind = NodeKind::Import {
                module,
                names,
                from: true,
                top_level: *enclosing == Enclosing::Module,
            };
            Some((kind, line, Enclosing::Other))
        }
        "return_statement" => {
            let mut cursor = node.walk();
            let value = node
                .named_children(&mut cursor)
                .find(|c| c.kind() != "comment")
                .map(|v| text(v, source).to_string());
            Some((NodeKind::Return { value }, line, Enclosing::Other))
        }
        "raise_statement" => {
            let mut cursor = node.walk();
            let exception = node
                .named_children(&mut cursor)
                .find(|c| c.kind() != "comment")
                .map(|v| text(v, source).to_string());
            Some((NodeKind::Raise { exception }, line, Enclosing::Other))
        }
        "assert_statement" => {
            let mut cursor = node.walk();
            let mut parts = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() != "comment")
                .map(|c| text(c, source).to_string());
            let test = parts.next()?;
            let message = parts.next();
            Some((NodeKind::Assert { test, message }, line, Enclosing::Other))
        }
        "assignment" => {
            let mut targets = Vec::new();
            let mut current = node;
            // a = b = value
            loop {
                targets.push(text(current.child_by_field_name("left")?, source).to_string());
                match current.child_by_field_name("right") {
                    Some(right) if right.kind() == "assignment" => current = right,
                    Some(right) => {
                        let kind = NodeKind::Assignment {
                            targets,
                            value: text(right, source).to_string(),
                            shape: value_shape(right.kind()),
                        };
                        return Some((kind, line, Enclosing::Other));
                    }
                    // bare annotation `x: int`
                    None => return None,
                }
            }
        }
        "augmented_assignment" => {
            let kind = NodeKind::AugmentedAssignment {
                target: text(node.child_by_field_name("left")?, source).to_string(),
                operator: text(node.child_by_field_name("operator")?, source).to_string(),
                value: text(node.child_by_field_name("right")?, source).to_string(),
            };
            Some((kind, line, Enclosing::Other))
        }
        _ => None,
    }
}

fn parameter_names(params: Node, source: &str) -> Vec<String> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|p| p.kind() != "comment")
        .map(|p| {
            let raw = text(p, source);
            let end = raw.find([':', '=']).unwrap_or(raw.len());
            raw[..end].trim().to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

fn imported_name(node: Node, source: &str) -> String {
    if node.kind() == "aliased_import" {
        if let Some(name) = node.child_by_field_name("name") {
            return text(name, source).to_string();
        }
    }
    text(node, source).to_string()
}

/// Exception type named by an `except` clause, `None` for a bare `except:`.
fn caught_type(clause: Node, source: &str) -> Option<String> {
    let mut cursor = clause.walk();
    let expr = clause
        .named_children(&mut cursor)
        .find(|c| c.kind() != "block" && c.kind() != "comment")?;
    let expr = if expr.kind() == "as_pattern" {
        let mut inner = expr.walk();
        expr.named_children(&mut inner).next().unwrap_or(expr)
    } else {
        expr
    };
    Some(text(expr, source).to_string())
}

fn value_shape(kind: &str) -> ValueShape {
    match kind {
        "call" => ValueShape::Call,
        "list" => ValueShape::List,
        "dictionary" => ValueShape::Dict,
        "lambda" => ValueShape::Lambda,
        "list_comprehension"
        | "dictionary_comprehension"
        | "set_comprehension"
        | "generator_expression" => ValueShape::Comprehension,
        _ => ValueShape::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> StructuralNode {
        let grammar: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parse_tree(source, &grammar).expect("valid python")
    }

    #[test]
    fn test_parse_python_functions_and_classes() {
        let root = parse(
            r#"
class UserManager(Base, metaclass=Meta):
    @staticmethod
    def make(a, b: int = 2, *args):
        pass

async def fetch_data():
    pass
"#,
        );
        assert_eq!(root.children.len(), 2);

        let class = &root.children[0];
        assert_eq!(class.line, 2);
        match &class.kind {
            NodeKind::Class { name, bases, .. } => {
                assert_eq!(name, "UserManager");
                assert_eq!(bases, &vec!["Base".to_string()]);
            }
            other => panic!("expected class, got {other:?}"),
        }

        let method = &class.children[0];
        // the def line, not the decorator line
        assert_eq!(method.line, 4);
        match &method.kind {
            NodeKind::Function(c) => {
                assert_eq!(c.name, "make");
                assert_eq!(c.params, vec!["a", "b", "*args"]);
                assert_eq!(c.decorators, vec!["staticmethod"]);
                assert_eq!(c.flavor, CallableKind::Method);
                assert_eq!(c.owner.as_deref(), Some("UserManager"));
            }
            other => panic!("expected function, got {other:?}"),
        }

        match &root.children[1].kind {
            NodeKind::Function(c) => {
                assert!(c.is_async);
                assert_eq!(c.flavor, CallableKind::Function);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_conditionals_are_marked() {
        let root = parse("if a:\n    if b:\n        pass\ndef f():\n    if c:\n        pass\n");
        let outer = &root.children[0];
        assert!(matches!(outer.kind, NodeKind::Conditional { nested: false, .. }));
        assert!(matches!(outer.children[0].kind, NodeKind::Conditional { nested: true, .. }));

        let in_function = &root.children[1].children[0];
        assert!(matches!(in_function.kind, NodeKind::Conditional { nested: false, .. }));
    }

    #[test]
    fn test_try_handlers() {
        let root = parse(
            "try:\n    x()\nexcept (KeyError, ValueError) as e:\n    pass\nexcept:\n    pass\nfinally:\n    pass\n",
        );
        match &root.children[0].kind {
            NodeKind::Try {
                handlers,
                catches_all,
                has_finally,
                has_else,
            } => {
                assert_eq!(handlers, &vec!["(KeyError, ValueError)".to_string()]);
                assert!(catches_all);
                assert!(has_finally);
                assert!(!has_else);
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn test_imports_know_their_level() {
        let root = parse("import os\nfrom a.b import c, d as e\ndef f():\n    import json\n");
        assert!(matches!(
            &root.children[0].kind,
            NodeKind::Import { module, from: false, top_level: true, .. } if module == "os"
        ));
        match &root.children[1].kind {
            NodeKind::Import { module, names, .. } => {
                assert_eq!(module, "a.b");
                assert_eq!(names, &vec!["c".to_string(), "d".to_string()]);
            }
            other => panic!("expected import, got {other:?}"),
        }
        assert!(matches!(
            &root.children[2].children[0].kind,
            NodeKind::Import { top_level: false, .. }
        ));
    }

    #[test]
    fn test_assignment_shapes() {
        let root = parse("a = b = []\nc = f(1)\nd += 2\n");
        match &root.children[0].kind {
            NodeKind::Assignment { targets, shape, .. } => {
                assert_eq!(targets, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(*shape, ValueShape::List);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        assert!(matches!(
            root.children[1].kind,
            NodeKind::Assignment { shape: ValueShape::Call, .. }
        ));
        assert!(matches!(
            &root.children[2].kind,
            NodeKind::AugmentedAssignment { operator, .. } if operator == "+="
        ));
    }

    #[test]
    fn test_missing_token_reported() {
        let grammar: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let err = parse_tree("def f(:\n    pass\n", &grammar).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }
}
