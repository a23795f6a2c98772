//! Annotation engine: structure → comment per significant line → annotated
//! text.

pub mod placement;
pub mod synthesis;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::languages::{Language, UnsupportedLanguage};
use crate::parser::{self, NodeKind, ParseError, SourceUnit, Structure, StructuralNode};

pub use placement::place;

/// Comment text keyed by 0-based line index of the original source.
pub type AnnotationMap = BTreeMap<usize, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedLanguage),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Definitions, loops, top-level conditionals, resource and error blocks,
    /// module imports.
    #[default]
    Structural,
    /// Structural plus returns, raises, asserts, assignments and library calls.
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotated {
    pub annotated_text: String,
}

/// Names of the definitions enclosing a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub class: Option<String>,
    pub function: Option<String>,
}

impl Scope {
    fn enter(&self, node: &StructuralNode) -> Scope {
        match &node.kind {
            NodeKind::Class { name, .. } => Scope {
                class: Some(name.clone()),
                function: None,
            },
            NodeKind::Function(callable) => Scope {
                class: callable.owner.clone().or_else(|| self.class.clone()),
                function: Some(callable.name.clone()),
            },
            _ => self.clone(),
        }
    }
}

pub fn annotate(source: &str, language: Language) -> Result<Annotated, AnnotateError> {
    annotate_with(source, language, Verbosity::default())
}

pub fn annotate_with(
    source: &str,
    language: Language,
    verbosity: Verbosity,
) -> Result<Annotated, AnnotateError> {
    let unit = SourceUnit::new(source, language);
    let structure = parser::parse(&unit)?;
    let map = build_annotations(&structure, language, verbosity);

    let lines: Vec<&str> = source.split('\n').collect();
    let annotated_text = place(&lines, &map, language);

    debug!(
        language = %language,
        lines = lines.len(),
        nodes = structure.node_count(),
        comments = map.len(),
        "annotated source"
    );
    Ok(Annotated { annotated_text })
}

/// Comment text for every significant node, keyed by 0-based line. When two
/// nodes share a line the first one visited keeps it; assignment fallbacks
/// only fill lines nothing else claimed.
pub fn build_annotations(structure: &Structure, language: Language, verbosity: Verbosity) -> AnnotationMap {
    let mut map = AnnotationMap::new();
    let mut fallbacks = Vec::new();

    match structure {
        Structure::Tree(root) => {
            visit(&root.children, &Scope::default(), language, verbosity, &mut map, &mut fallbacks);
        }
        Structure::Flat(nodes) => {
            for node in nodes {
                let scope = Scope::default().enter(node);
                record(node, &scope, language, verbosity, &mut map, &mut fallbacks);
            }
        }
    }

    for (line, text) in fallbacks {
        map.entry(line).or_insert(text);
    }
    map
}

fn visit(
    nodes: &[StructuralNode],
    scope: &Scope,
    language: Language,
    verbosity: Verbosity,
    map: &mut AnnotationMap,
    fallbacks: &mut Vec<(usize, String)>,
) {
    for node in nodes {
        // a definition's own comment sees the scope it is defined in
        record(node, scope, language, verbosity, map, fallbacks);
        let inner = scope.enter(node);
        visit(&node.children, &inner, language, verbosity, map, fallbacks);
    }
}

fn record(
    node: &StructuralNode,
    scope: &Scope,
    language: Language,
    verbosity: Verbosity,
    map: &mut AnnotationMap,
    fallbacks: &mut Vec<(usize, String)>,
) {
    let Some(line) = node.line.checked_sub(1) else {
        return;
    };
    match describe(&node.kind, scope, language, verbosity) {
        Some(Comment::Primary(text)) => {
            map.entry(line).or_insert(text);
        }
        Some(Comment::Fallback(text)) => fallbacks.push((line, text)),
        None => {}
    }
}

enum Comment {
    Primary(String),
    Fallback(String),
}

fn describe(kind: &NodeKind, scope: &Scope, language: Language, verbosity: Verbosity) -> Option<Comment> {
    use synthesis as s;

    let detailed = verbosity == Verbosity::Detailed;
    let text = match kind {
        NodeKind::Module | NodeKind::Else => return None,
        NodeKind::Function(callable) => s::callable(callable, language),
        NodeKind::Class { name, bases, .. } => s::class(name, bases),
        NodeKind::Interface { name, extends } => s::interface(name, extends.as_deref()),
        NodeKind::TypeAlias { name, definition } => s::type_alias(name, definition),
        NodeKind::Enum { name } => s::enumeration(name),
        NodeKind::Record { keyword, name } => s::record(keyword, name),
        NodeKind::ForLoop { target, iterable, .. } => s::for_loop(target, iterable),
        NodeKind::CountingLoop { header } => s::counting_loop(header),
        NodeKind::WhileLoop { condition } => s::while_loop(condition),
        NodeKind::DoWhile => s::do_while(),
        NodeKind::Conditional { nested: true, .. } | NodeKind::Switch { nested: true, .. } => {
            return None;
        }
        NodeKind::Conditional { condition, .. } => s::conditional(condition),
        NodeKind::Switch { subject, .. } => s::switch(subject),
        NodeKind::With { items, is_async } => s::with_block(items, *is_async),
        NodeKind::Try {
            handlers,
            catches_all,
            has_finally,
            ..
        } => s::try_block(handlers, *catches_all, *has_finally),
        NodeKind::Catch { error } => s::catch(error.as_deref()),
        NodeKind::Finally => s::finally(),
        NodeKind::Import { top_level: false, .. } => return None,
        NodeKind::Import { module, names, from, .. } => s::import(module, names, *from),
        NodeKind::Export { item, default } => s::export(item, *default),
        NodeKind::Include { header, system } => s::include(header, *system),
        NodeKind::Macro { name, params, value } => {
            s::macro_definition(name, params.as_deref(), value.as_deref())
        }
        NodeKind::Preprocessor { directive, argument } => s::preprocessor(directive, argument),
        NodeKind::Namespace { name, using } => s::namespace(name, *using),
        NodeKind::Template { params } => s::template(params),

        _ if !detailed => return None,

        NodeKind::Case { label } => s::case(label.as_deref()),
        NodeKind::GlobalVariable {
            declaration,
            name,
            value,
        } => s::global_variable(declaration, name, value.as_deref()),
        NodeKind::Return { value } => s::return_value(value.as_deref(), scope),
        NodeKind::Raise { exception } => s::raise(exception.as_deref()),
        NodeKind::Assert { test, message } => s::assertion(test, message.as_deref()),
        NodeKind::LibraryCall { function, argument } => s::library_call(function, argument.as_deref()),
        NodeKind::Assignment { targets, value, shape } => {
            return Some(Comment::Fallback(s::assignment(targets, value, *shape)));
        }
        NodeKind::AugmentedAssignment {
            target,
            operator,
            value,
        } => return Some(Comment::Fallback(s::augmented_assignment(target, operator, value))),
    };
    Some(Comment::Primary(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_comment_placed_above_def() {
        let out = annotate("def get_user_profile(uid):\n    pass\n", Language::Python).unwrap();
        assert_eq!(
            out.annotated_text,
            "# Retrieve user profile\ndef get_user_profile(uid):\n    pass\n"
        );
    }

    #[test]
    fn test_nested_conditional_not_annotated() {
        let source = "if a:\n    x = 1\n    if b:\n        pass\n";
        let out = annotate(source, Language::Python).unwrap();
        assert_eq!(out.annotated_text.matches("# ").count(), 1);
    }

    #[test]
    fn test_structural_skips_statements_detailed_adds_them() {
        let source = "def f():\n    pass\n    x = compute()\n\n    return x\n";
        let structural = annotate(source, Language::Python).unwrap();
        assert_eq!(structural.annotated_text.lines().filter(|l| l.trim_start().starts_with('#')).count(), 1);

        let detailed = annotate_with(source, Language::Python, Verbosity::Detailed).unwrap();
        assert!(detailed.annotated_text.contains("# Store result of function call in x"));
        assert!(detailed.annotated_text.contains("    # Return the result of f"));
    }

    #[test]
    fn test_assignment_fallback_never_overrides() {
        let structure = Structure::Flat(vec![
            StructuralNode::leaf(
                NodeKind::Assignment {
                    targets: vec!["x".to_string()],
                    value: "1".to_string(),
                    shape: parser::ValueShape::Other,
                },
                1,
            ),
            StructuralNode::leaf(
                NodeKind::Raise {
                    exception: Some("E".to_string()),
                },
                1,
            ),
        ]);
        let map = build_annotations(&structure, Language::Python, Verbosity::Detailed);
        assert_eq!(map.get(&0).map(String::as_str), Some("Raise exception: E"));
    }

    #[test]
    fn test_syntax_error_surfaces() {
        let err = annotate("def broken(:\n", Language::Python).unwrap_err();
        assert!(matches!(err, AnnotateError::Parse(ParseError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_javascript_annotation() {
        let source = "import React from 'react';\n\nclass TodoList extends Component {\n  state = {};\n  render() {\n    return null;\n  }\n}\n";
        let out = annotate(source, Language::JavaScript).unwrap();
        let expected = "// Bring in React functionality from react\nimport React from 'react';\n\n// Create TodoList class that extends Component\nclass TodoList extends Component {\n  state = {};\n  // Generate and return the visual representation of this component\n  render() {\n    return null;\n  }\n}\n";
        assert_eq!(out.annotated_text, expected);
    }
}
