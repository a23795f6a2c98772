//! Structural parser adapter.
//!
//! Python goes through tree-sitter and yields a tree of [`StructuralNode`]s.
//! JavaScript/TypeScript and C/C++ have no grammar wired in; they are read
//! by the [`LineScanner`], which classifies lines one at a time and never
//! fails.

pub mod line_scanner;
pub mod python;

use thiserror::Error;

use crate::languages::Language;

pub use line_scanner::LineScanner;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax Error at line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Grammar error: {0}")]
    Grammar(String),
}

/// Source text plus the language it is written in.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    pub text: &'a str,
    pub language: Language,
}

impl<'a> SourceUnit<'a> {
    pub fn new(text: &'a str, language: Language) -> Self {
        Self { text, language }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
    Arrow,
    Constructor,
    Destructor,
    /// Declaration without a body (C prototype).
    Prototype,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    pub name: String,
    pub params: Vec<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
    pub flavor: CallableKind,
    /// Enclosing class (or `Owner::` qualifier in C++).
    pub owner: Option<String>,
}

/// Rough shape of an assigned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Call,
    List,
    Dict,
    Lambda,
    Comprehension,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Function(Callable),
    Class {
        name: String,
        bases: Vec<String>,
        decorators: Vec<String>,
    },
    Interface {
        name: String,
        extends: Option<String>,
    },
    TypeAlias {
        name: String,
        definition: String,
    },
    Enum {
        name: String,
    },
    /// `struct` / `union` / `typedef struct` definitions.
    Record {
        keyword: String,
        name: String,
    },
    ForLoop {
        target: String,
        iterable: String,
        is_async: bool,
    },
    /// C-style `for (init; cond; step)`.
    CountingLoop {
        header: String,
    },
    WhileLoop {
        condition: String,
    },
    DoWhile,
    Conditional {
        condition: String,
        nested: bool,
    },
    Else,
    Switch {
        subject: String,
        nested: bool,
    },
    /// `case <label>:`; `None` for `default:`.
    Case {
        label: Option<String>,
    },
    With {
        items: Vec<String>,
        is_async: bool,
    },
    Try {
        handlers: Vec<String>,
        catches_all: bool,
        has_else: bool,
        has_finally: bool,
    },
    Catch {
        error: Option<String>,
    },
    Finally,
    Import {
        module: String,
        names: Vec<String>,
        from: bool,
        top_level: bool,
    },
    Export {
        item: String,
        default: bool,
    },
    Include {
        header: String,
        system: bool,
    },
    Macro {
        name: String,
        params: Option<String>,
        value: Option<String>,
    },
    Preprocessor {
        directive: String,
        argument: String,
    },
    Namespace {
        name: String,
        using: bool,
    },
    Template {
        params: String,
    },
    GlobalVariable {
        declaration: String,
        name: String,
        value: Option<String>,
    },
    Return {
        value: Option<String>,
    },
    Raise {
        exception: Option<String>,
    },
    Assert {
        test: String,
        message: Option<String>,
    },
    Assignment {
        targets: Vec<String>,
        value: String,
        shape: ValueShape,
    },
    AugmentedAssignment {
        target: String,
        operator: String,
        value: String,
    },
    LibraryCall {
        function: String,
        argument: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralNode {
    pub kind: NodeKind,
    /// 1-based line of the defining token.
    pub line: usize,
    pub children: Vec<StructuralNode>,
}

impl StructuralNode {
    pub fn leaf(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, the root included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(StructuralNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    Tree(StructuralNode),
    Flat(Vec<StructuralNode>),
}

impl Structure {
    pub fn node_count(&self) -> usize {
        match self {
            Structure::Tree(root) => root.count() - 1,
            Structure::Flat(nodes) => nodes.len(),
        }
    }
}

/// Parse `unit` into a structure. Only grammar-backed languages can fail.
pub fn parse(unit: &SourceUnit) -> Result<Structure, ParseError> {
    match unit.language.config().grammar {
        Some(grammar) => python::parse_tree(unit.text, &grammar).map(Structure::Tree),
        None => Ok(Structure::Flat(LineScanner::new(unit.language).scan(unit.text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_yields_tree() {
        let unit = SourceUnit::new("def f():\n    return 1\n", Language::Python);
        let structure = parse(&unit).unwrap();
        assert!(matches!(structure, Structure::Tree(_)));
        assert_eq!(structure.node_count(), 2);
    }

    #[test]
    fn test_c_yields_flat_list_and_never_fails() {
        let unit = SourceUnit::new("int main( {{{ \n ))) }}}", Language::C);
        assert!(matches!(parse(&unit), Ok(Structure::Flat(_))));
    }

    #[test]
    fn test_python_syntax_error_message() {
        let unit = SourceUnit::new("x = 1\nif x = 5:\n    pass\n", Language::Python);
        let err = parse(&unit).unwrap_err();
        match &err {
            ParseError::Syntax { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Syntax Error at line 2:"));
    }
}
